//! The full set of input relations for one study database

use std::fmt;

use crate::models::records::{
    Death, Demographics, Hospitalisation, Infection, Patient, Therapeutic,
};

/// Every relation the study database holds, as typed rows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub patients: Vec<Patient>,
    pub demographics: Vec<Demographics>,
    pub infections: Vec<Infection>,
    pub therapeutics: Vec<Therapeutic>,
    pub hospitalisations: Vec<Hospitalisation>,
    pub deaths: Vec<Death>,
}

impl Dataset {
    /// Total number of rows across all relations
    #[must_use]
    pub fn total_rows(&self) -> usize {
        self.patients.len()
            + self.demographics.len()
            + self.infections.len()
            + self.therapeutics.len()
            + self.hospitalisations.len()
            + self.deaths.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total_rows() == 0
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Dataset:")?;
        writeln!(f, "  patients: {}", self.patients.len())?;
        writeln!(f, "  demographics: {}", self.demographics.len())?;
        writeln!(f, "  infections: {}", self.infections.len())?;
        writeln!(f, "  therapeutics: {}", self.therapeutics.len())?;
        writeln!(f, "  hospitalisations: {}", self.hospitalisations.len())?;
        writeln!(f, "  deaths: {}", self.deaths.len())
    }
}
