//! Rows of the derived `covid_admissions` and `covid_deaths` views.
//!
//! Each row repeats the source event and appends the correlation result.
//! Column names match the SQL views so both evaluations export identically.

use arrow::datatypes::{DataType, Field, Schema};
use serde::{Deserialize, Serialize};

use crate::models::event_time::EventTime;
use crate::models::records::{Death, Hospitalisation, event_time_field};
use crate::models::traits::{ArrowSchema, PatientId};

/// A hospitalisation classified as a COVID-19 admission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct CovidAdmission {
    pub newnhsno: PatientId,
    pub admidate_dv: EventTime,
    pub episode_count: i64,
    pub admi_len: Option<i64>,
    pub diag_code_match: bool,
    pub closest_prior_episode_start_date: Option<EventTime>,
    pub infection_to_admission_days: Option<f64>,
    #[serde(rename = "INFECTION_WITHIN_14_DAYS_PRIOR")]
    pub infection_within_14_days_prior: bool,
}

impl CovidAdmission {
    /// The source hospitalisation without the derived columns
    #[must_use]
    pub fn hospitalisation(&self) -> Hospitalisation {
        Hospitalisation {
            newnhsno: self.newnhsno,
            admidate_dv: self.admidate_dv,
            episode_count: self.episode_count,
            admi_len: self.admi_len,
            diag_code_match: self.diag_code_match,
        }
    }
}

impl ArrowSchema for CovidAdmission {
    fn schema() -> Schema {
        Schema::new(vec![
            Field::new("NEWNHSNO", DataType::Int64, false),
            event_time_field("ADMIDATE_DV", false),
            Field::new("EPISODE_COUNT", DataType::Int64, false),
            Field::new("ADMI_LEN", DataType::Int64, true),
            Field::new("DIAG_CODE_MATCH", DataType::Boolean, false),
            event_time_field("CLOSEST_PRIOR_EPISODE_START_DATE", true),
            Field::new("INFECTION_TO_ADMISSION_DAYS", DataType::Float64, true),
            Field::new("INFECTION_WITHIN_14_DAYS_PRIOR", DataType::Boolean, false),
        ])
    }
}

/// A death classified as a COVID-19 death
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct CovidDeath {
    pub newnhsno: PatientId,
    pub dod: EventTime,
    pub icdu_group: Option<String>,
    pub icd10: Option<String>,
    pub code_mentioned: bool,
    pub code_underlying: bool,
    pub closest_prior_episode_start_date: Option<EventTime>,
    pub infection_to_death_days: Option<f64>,
    #[serde(rename = "INFECTION_WITHIN_28_DAYS_PRIOR")]
    pub infection_within_28_days_prior: bool,
}

impl CovidDeath {
    /// The source death registration without the derived columns
    #[must_use]
    pub fn death(&self) -> Death {
        Death {
            newnhsno: self.newnhsno,
            dod: self.dod,
            icdu_group: self.icdu_group.clone(),
            icd10: self.icd10.clone(),
            code_mentioned: self.code_mentioned,
            code_underlying: self.code_underlying,
        }
    }
}

impl ArrowSchema for CovidDeath {
    fn schema() -> Schema {
        Schema::new(vec![
            Field::new("NEWNHSNO", DataType::Int64, false),
            event_time_field("DOD", false),
            Field::new("ICDU_GROUP", DataType::Utf8, true),
            Field::new("ICD10", DataType::Utf8, true),
            Field::new("CODE_MENTIONED", DataType::Boolean, false),
            Field::new("CODE_UNDERLYING", DataType::Boolean, false),
            event_time_field("CLOSEST_PRIOR_EPISODE_START_DATE", true),
            Field::new("INFECTION_TO_DEATH_DAYS", DataType::Float64, true),
            Field::new("INFECTION_WITHIN_28_DAYS_PRIOR", DataType::Boolean, false),
        ])
    }
}
