//! Loading typed relations into the study database

use std::fmt;
use std::time::Instant;

use rusqlite::{Connection, Transaction};

use crate::database::relation::Insertable;
use crate::error::Result;
use crate::models::Dataset;

/// Rows inserted per relation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PopulateSummary {
    pub patients: usize,
    pub demographics: usize,
    pub infections: usize,
    pub therapeutics: usize,
    pub hospitalisations: usize,
    pub deaths: usize,
}

impl PopulateSummary {
    #[must_use]
    pub const fn total(&self) -> usize {
        self.patients
            + self.demographics
            + self.infections
            + self.therapeutics
            + self.hospitalisations
            + self.deaths
    }
}

impl fmt::Display for PopulateSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "patients={} demographics={} infections={} therapeutics={} hospitalisations={} deaths={}",
            self.patients,
            self.demographics,
            self.infections,
            self.therapeutics,
            self.hospitalisations,
            self.deaths
        )
    }
}

/// Insert rows of one relation inside an open transaction
pub fn insert_rows<R: Insertable>(tx: &Transaction<'_>, rows: &[R]) -> Result<usize> {
    log::info!("Inserting {} data ({} rows)", R::NAME, rows.len());

    let mut statement = tx.prepare_cached(&R::insert_sql())?;
    let mut inserted = 0;
    for row in rows {
        inserted += row.insert(&mut statement)?;
    }
    Ok(inserted)
}

/// Append every relation of `dataset` in a single transaction.
///
/// A constraint violation rolls the whole load back.
pub fn populate(conn: &mut Connection, dataset: &Dataset) -> Result<PopulateSummary> {
    let start = Instant::now();
    let tx = conn.transaction()?;

    let summary = PopulateSummary {
        patients: insert_rows(&tx, &dataset.patients)?,
        demographics: insert_rows(&tx, &dataset.demographics)?,
        infections: insert_rows(&tx, &dataset.infections)?,
        therapeutics: insert_rows(&tx, &dataset.therapeutics)?,
        hospitalisations: insert_rows(&tx, &dataset.hospitalisations)?,
        deaths: insert_rows(&tx, &dataset.deaths)?,
    };

    tx.commit()?;
    log::info!(
        "Populated database with {} rows in {:?}",
        summary.total(),
        start.elapsed()
    );

    Ok(summary)
}
