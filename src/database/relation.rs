//! Row mappings between models and SQLite relations

use rusqlite::{Row, Statement, params};

use crate::database::schema::{COVID_ADMISSIONS, COVID_DEATHS};
use crate::models::{
    CovidAdmission, CovidDeath, Death, Demographics, Hospitalisation, Infection, Patient,
    Therapeutic,
};

/// A model readable from a table or view
pub trait Relation: Sized {
    /// Table or view name
    const NAME: &'static str;
    /// Columns in select order
    const COLUMNS: &'static [&'static str];
    /// Stable ordering for full reads
    const ORDER_BY: &'static str = "rowid";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    #[must_use]
    fn select_sql() -> String {
        format!(
            "SELECT {} FROM {} ORDER BY {}",
            Self::COLUMNS.join(", "),
            Self::NAME,
            Self::ORDER_BY
        )
    }
}

/// A relation backed by a table that accepts inserts
pub trait Insertable: Relation {
    /// Bind this row to a statement prepared from [`Insertable::insert_sql`]
    fn insert(&self, statement: &mut Statement<'_>) -> rusqlite::Result<usize>;

    #[must_use]
    fn insert_sql() -> String {
        let placeholders = (1..=Self::COLUMNS.len())
            .map(|idx| format!("?{idx}"))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "INSERT INTO {} ({}) VALUES ({placeholders})",
            Self::NAME,
            Self::COLUMNS.join(", ")
        )
    }
}

impl Relation for Patient {
    const NAME: &'static str = "patients";
    const COLUMNS: &'static [&'static str] =
        &["NEWNHSNO", "ABDATE", "ABDATE_6M", "COHORT", "AB_STATUS"];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            newnhsno: row.get("NEWNHSNO")?,
            abdate: row.get("ABDATE")?,
            abdate_6m: row.get("ABDATE_6M")?,
            cohort: row.get("COHORT")?,
            ab_status: row.get("AB_STATUS")?,
        })
    }
}

impl Insertable for Patient {
    fn insert(&self, statement: &mut Statement<'_>) -> rusqlite::Result<usize> {
        statement.execute(params![
            self.newnhsno,
            self.abdate,
            self.abdate_6m,
            self.cohort,
            self.ab_status
        ])
    }
}

impl Relation for Demographics {
    const NAME: &'static str = "demographics";
    const COLUMNS: &'static [&'static str] = &["NEWNHSNO", "DOB", "SEX"];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            newnhsno: row.get("NEWNHSNO")?,
            dob: row.get("DOB")?,
            sex: row.get("SEX")?,
        })
    }
}

impl Insertable for Demographics {
    fn insert(&self, statement: &mut Statement<'_>) -> rusqlite::Result<usize> {
        statement.execute(params![self.newnhsno, self.dob, self.sex])
    }
}

impl Relation for Infection {
    const NAME: &'static str = "infections";
    const COLUMNS: &'static [&'static str] = &[
        "NEWNHSNO",
        "SPECIMEN_DATE",
        "EPISODE_NUM",
        "INFECTION_NUM",
        "DAYS_SINCE_EPISODE_START",
    ];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            newnhsno: row.get("NEWNHSNO")?,
            specimen_date: row.get("SPECIMEN_DATE")?,
            episode_num: row.get("EPISODE_NUM")?,
            infection_num: row.get("INFECTION_NUM")?,
            days_since_episode_start: row.get("DAYS_SINCE_EPISODE_START")?,
        })
    }
}

impl Insertable for Infection {
    fn insert(&self, statement: &mut Statement<'_>) -> rusqlite::Result<usize> {
        statement.execute(params![
            self.newnhsno,
            self.specimen_date,
            self.episode_num,
            self.infection_num,
            self.days_since_episode_start
        ])
    }
}

impl Relation for Therapeutic {
    const NAME: &'static str = "therapeutics";
    const COLUMNS: &'static [&'static str] =
        &["NEWNHSNO", "THERAPEUTIC_NUM", "RECEIVED", "INTERVENTION"];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            newnhsno: row.get("NEWNHSNO")?,
            therapeutic_num: row.get("THERAPEUTIC_NUM")?,
            received: row.get("RECEIVED")?,
            intervention: row.get("INTERVENTION")?,
        })
    }
}

impl Insertable for Therapeutic {
    fn insert(&self, statement: &mut Statement<'_>) -> rusqlite::Result<usize> {
        statement.execute(params![
            self.newnhsno,
            self.therapeutic_num,
            self.received,
            self.intervention
        ])
    }
}

impl Relation for Hospitalisation {
    const NAME: &'static str = "hospitalisations";
    const COLUMNS: &'static [&'static str] = &[
        "NEWNHSNO",
        "ADMIDATE_DV",
        "EPISODE_COUNT",
        "ADMI_LEN",
        "DIAG_CODE_MATCH",
    ];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            newnhsno: row.get("NEWNHSNO")?,
            admidate_dv: row.get("ADMIDATE_DV")?,
            episode_count: row.get("EPISODE_COUNT")?,
            admi_len: row.get("ADMI_LEN")?,
            diag_code_match: row.get("DIAG_CODE_MATCH")?,
        })
    }
}

impl Insertable for Hospitalisation {
    fn insert(&self, statement: &mut Statement<'_>) -> rusqlite::Result<usize> {
        statement.execute(params![
            self.newnhsno,
            self.admidate_dv,
            self.episode_count,
            self.admi_len,
            self.diag_code_match
        ])
    }
}

impl Relation for Death {
    const NAME: &'static str = "deaths";
    const COLUMNS: &'static [&'static str] = &[
        "NEWNHSNO",
        "DOD",
        "ICDU_GROUP",
        "ICD10",
        "CODE_MENTIONED",
        "CODE_UNDERLYING",
    ];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            newnhsno: row.get("NEWNHSNO")?,
            dod: row.get("DOD")?,
            icdu_group: row.get("ICDU_GROUP")?,
            icd10: row.get("ICD10")?,
            code_mentioned: row.get("CODE_MENTIONED")?,
            code_underlying: row.get("CODE_UNDERLYING")?,
        })
    }
}

impl Insertable for Death {
    fn insert(&self, statement: &mut Statement<'_>) -> rusqlite::Result<usize> {
        statement.execute(params![
            self.newnhsno,
            self.dod,
            self.icdu_group,
            self.icd10,
            self.code_mentioned,
            self.code_underlying
        ])
    }
}

impl Relation for CovidAdmission {
    const NAME: &'static str = COVID_ADMISSIONS.name;
    const COLUMNS: &'static [&'static str] = &[
        "NEWNHSNO",
        "ADMIDATE_DV",
        "EPISODE_COUNT",
        "ADMI_LEN",
        "DIAG_CODE_MATCH",
        "CLOSEST_PRIOR_EPISODE_START_DATE",
        "INFECTION_TO_ADMISSION_DAYS",
        "INFECTION_WITHIN_14_DAYS_PRIOR",
    ];
    const ORDER_BY: &'static str = "NEWNHSNO, ADMIDATE_DV";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            newnhsno: row.get("NEWNHSNO")?,
            admidate_dv: row.get("ADMIDATE_DV")?,
            episode_count: row.get("EPISODE_COUNT")?,
            admi_len: row.get("ADMI_LEN")?,
            diag_code_match: row.get("DIAG_CODE_MATCH")?,
            closest_prior_episode_start_date: row.get("CLOSEST_PRIOR_EPISODE_START_DATE")?,
            infection_to_admission_days: row.get("INFECTION_TO_ADMISSION_DAYS")?,
            infection_within_14_days_prior: row.get("INFECTION_WITHIN_14_DAYS_PRIOR")?,
        })
    }
}

impl Relation for CovidDeath {
    const NAME: &'static str = COVID_DEATHS.name;
    const COLUMNS: &'static [&'static str] = &[
        "NEWNHSNO",
        "DOD",
        "ICDU_GROUP",
        "ICD10",
        "CODE_MENTIONED",
        "CODE_UNDERLYING",
        "CLOSEST_PRIOR_EPISODE_START_DATE",
        "INFECTION_TO_DEATH_DAYS",
        "INFECTION_WITHIN_28_DAYS_PRIOR",
    ];
    const ORDER_BY: &'static str = "NEWNHSNO, DOD";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            newnhsno: row.get("NEWNHSNO")?,
            dod: row.get("DOD")?,
            icdu_group: row.get("ICDU_GROUP")?,
            icd10: row.get("ICD10")?,
            code_mentioned: row.get("CODE_MENTIONED")?,
            code_underlying: row.get("CODE_UNDERLYING")?,
            closest_prior_episode_start_date: row.get("CLOSEST_PRIOR_EPISODE_START_DATE")?,
            infection_to_death_days: row.get("INFECTION_TO_DEATH_DAYS")?,
            infection_within_28_days_prior: row.get("INFECTION_WITHIN_28_DAYS_PRIOR")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_sql_lists_columns() {
        assert_eq!(
            Demographics::insert_sql(),
            "INSERT INTO demographics (NEWNHSNO, DOB, SEX) VALUES (?1, ?2, ?3)"
        );
        assert_eq!(
            CovidDeath::select_sql(),
            "SELECT NEWNHSNO, DOD, ICDU_GROUP, ICD10, CODE_MENTIONED, CODE_UNDERLYING, \
             CLOSEST_PRIOR_EPISODE_START_DATE, INFECTION_TO_DEATH_DAYS, \
             INFECTION_WITHIN_28_DAYS_PRIOR FROM covid_deaths ORDER BY NEWNHSNO, DOD"
        );
    }
}
