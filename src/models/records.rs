//! Input relations of the study database.
//!
//! Field names serialize to the upper-case column names used by the source
//! extracts (`NEWNHSNO`, `SPECIMEN_DATE`, ...), so the same structs map onto
//! SQLite rows, Arrow record batches and Parquet files. Event and specimen
//! columns are [`EventTime`]s; the remaining dates are plain calendar days.

use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::event_time::EventTime;
use crate::models::traits::{ArrowSchema, PatientId};

/// `INFECTION_NUM` of the first positive test in an episode
pub const INDEX_INFECTION_NUM: i64 = 1;

fn patient_field() -> Field {
    Field::new("NEWNHSNO", DataType::Int64, false)
}

/// Column holding an [`EventTime`]
pub(crate) fn event_time_field(name: &str, nullable: bool) -> Field {
    Field::new(name, DataType::Timestamp(TimeUnit::Millisecond, None), nullable)
}

/// A study participant with their antibody test and follow-up end
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Patient {
    pub newnhsno: PatientId,
    /// Antibody test date
    pub abdate: NaiveDate,
    /// End of the 180-day follow-up
    #[serde(rename = "ABDATE_6M")]
    pub abdate_6m: NaiveDate,
    pub cohort: String,
    pub ab_status: bool,
}

impl ArrowSchema for Patient {
    fn schema() -> Schema {
        Schema::new(vec![
            patient_field(),
            Field::new("ABDATE", DataType::Date32, false),
            Field::new("ABDATE_6M", DataType::Date32, false),
            Field::new("COHORT", DataType::Utf8, false),
            Field::new("AB_STATUS", DataType::Boolean, false),
        ])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Demographics {
    pub newnhsno: PatientId,
    pub dob: NaiveDate,
    pub sex: String,
}

impl ArrowSchema for Demographics {
    fn schema() -> Schema {
        Schema::new(vec![
            patient_field(),
            Field::new("DOB", DataType::Date32, false),
            Field::new("SEX", DataType::Utf8, false),
        ])
    }
}

/// A positive test. `INFECTION_NUM` counts tests within an episode, so
/// `INFECTION_NUM = 1` marks the start of each episode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Infection {
    pub newnhsno: PatientId,
    pub specimen_date: EventTime,
    pub episode_num: i64,
    pub infection_num: i64,
    pub days_since_episode_start: i64,
}

impl Infection {
    /// Whether this test opens an infection episode
    #[must_use]
    pub const fn is_index_episode(&self) -> bool {
        self.infection_num == INDEX_INFECTION_NUM
    }
}

impl ArrowSchema for Infection {
    fn schema() -> Schema {
        Schema::new(vec![
            patient_field(),
            event_time_field("SPECIMEN_DATE", false),
            Field::new("EPISODE_NUM", DataType::Int64, false),
            Field::new("INFECTION_NUM", DataType::Int64, false),
            Field::new("DAYS_SINCE_EPISODE_START", DataType::Int64, false),
        ])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Therapeutic {
    pub newnhsno: PatientId,
    pub therapeutic_num: i64,
    pub received: NaiveDate,
    pub intervention: String,
}

impl ArrowSchema for Therapeutic {
    fn schema() -> Schema {
        Schema::new(vec![
            patient_field(),
            Field::new("THERAPEUTIC_NUM", DataType::Int64, false),
            Field::new("RECEIVED", DataType::Date32, false),
            Field::new("INTERVENTION", DataType::Utf8, false),
        ])
    }
}

/// A hospital admission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Hospitalisation {
    pub newnhsno: PatientId,
    /// Admission date
    pub admidate_dv: EventTime,
    pub episode_count: i64,
    /// Length of stay in days
    pub admi_len: Option<i64>,
    /// The diagnosis codes already name COVID as a cause or contributor
    pub diag_code_match: bool,
}

impl ArrowSchema for Hospitalisation {
    fn schema() -> Schema {
        Schema::new(vec![
            patient_field(),
            event_time_field("ADMIDATE_DV", false),
            Field::new("EPISODE_COUNT", DataType::Int64, false),
            Field::new("ADMI_LEN", DataType::Int64, true),
            Field::new("DIAG_CODE_MATCH", DataType::Boolean, false),
        ])
    }
}

/// A death registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Death {
    pub newnhsno: PatientId,
    /// Date of death
    pub dod: EventTime,
    pub icdu_group: Option<String>,
    pub icd10: Option<String>,
    /// COVID is mentioned anywhere on the certificate
    pub code_mentioned: bool,
    /// COVID is the underlying cause of death
    pub code_underlying: bool,
}

impl ArrowSchema for Death {
    fn schema() -> Schema {
        Schema::new(vec![
            patient_field(),
            event_time_field("DOD", false),
            Field::new("ICDU_GROUP", DataType::Utf8, true),
            Field::new("ICD10", DataType::Utf8, true),
            Field::new("CODE_MENTIONED", DataType::Boolean, false),
            Field::new("CODE_UNDERLYING", DataType::Boolean, false),
        ])
    }
}
