//! Time-to-event records for survival analysis.
//!
//! A survival record runs from a start date to the first of a primary event,
//! a competing event or censoring. Records can be expanded into per-month
//! person-time for incidence-rate tables.

use rustc_hash::FxHashMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StudyError};
use crate::models::{CovidAdmission, Death, Patient, PatientId};
use crate::utils::dates::{month_end, month_start};

/// Which event ends follow-up when both primary and competing events occur
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EndEventPriority {
    /// Whichever happens first
    #[default]
    First,
    /// The primary event, ignoring the competing one
    Primary,
    /// The competing event, ignoring the primary one
    Competing,
}

/// Dates for one patient before end-date resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurvivalInput {
    pub patient_id: PatientId,
    pub start_date: NaiveDate,
    pub primary_event_date: Option<NaiveDate>,
    pub competing_event_date: Option<NaiveDate>,
    pub censor_date: Option<NaiveDate>,
}

/// Follow-up interval with its resolved end
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurvivalRecord {
    pub patient_id: PatientId,
    pub start_date: NaiveDate,
    pub primary_event_date: Option<NaiveDate>,
    pub competing_event_date: Option<NaiveDate>,
    pub censor_date: Option<NaiveDate>,
    pub end_date: NaiveDate,
    /// Whole days from start to end
    pub time_at_risk: i64,
}

/// Days one record contributes to one calendar month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyRecord {
    pub patient_id: PatientId,
    pub end_date: NaiveDate,
    /// Month label such as `Jan-21`
    pub month: String,
    pub month_start: NaiveDate,
    pub time: u32,
}

fn determine_end_date(input: &SurvivalInput, priority: EndEventPriority) -> Result<NaiveDate> {
    let (mut primary, mut competing) = (input.primary_event_date, input.competing_event_date);

    if primary.is_some() && competing.is_some() {
        match priority {
            EndEventPriority::Primary => competing = None,
            EndEventPriority::Competing => primary = None,
            EndEventPriority::First => {}
        }
    }

    [primary, competing, input.censor_date]
        .into_iter()
        .flatten()
        .min()
        .ok_or_else(|| StudyError::InvalidSurvivalData {
            patient_id: input.patient_id,
            reason: "no primary, competing or censor date".to_string(),
        })
}

/// Resolve end dates and time at risk for each input
pub fn create_survival_records(
    inputs: &[SurvivalInput],
    priority: EndEventPriority,
) -> Result<Vec<SurvivalRecord>> {
    inputs
        .iter()
        .map(|input| {
            let end_date = determine_end_date(input, priority)?;
            if end_date < input.start_date {
                return Err(StudyError::InvalidSurvivalData {
                    patient_id: input.patient_id,
                    reason: format!(
                        "end date {end_date} is before start date {}",
                        input.start_date
                    ),
                });
            }

            Ok(SurvivalRecord {
                patient_id: input.patient_id,
                start_date: input.start_date,
                primary_event_date: input.primary_event_date,
                competing_event_date: input.competing_event_date,
                censor_date: input.censor_date,
                end_date,
                time_at_risk: (end_date - input.start_date).num_days(),
            })
        })
        .collect()
}

fn contributed_days(record: &SurvivalRecord, month: NaiveDate) -> u32 {
    let start = record.start_date;
    let end = record.end_date;
    let start_month = month_start(start);

    if month == start_month && month == month_start(end) {
        end.day() - start.day() + 1
    } else if month == start_month {
        month_end(month).day() - start.day() + 1
    } else if month == month_start(end) {
        end.day()
    } else {
        month_end(month).day()
    }
}

/// Split each record into one row per calendar month it spans.
///
/// Every month contributes between 1 and 31 days, counting both the start
/// and end day. With `time_checksum`, the total must match it exactly.
pub fn expand_to_monthly(
    records: &[SurvivalRecord],
    time_checksum: Option<i64>,
) -> Result<Vec<MonthlyRecord>> {
    let mut monthly = Vec::new();

    for record in records {
        if record.end_date < record.start_date {
            return Err(StudyError::InvalidSurvivalData {
                patient_id: record.patient_id,
                reason: "end date before start date".to_string(),
            });
        }

        let last_month = month_start(record.end_date);
        let mut month = month_start(record.start_date);

        while month <= last_month {
            monthly.push(MonthlyRecord {
                patient_id: record.patient_id,
                end_date: record.end_date,
                month: month.format("%b-%y").to_string(),
                month_start: month,
                time: contributed_days(record, month),
            });

            match month_end(month).succ_opt() {
                Some(next) => month = next,
                None => break,
            }
        }
    }

    if let Some(max) = monthly.iter().map(|row| row.time).max() {
        if max > 31 {
            return Err(StudyError::ExpansionCheck(format!(
                "Invalid time exceeding 31 days ({max})"
            )));
        }
    }
    if let Some(min) = monthly.iter().map(|row| row.time).min() {
        if min < 1 {
            return Err(StudyError::ExpansionCheck(format!(
                "Invalid time of less than 1 day ({min})"
            )));
        }
    }
    if let Some(expected) = time_checksum {
        let total: i64 = monthly.iter().map(|row| i64::from(row.time)).sum();
        if total != expected {
            return Err(StudyError::ExpansionCheck(format!(
                "Checksum ({total}) != ({expected})"
            )));
        }
    }

    Ok(monthly)
}

/// Follow-up from antibody test to first COVID admission, with death as the
/// competing event and the end of the six-month window as censoring
#[must_use]
pub fn admission_survival_inputs(
    patients: &[Patient],
    admissions: &[CovidAdmission],
    deaths: &[Death],
) -> Vec<SurvivalInput> {
    let mut first_admission: FxHashMap<PatientId, NaiveDate> = FxHashMap::default();
    for admission in admissions {
        let admitted = admission.admidate_dv.date();
        first_admission
            .entry(admission.newnhsno)
            .and_modify(|date| *date = (*date).min(admitted))
            .or_insert(admitted);
    }

    let mut death_dates: FxHashMap<PatientId, NaiveDate> = FxHashMap::default();
    for death in deaths {
        let died = death.dod.date();
        death_dates
            .entry(death.newnhsno)
            .and_modify(|date| *date = (*date).min(died))
            .or_insert(died);
    }

    patients
        .iter()
        .map(|patient| {
            let on_or_after_start =
                |date: Option<&NaiveDate>| date.copied().filter(|d| *d >= patient.abdate);
            SurvivalInput {
                patient_id: patient.newnhsno,
                start_date: patient.abdate,
                primary_event_date: on_or_after_start(first_admission.get(&patient.newnhsno)),
                competing_event_date: on_or_after_start(death_dates.get(&patient.newnhsno)),
                censor_date: Some(patient.abdate_6m),
            }
        })
        .collect()
}
