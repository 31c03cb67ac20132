//! Shared builders for integration tests

#![allow(dead_code)]

use chrono::{Days, NaiveDate, NaiveDateTime};
use covid_outcomes::{
    Dataset, Death, EventTime, Hospitalisation, Infection, Patient, PatientId,
};

#[must_use]
pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[must_use]
pub fn date_time(y: i32, m: u32, d: u32, hour: u32, minute: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(hour, minute, 0).unwrap()
}

#[must_use]
pub fn patient(id: PatientId, abdate: NaiveDate) -> Patient {
    Patient {
        newnhsno: id,
        abdate,
        abdate_6m: abdate + Days::new(180),
        cohort: "RD".to_string(),
        ab_status: true,
    }
}

#[must_use]
pub fn infection(
    id: PatientId,
    specimen_date: impl Into<EventTime>,
    episode_num: i64,
    infection_num: i64,
) -> Infection {
    Infection {
        newnhsno: id,
        specimen_date: specimen_date.into(),
        episode_num,
        infection_num,
        days_since_episode_start: 0,
    }
}

#[must_use]
pub fn hospitalisation(
    id: PatientId,
    admidate_dv: impl Into<EventTime>,
    diag_code_match: bool,
) -> Hospitalisation {
    Hospitalisation {
        newnhsno: id,
        admidate_dv: admidate_dv.into(),
        episode_count: 1,
        admi_len: Some(3),
        diag_code_match,
    }
}

#[must_use]
pub fn death(id: PatientId, dod: impl Into<EventTime>, code_underlying: bool) -> Death {
    Death {
        newnhsno: id,
        dod: dod.into(),
        icdu_group: Some("Group1".to_string()),
        icd10: Some("ICD42".to_string()),
        code_mentioned: code_underlying,
        code_underlying,
    }
}

/// Dataset with one patient per id, enrolled on 2021-01-01
#[must_use]
pub fn dataset_for(
    ids: &[PatientId],
    infections: Vec<Infection>,
    hospitalisations: Vec<Hospitalisation>,
    deaths: Vec<Death>,
) -> Dataset {
    Dataset {
        patients: ids.iter().map(|id| patient(*id, date(2021, 1, 1))).collect(),
        infections,
        hospitalisations,
        deaths,
        ..Dataset::default()
    }
}
