//! In-memory evaluation of the `covid_admissions` and `covid_deaths` views.
//!
//! | View               | Events           | Date          | Flag              | Window |
//! |--------------------|------------------|---------------|-------------------|--------|
//! | `covid_admissions` | hospitalisations | `ADMIDATE_DV` | `DIAG_CODE_MATCH` | 14     |
//! | `covid_deaths`     | deaths           | `DOD`         | `CODE_UNDERLYING` | 28     |
//!
//! Results keep the order of the input events. [`CovidViews::agrees_with`]
//! compares against the SQL views, which order by patient and event date.

use std::cmp::Ordering;
use std::time::Instant;

use rayon::prelude::*;

use crate::algorithm::correlation::{
    ClinicalEvent, ClinicalWindow, CorrelatedEvent, InfectionIndex, classify,
};
use crate::models::{
    CovidAdmission, CovidDeath, Dataset, Death, EventTime, Hospitalisation, Infection, PatientId,
};

impl ClinicalEvent for Hospitalisation {
    type Timestamp = EventTime;

    fn patient_id(&self) -> PatientId {
        self.newnhsno
    }

    fn event_date(&self) -> EventTime {
        self.admidate_dv
    }

    fn independent_flag(&self) -> bool {
        self.diag_code_match
    }
}

impl ClinicalEvent for Death {
    type Timestamp = EventTime;

    fn patient_id(&self) -> PatientId {
        self.newnhsno
    }

    fn event_date(&self) -> EventTime {
        self.dod
    }

    fn independent_flag(&self) -> bool {
        self.code_underlying
    }
}

impl From<CorrelatedEvent<Hospitalisation>> for CovidAdmission {
    fn from(correlated: CorrelatedEvent<Hospitalisation>) -> Self {
        let CorrelatedEvent { event, correlation } = correlated;
        Self {
            newnhsno: event.newnhsno,
            admidate_dv: event.admidate_dv,
            episode_count: event.episode_count,
            admi_len: event.admi_len,
            diag_code_match: event.diag_code_match,
            closest_prior_episode_start_date: correlation.closest_prior_episode_start_date,
            infection_to_admission_days: correlation.gap_days,
            infection_within_14_days_prior: correlation.within_window,
        }
    }
}

impl From<CorrelatedEvent<Death>> for CovidDeath {
    fn from(correlated: CorrelatedEvent<Death>) -> Self {
        let CorrelatedEvent { event, correlation } = correlated;
        Self {
            newnhsno: event.newnhsno,
            dod: event.dod,
            icdu_group: event.icdu_group,
            icd10: event.icd10,
            code_mentioned: event.code_mentioned,
            code_underlying: event.code_underlying,
            closest_prior_episode_start_date: correlation.closest_prior_episode_start_date,
            infection_to_death_days: correlation.gap_days,
            infection_within_28_days_prior: correlation.within_window,
        }
    }
}

/// Classify every event and keep those that qualify
#[must_use]
pub fn correlate_events<E>(
    events: &[E],
    index: &InfectionIndex,
    window: ClinicalWindow,
) -> Vec<CorrelatedEvent<E>>
where
    E: ClinicalEvent + Clone + Send + Sync,
{
    events
        .par_iter()
        .filter_map(|event| {
            let classification = classify(event, index, window);
            classification.include.then(|| CorrelatedEvent {
                event: event.clone(),
                correlation: classification.correlation,
            })
        })
        .collect()
}

/// Hospitalisations linked to an index infection within 14 days, or coded as COVID
#[must_use]
pub fn covid_admissions(
    hospitalisations: &[Hospitalisation],
    infections: &[Infection],
) -> Vec<CovidAdmission> {
    let index = InfectionIndex::from_infections(infections);
    covid_admissions_with_index(hospitalisations, &index)
}

#[must_use]
pub fn covid_admissions_with_index(
    hospitalisations: &[Hospitalisation],
    index: &InfectionIndex,
) -> Vec<CovidAdmission> {
    correlate_events(hospitalisations, index, ClinicalWindow::ADMISSION)
        .into_iter()
        .map(CovidAdmission::from)
        .collect()
}

/// Deaths linked to an index infection within 28 days, or with COVID as underlying cause
#[must_use]
pub fn covid_deaths(deaths: &[Death], infections: &[Infection]) -> Vec<CovidDeath> {
    let index = InfectionIndex::from_infections(infections);
    covid_deaths_with_index(deaths, &index)
}

#[must_use]
pub fn covid_deaths_with_index(deaths: &[Death], index: &InfectionIndex) -> Vec<CovidDeath> {
    correlate_events(deaths, index, ClinicalWindow::DEATH)
        .into_iter()
        .map(CovidDeath::from)
        .collect()
}

/// Both derived views evaluated over one dataset
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CovidViews {
    pub admissions: Vec<CovidAdmission>,
    pub deaths: Vec<CovidDeath>,
}

impl CovidViews {
    /// Evaluate both views, sharing one infection index
    #[must_use]
    pub fn evaluate(dataset: &Dataset) -> Self {
        let start = Instant::now();
        let index = InfectionIndex::from_infections(&dataset.infections);

        let (admissions, deaths) = rayon::join(
            || covid_admissions_with_index(&dataset.hospitalisations, &index),
            || covid_deaths_with_index(&dataset.deaths, &index),
        );

        log::info!(
            "Evaluated covid_admissions ({} of {} rows) and covid_deaths ({} of {} rows) in {:?}",
            admissions.len(),
            dataset.hospitalisations.len(),
            deaths.len(),
            dataset.deaths.len(),
            start.elapsed()
        );

        Self { admissions, deaths }
    }
    /// Both views hold exactly the given rows, in any order
    #[must_use]
    pub fn agrees_with(&self, admissions: &[CovidAdmission], deaths: &[CovidDeath]) -> bool {
        same_rows(&self.admissions, admissions, admission_order)
            && same_rows(&self.deaths, deaths, death_order)
    }
}

fn same_rows<T>(ours: &[T], theirs: &[T], order: fn(&T, &T) -> Ordering) -> bool
where
    T: Clone + PartialEq,
{
    if ours.len() != theirs.len() {
        return false;
    }
    let mut ours = ours.to_vec();
    let mut theirs = theirs.to_vec();
    ours.sort_by(order);
    theirs.sort_by(order);
    ours == theirs
}

fn gap_order(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        _ => a.is_some().cmp(&b.is_some()),
    }
}

fn admission_order(a: &CovidAdmission, b: &CovidAdmission) -> Ordering {
    let key = |row: &CovidAdmission| {
        (
            row.newnhsno,
            row.admidate_dv,
            row.episode_count,
            row.admi_len,
            row.diag_code_match,
            row.closest_prior_episode_start_date,
            row.infection_within_14_days_prior,
        )
    };
    key(a)
        .cmp(&key(b))
        .then_with(|| gap_order(a.infection_to_admission_days, b.infection_to_admission_days))
}

fn death_order(a: &CovidDeath, b: &CovidDeath) -> Ordering {
    let key = |row: &CovidDeath| {
        (
            row.newnhsno,
            row.dod,
            row.icdu_group.clone(),
            row.icd10.clone(),
            row.code_mentioned,
            row.code_underlying,
            row.closest_prior_episode_start_date,
            row.infection_within_28_days_prior,
        )
    };
    key(a)
        .cmp(&key(b))
        .then_with(|| gap_order(a.infection_to_death_days, b.infection_to_death_days))
}
