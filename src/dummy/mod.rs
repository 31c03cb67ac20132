//! Synthetic cohort generation.
//!
//! Produces a deterministic (per seed) population shaped like the linked
//! study extract: antibody-tested patients, their positive tests grouped into
//! episodes, and therapeutics, admissions and deaths that follow infections.

use std::time::Instant;

use chrono::{Days, NaiveDate};
use rand::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::config::DummyDataConfig;
use crate::models::{
    Dataset, Death, Demographics, Hospitalisation, INDEX_INFECTION_NUM, Infection, Patient,
    PatientId, Therapeutic,
};
use crate::utils::logging::{create_main_progress_bar, finish_progress_bar};

/// Days from the antibody test to the end of follow-up
pub const FOLLOW_UP_DAYS: u64 = 180;

/// Minimum days between an episode start and a test that opens a new episode
pub const EPISODE_LENGTH_DAYS: i64 = 91;

const COHORTS: [&str; 2] = ["RD", "BC"];
const SEXES: [&str; 2] = ["M", "F"];
const INTERVENTIONS: [&str; 6] = ["A", "B", "C", "D", "E", "F"];
const ICDU_GROUPS: [&str; 3] = ["Group1", "Group2", "Group3"];

/// Seeded generator for a synthetic [`Dataset`]
pub struct DummyDataGenerator {
    config: DummyDataConfig,
    rng: StdRng,
}

impl DummyDataGenerator {
    #[must_use]
    pub fn new(config: DummyDataConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self { config, rng }
    }

    /// Generate every relation, then drop events after each patient's
    /// follow-up end (`ABDATE_6M`).
    #[must_use]
    pub fn generate(mut self) -> Dataset {
        let start = Instant::now();
        log::info!(
            "Creating dummy data for {} patients between {} and {} (seed {})",
            self.config.n_patients,
            self.config.start_date,
            self.config.end_date,
            self.config.seed
        );

        let patients = self.patients();
        let demographics = self.demographics(patients.len());
        let infections = self.infections(&patients);
        let therapeutics = self.therapeutics(&infections);
        let hospitalisations = self.hospitalisations(&infections);
        let deaths = self.deaths(&hospitalisations);

        let dataset = drop_rows_outside_study_period(Dataset {
            patients,
            demographics,
            infections,
            therapeutics,
            hospitalisations,
            deaths,
        });

        log::info!(
            "Generated {} rows in {:?}: {}",
            dataset.total_rows(),
            start.elapsed(),
            dataset
        );
        dataset
    }

    fn chance(&mut self, probability: f64) -> bool {
        self.rng.random_bool(probability.clamp(0.0, 1.0))
    }

    fn pick<'a>(&mut self, options: &[&'a str]) -> &'a str {
        options[self.rng.random_range(0..options.len())]
    }

    /// Date uniformly drawn from `from..=to`
    fn date_between(&mut self, from: NaiveDate, to: NaiveDate) -> NaiveDate {
        let span = u64::try_from((to - from).num_days()).unwrap_or_default();
        from + Days::new(self.rng.random_range(0..=span))
    }

    /// `date` shifted forward by a whole number of days drawn from `low..high`
    fn days_after(&mut self, date: NaiveDate, low: u64, high: u64) -> NaiveDate {
        date + Days::new(self.rng.random_range(low..high))
    }

    /// Knuth's multiplication method; fine for the small means used here
    fn poisson(&mut self, mean: f64) -> u64 {
        let limit = (-mean).exp();
        let mut product = 1.0;
        let mut count = 0;
        loop {
            product *= self.rng.random::<f64>();
            if product <= limit {
                return count;
            }
            count += 1;
        }
    }

    fn patients(&mut self) -> Vec<Patient> {
        let (start, end) = (self.config.start_date, self.config.end_date);
        (1..=self.config.n_patients)
            .map(|id| {
                let abdate = self.date_between(start, end);
                Patient {
                    newnhsno: id as PatientId,
                    abdate,
                    abdate_6m: abdate + Days::new(FOLLOW_UP_DAYS),
                    cohort: self.pick(&COHORTS).to_string(),
                    ab_status: self.rng.random_bool(0.5),
                }
            })
            .collect()
    }

    fn demographics(&mut self, n: usize) -> Vec<Demographics> {
        let earliest = NaiveDate::from_ymd_opt(1950, 1, 1).unwrap_or_default();
        let latest = NaiveDate::from_ymd_opt(2003, 1, 1).unwrap_or_default();
        (1..=n)
            .map(|id| Demographics {
                newnhsno: id as PatientId,
                dob: self.date_between(earliest, latest),
                sex: self.pick(&SEXES).to_string(),
            })
            .collect()
    }

    /// Positive tests per patient.
    ///
    /// Each new infection starts at least 91 days after the previous test and
    /// is followed by `1 + Poisson(1)` tests a few days apart. Tests more than
    /// 91 days after the current episode start open a new episode and reset
    /// `INFECTION_NUM` to 1.
    fn infections(&mut self, patients: &[Patient]) -> Vec<Infection> {
        let pb = create_main_progress_bar(patients.len() as u64, Some("Generating infections"));
        let mut infections = Vec::new();

        for patient in patients {
            let max_date = patient.abdate + Days::new(FOLLOW_UP_DAYS - 1);
            let mut current_date = patient.abdate;
            let mut episode_start: Option<NaiveDate> = None;
            let mut episode_num = 1;
            let mut infection_num = 1;

            'infections: while self.chance(self.config.infection_chance) {
                let infection_date = match episode_start {
                    None => self.days_after(current_date, 1, FOLLOW_UP_DAYS),
                    Some(_) => self.days_after(current_date, 91, FOLLOW_UP_DAYS),
                };
                let started = match episode_start {
                    Some(start) if (infection_date - start).num_days() <= EPISODE_LENGTH_DAYS => {
                        start
                    }
                    Some(_) => {
                        episode_num += 1;
                        infection_num = 1;
                        infection_date
                    }
                    None => infection_date,
                };
                episode_start = Some(started);

                let tests = self.poisson(1.0) + 1;
                for test in 0..tests {
                    let specimen_date = if test == 0 {
                        infection_date
                    } else {
                        let spread = self.poisson(2.0) + 2;
                        self.days_after(current_date, 1, spread)
                    };
                    current_date = specimen_date;

                    // Dates only move forward, so nothing later can fit either
                    if specimen_date > max_date {
                        break 'infections;
                    }

                    infections.push(Infection {
                        newnhsno: patient.newnhsno,
                        specimen_date: specimen_date.into(),
                        episode_num,
                        infection_num,
                        days_since_episode_start: (specimen_date - started).num_days(),
                    });
                    infection_num += 1;
                }
            }
            pb.inc(1);
        }

        finish_progress_bar(&pb, Some("Infections generated"));
        infections
    }

    /// Therapeutics follow index infections only, one to four days later
    fn therapeutics(&mut self, infections: &[Infection]) -> Vec<Therapeutic> {
        let mut received_counts: FxHashMap<PatientId, i64> = FxHashMap::default();
        let mut therapeutics = Vec::new();

        for infection in infections.iter().filter(|i| i.infection_num == INDEX_INFECTION_NUM) {
            if !self.chance(self.config.therapeutic_chance) {
                continue;
            }
            let count = received_counts.entry(infection.newnhsno).or_default();
            *count += 1;

            therapeutics.push(Therapeutic {
                newnhsno: infection.newnhsno,
                therapeutic_num: *count,
                received: self.days_after(infection.specimen_date.date(), 1, 5),
                intervention: self.pick(&INTERVENTIONS).to_string(),
            });
        }
        therapeutics
    }

    /// Any positive test may be followed by an admission within 13 days
    fn hospitalisations(&mut self, infections: &[Infection]) -> Vec<Hospitalisation> {
        let mut hospitalisations = Vec::new();
        for infection in infections {
            if !self.chance(self.config.hospitalisation_chance) {
                continue;
            }
            hospitalisations.push(Hospitalisation {
                newnhsno: infection.newnhsno,
                admidate_dv: self.days_after(infection.specimen_date.date(), 1, 14).into(),
                episode_count: self.rng.random_range(1..5),
                admi_len: Some(self.rng.random_range(1..30)),
                diag_code_match: self.chance(self.config.diag_code_match_chance),
            });
        }
        hospitalisations
    }

    /// Deaths follow admissions; a patient dies at most once
    fn deaths(&mut self, hospitalisations: &[Hospitalisation]) -> Vec<Death> {
        let mut deceased: FxHashSet<PatientId> = FxHashSet::default();
        let mut deaths = Vec::new();

        for admission in hospitalisations {
            if deceased.contains(&admission.newnhsno)
                || !self.chance(self.config.death_chance)
            {
                continue;
            }
            deceased.insert(admission.newnhsno);

            let code_mentioned = self.rng.random_bool(0.5);
            deaths.push(Death {
                newnhsno: admission.newnhsno,
                dod: self.days_after(admission.admidate_dv.date(), 1, 30).into(),
                icdu_group: Some(self.pick(&ICDU_GROUPS).to_string()),
                icd10: Some(format!("ICD{}", self.rng.random_range(10..99))),
                code_mentioned,
                code_underlying: code_mentioned && self.rng.random_bool(0.5),
            });
        }
        deaths
    }
}

/// Generate a dataset from `config`
#[must_use]
pub fn generate_dataset(config: &DummyDataConfig) -> Dataset {
    DummyDataGenerator::new(config.clone()).generate()
}

/// Remove event rows dated after the patient's `ABDATE_6M`.
///
/// Comparison is by calendar day, so a time of day on `ABDATE_6M` itself
/// stays in. Rows for patients missing from `patients` are removed too.
#[must_use]
pub fn drop_rows_outside_study_period(mut dataset: Dataset) -> Dataset {
    let study_end: FxHashMap<PatientId, NaiveDate> = dataset
        .patients
        .iter()
        .map(|p| (p.newnhsno, p.abdate_6m))
        .collect();
    let in_period = |patient: PatientId, date: NaiveDate| {
        study_end.get(&patient).is_some_and(|end| date <= *end)
    };

    dataset
        .infections
        .retain(|r| in_period(r.newnhsno, r.specimen_date.date()));
    dataset
        .therapeutics
        .retain(|r| in_period(r.newnhsno, r.received));
    dataset
        .hospitalisations
        .retain(|r| in_period(r.newnhsno, r.admidate_dv.date()));
    dataset.deaths.retain(|r| in_period(r.newnhsno, r.dod.date()));
    dataset
}
