//! COVID-19 outcome derivation for a linked antibody-testing cohort.
//!
//! Hospital admissions and deaths are correlated with each patient's closest
//! prior positive test. Events inside the clinical window (14 days for
//! admissions, 28 for deaths), or flagged by an upstream diagnosis code, form
//! the `covid_admissions` and `covid_deaths` views. The same views exist as
//! SQLite views over the study database and as an in-memory evaluation.

pub mod algorithm;
pub mod config;
pub mod database;
pub mod dummy;
pub mod error;
pub mod models;
pub mod utils;

// Core types
pub use config::{StudyConfig, load_config};
pub use error::{Result, StudyError};
pub use models::{
    CovidAdmission, CovidDeath, Dataset, Death, Demographics, EventTime, Hospitalisation,
    Infection, Patient, PatientId, Therapeutic,
};

// Correlation
pub use algorithm::{
    ClinicalEvent, ClinicalWindow, CovidViews, InfectionIndex, covid_admissions, covid_deaths,
};

// Database
pub use database::{
    create_database, initialise_database, open_existing, query_covid_admissions,
    query_covid_deaths,
};

// Synthetic data and IO
pub use dummy::{DummyDataGenerator, generate_dataset};
pub use utils::io::{load_dataset_async, read_dataset, write_dataset};
