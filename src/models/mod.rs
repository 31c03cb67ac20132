//! Domain models for the study relations and derived views

pub mod dataset;
pub mod derived;
pub mod event_time;
pub mod records;
pub mod traits;

pub use dataset::Dataset;
pub use derived::{CovidAdmission, CovidDeath};
pub use event_time::{EventTime, ParseEventTimeError};
pub use records::{
    Death, Demographics, Hospitalisation, INDEX_INFECTION_NUM, Infection, Patient, Therapeutic,
};
pub use traits::{ArrowSchema, PatientId};
