//! Study algorithms
//!
//! This module implements the infection correlation behind the derived
//! COVID-19 views and the survival-analysis helpers built on top of them.

pub mod correlation;
pub mod survival;
pub mod views;

pub use correlation::{
    ClinicalEvent, ClinicalWindow, Classification, CorrelatedEvent, Correlation, InfectionIndex,
    classify, closest_prior_infection,
};
pub use survival::{EndEventPriority, MonthlyRecord, SurvivalInput, SurvivalRecord};
pub use views::{CovidViews, correlate_events, covid_admissions, covid_deaths};
