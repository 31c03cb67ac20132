//! Configuration for database initialisation and dummy data generation.
//!
//! Configuration is read from a JSON file. The database file lives in the same
//! folder as the configuration file.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StudyError};

/// Default configuration file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Top-level study configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StudyConfig {
    /// Database file settings
    pub database: DatabaseConfig,
    /// Synthetic cohort settings
    pub dummy_data: DummyDataConfig,
}

/// Database file settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// File name of the SQLite database, relative to the config folder
    pub db_filename: String,
    /// Drop existing tables and views before creating them
    pub overwrite: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            db_filename: "melody_dummy.db".to_string(),
            overwrite: false,
        }
    }
}

/// Synthetic cohort settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DummyDataConfig {
    /// Number of patients to generate
    pub n_patients: usize,
    /// Earliest antibody test date
    pub start_date: NaiveDate,
    /// Latest antibody test date
    pub end_date: NaiveDate,
    /// Seed for the random number generator
    pub seed: u64,
    /// Probability of each further infection while sampling a patient
    pub infection_chance: f64,
    /// Probability that an index infection is followed by a therapeutic
    pub therapeutic_chance: f64,
    /// Probability that a positive test is followed by an admission
    pub hospitalisation_chance: f64,
    /// Probability that an admission is followed by death
    pub death_chance: f64,
    /// Probability that an admission carries a COVID diagnosis code
    pub diag_code_match_chance: f64,
}

impl Default for DummyDataConfig {
    fn default() -> Self {
        Self {
            n_patients: 10_000,
            start_date: NaiveDate::from_ymd_opt(2021, 1, 1).unwrap_or_default(),
            end_date: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap_or_default(),
            seed: 42,
            infection_chance: 0.5,
            therapeutic_chance: 0.2,
            hospitalisation_chance: 0.5,
            death_chance: 0.3,
            diag_code_match_chance: 0.3,
        }
    }
}

impl StudyConfig {
    /// Check that the configuration can drive a run
    pub fn validate(&self) -> Result<()> {
        let dummy = &self.dummy_data;
        if dummy.end_date < dummy.start_date {
            return Err(StudyError::InvalidConfig(format!(
                "end_date {} is before start_date {}",
                dummy.end_date, dummy.start_date
            )));
        }

        let chances = [
            ("infection_chance", dummy.infection_chance),
            ("therapeutic_chance", dummy.therapeutic_chance),
            ("hospitalisation_chance", dummy.hospitalisation_chance),
            ("death_chance", dummy.death_chance),
            ("diag_code_match_chance", dummy.diag_code_match_chance),
        ];
        if let Some((name, value)) = chances
            .iter()
            .find(|(_, value)| !(0.0..=1.0).contains(value))
        {
            return Err(StudyError::InvalidConfig(format!(
                "{name} must be between 0 and 1, got {value}"
            )));
        }

        if self.database.db_filename.trim().is_empty() {
            return Err(StudyError::InvalidConfig(
                "db_filename must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

impl fmt::Display for StudyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Study Configuration:")?;
        writeln!(f, "  Database File: {}", self.database.db_filename)?;
        writeln!(f, "  Overwrite: {}", self.database.overwrite)?;
        writeln!(f, "  Patients: {}", self.dummy_data.n_patients)?;
        writeln!(
            f,
            "  Antibody Dates: {} to {}",
            self.dummy_data.start_date, self.dummy_data.end_date
        )?;
        writeln!(f, "  Seed: {}", self.dummy_data.seed)?;
        Ok(())
    }
}

/// Load and validate a configuration file
pub fn load_config(path: &Path) -> Result<StudyConfig> {
    if !path.exists() {
        return Err(StudyError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Config file not found at {}", path.display()),
        )));
    }

    let contents = std::fs::read_to_string(path)?;
    let config: StudyConfig = serde_json::from_str(&contents)?;
    config.validate()?;

    log::debug!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Resolve the database file next to the configuration file
#[must_use]
pub fn database_path(config_path: &Path, config: &StudyConfig) -> PathBuf {
    config_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(&config.database.db_filename)
}
