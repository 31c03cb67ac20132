//! Error handling for the study database and correlation pipeline.

use std::io;
use std::path::PathBuf;

use arrow::error::ArrowError;
use parquet::errors::ParquetError;

/// Errors that can occur while building, loading or querying study data
#[derive(Debug, thiserror::Error)]
pub enum StudyError {
    /// Error opening or reading a file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Error reported by the SQLite engine
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Error processing Parquet data
    #[error("Parquet error: {0}")]
    Parquet(#[from] ParquetError),

    /// Error processing Arrow data
    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    /// Error converting between record batches and models
    #[error("Arrow serialization error: {0}")]
    SerdeArrow(#[from] serde_arrow::Error),

    /// Error parsing a configuration file
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// Configuration values that cannot be used
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The database file was expected to exist
    #[error("SQLite database does not exist at {}", .0.display())]
    DatabaseNotFound(PathBuf),

    /// A statement that would modify the database was passed to a read-only query
    #[error("{0} statements are not allowed in read-only queries")]
    ProhibitedStatement(String),

    /// A name that is neither a study table nor a derived view
    #[error("Unknown table or view: {0}")]
    UnknownRelation(String),

    /// A required column is missing from a record batch
    #[error("Column not found: {column}")]
    ColumnNotFound { column: String },

    /// Survival data that cannot produce a valid end date or time at risk
    #[error("Invalid survival data for patient {patient_id}: {reason}")]
    InvalidSurvivalData { patient_id: i64, reason: String },

    /// Monthly expansion produced values outside the valid range
    #[error("Process failure: {0}")]
    ExpansionCheck(String),
}

/// Result type for study operations
pub type Result<T> = std::result::Result<T, StudyError>;
