//! Date arithmetic, Parquet IO and logging helpers

pub mod dates;
pub mod io;
pub mod logging;

pub use dates::{JulianDay, days_between};
