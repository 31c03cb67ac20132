//! Timed operations on study files and databases.
//!
//! An [`Operation`] logs its target when it starts and, on
//! [`Operation::finish`], how many rows it handled and how long it took.

use std::fmt;
use std::path::Path;
use std::time::{Duration, Instant};

/// What is being done to a file, directory or database
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    InitialiseDatabase,
    WriteParquet,
    ReadParquet,
    ExportDataset,
    LoadDataset,
}

impl Action {
    const fn verb(self) -> &'static str {
        match self {
            Self::InitialiseDatabase => "Initialising database",
            Self::WriteParquet => "Writing",
            Self::ReadParquet => "Reading",
            Self::ExportDataset => "Exporting dataset to",
            Self::LoadDataset => "Loading dataset from",
        }
    }

    /// Per-file steps of a larger operation log below `info`
    const fn level(self) -> log::Level {
        match self {
            Self::WriteParquet | Self::ReadParquet => log::Level::Debug,
            _ => log::Level::Info,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

/// An operation in progress
#[derive(Debug)]
#[must_use = "call finish to log the outcome"]
pub struct Operation<'a> {
    action: Action,
    target: &'a Path,
    started: Instant,
}

impl<'a> Operation<'a> {
    pub fn start(action: Action, target: &'a Path) -> Self {
        log::log!(action.level(), "{action} {}", target.display());
        Self {
            action,
            target,
            started: Instant::now(),
        }
    }

    /// Log the row count and elapsed time, returning the elapsed time
    pub fn finish(self, rows: usize) -> Duration {
        let elapsed = self.started.elapsed();
        log::log!(
            self.action.level(),
            "{} {}: {rows} rows in {elapsed:?}",
            self.action,
            self.target.display()
        );
        elapsed
    }
}
