//! Logging and progress reporting

pub mod operation;
pub mod progress;

pub use operation::{Action, Operation};
pub use progress::{create_main_progress_bar, create_spinner, finish_progress_bar};
