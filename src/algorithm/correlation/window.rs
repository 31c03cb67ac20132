//! Clinical windows and the two inclusion predicates

use std::fmt;

use serde::{Deserialize, Serialize};

use super::ClinicalEvent;

/// Maximum number of days between index infection and event
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClinicalWindow(u32);

impl ClinicalWindow {
    /// Admissions within 14 days of a positive specimen
    pub const ADMISSION: Self = Self(14);
    /// Deaths within 28 days of a positive specimen
    pub const DEATH: Self = Self(28);

    #[must_use]
    pub const fn new(days: u32) -> Self {
        Self(days)
    }

    #[must_use]
    pub const fn days(self) -> u32 {
        self.0
    }

    /// Whether a gap of `gap_days` falls inside the window
    #[must_use]
    pub fn contains(self, gap_days: f64) -> bool {
        gap_days <= f64::from(self.0)
    }
}

impl fmt::Display for ClinicalWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} days", self.0)
    }
}

/// A correlated infection exists and the gap fits the window.
///
/// No rounding: fractional gaps from time-of-day components are compared as is.
#[must_use]
pub fn within_window(gap_days: Option<f64>, window: ClinicalWindow) -> bool {
    gap_days.is_some_and(|gap| window.contains(gap))
}

/// The upstream diagnosis or cause-of-death coding already names COVID
#[must_use]
pub fn flagged_independently<E: ClinicalEvent + ?Sized>(event: &E) -> bool {
    event.independent_flag()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_is_inclusive() {
        assert!(within_window(Some(14.0), ClinicalWindow::ADMISSION));
        assert!(!within_window(Some(15.0), ClinicalWindow::ADMISSION));
        assert!(within_window(Some(28.0), ClinicalWindow::DEATH));
        assert!(!within_window(Some(29.0), ClinicalWindow::DEATH));
    }

    #[test]
    fn fractional_gap_past_boundary() {
        assert!(!within_window(Some(14.25), ClinicalWindow::ADMISSION));
        assert!(within_window(Some(13.75), ClinicalWindow::ADMISSION));
    }

    #[test]
    fn missing_gap_is_outside() {
        assert!(!within_window(None, ClinicalWindow::DEATH));
        assert!(!within_window(None, ClinicalWindow::new(365)));
    }
}
