//! Temporal infection correlation.
//!
//! Links a clinical event (an admission or a death) to the most recent index
//! infection episode of the same patient that started on or before the event,
//! measures the gap in days, and decides whether the event counts as
//! infection-related: either the gap fits the clinical window, or upstream
//! coding already flags the record.
//!
//! The correlation is a pure function of its inputs. Absence of a prior
//! infection is an ordinary outcome and yields empty derived fields.

pub mod index;
pub mod window;

use serde::{Deserialize, Serialize};

use crate::models::{EventTime, PatientId};
use crate::utils::dates::{JulianDay, days_between};

pub use index::InfectionIndex;
pub use window::{ClinicalWindow, flagged_independently, within_window};

/// An event that can be correlated with a patient's infection history
pub trait ClinicalEvent {
    /// Date or date-time type of the event
    type Timestamp: JulianDay;

    /// Patient the event belongs to
    fn patient_id(&self) -> PatientId;

    /// When the event happened
    fn event_date(&self) -> Self::Timestamp;

    /// Upstream coding already marks the event as infection-related
    fn independent_flag(&self) -> bool;
}

/// Derived fields appended to a correlated event
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Correlation {
    /// Start of the closest prior index episode
    pub closest_prior_episode_start_date: Option<EventTime>,
    /// Days from that episode start to the event
    pub gap_days: Option<f64>,
    /// The gap fits the clinical window
    pub within_window: bool,
}

/// Correlation together with the view inclusion decision
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub correlation: Correlation,
    /// Window match or independent flag
    pub include: bool,
}

/// An event that passed classification, with its derived fields
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelatedEvent<E> {
    pub event: E,
    pub correlation: Correlation,
}

/// Latest index-episode specimen date on or before the event, if any
#[must_use]
pub fn closest_prior_infection<E: ClinicalEvent + ?Sized>(
    event: &E,
    index: &InfectionIndex,
) -> Option<EventTime> {
    index.closest_prior(event.patient_id(), &event.event_date())
}

/// Correlate an event and decide whether it belongs in the view
#[must_use]
pub fn classify<E: ClinicalEvent + ?Sized>(
    event: &E,
    index: &InfectionIndex,
    window: ClinicalWindow,
) -> Classification {
    let event_date = event.event_date();
    let closest = index.closest_prior(event.patient_id(), &event_date);
    let gap_days = closest.map(|start| days_between(&start, &event_date));
    let in_window = within_window(gap_days, window);

    Classification {
        correlation: Correlation {
            closest_prior_episode_start_date: closest,
            gap_days,
            within_window: in_window,
        },
        include: in_window || flagged_independently(event),
    }
}
