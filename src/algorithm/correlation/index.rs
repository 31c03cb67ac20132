//! Per-patient lookup of index infection episodes.
//!
//! Replaces the correlated subquery with a sorted timestamp list per patient,
//! so each event costs one hash lookup and one binary search.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::models::{EventTime, Infection, PatientId};
use crate::utils::dates::JulianDay;

/// Most patients have one or two episodes
type EpisodeDates = SmallVec<[EventTime; 2]>;

/// Index-episode specimen times grouped by patient, sorted ascending
#[derive(Debug, Clone, Default)]
pub struct InfectionIndex {
    episodes: FxHashMap<PatientId, EpisodeDates>,
}

impl InfectionIndex {
    /// Build the index from an infections relation, keeping only the first
    /// test of each episode (`INFECTION_NUM = 1`)
    #[must_use]
    pub fn from_infections(infections: &[Infection]) -> Self {
        let index: Self = infections
            .iter()
            .filter(|infection| infection.is_index_episode())
            .map(|infection| (infection.newnhsno, infection.specimen_date))
            .collect();

        log::debug!(
            "Indexed {} index episodes for {} patients ({} with more than one)",
            index.episode_count(),
            index.patient_count(),
            index.patients_with_multiple_episodes()
        );

        index
    }

    /// Latest index-episode specimen time on or before `cutoff`
    #[must_use]
    pub fn closest_prior<T: JulianDay>(
        &self,
        patient: PatientId,
        cutoff: &T,
    ) -> Option<EventTime> {
        let dates = self.episodes.get(&patient)?;
        let cutoff = cutoff.julian_day();
        let eligible = dates.partition_point(|date| date.julian_day() <= cutoff);
        eligible.checked_sub(1).map(|idx| dates[idx])
    }

    /// Index-episode dates for one patient, oldest first
    #[must_use]
    pub fn episodes(&self, patient: PatientId) -> &[EventTime] {
        self.episodes
            .get(&patient)
            .map(|dates| dates.as_slice())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn patient_count(&self) -> usize {
        self.episodes.len()
    }

    #[must_use]
    pub fn episode_count(&self) -> usize {
        self.episodes.values().map(SmallVec::len).sum()
    }

    /// Patients with more than one `INFECTION_NUM = 1` row
    #[must_use]
    pub fn patients_with_multiple_episodes(&self) -> usize {
        self.episodes.values().filter(|dates| dates.len() > 1).count()
    }
}

impl<T: Into<EventTime>> FromIterator<(PatientId, T)> for InfectionIndex {
    fn from_iter<I: IntoIterator<Item = (PatientId, T)>>(iter: I) -> Self {
        let mut episodes: FxHashMap<PatientId, EpisodeDates> = FxHashMap::default();
        for (patient, at) in iter {
            episodes.entry(patient).or_default().push(at.into());
        }
        for dates in episodes.values_mut() {
            dates.sort_unstable();
        }
        Self { episodes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32) -> Option<EventTime> {
        Some(date(y, m, d).into())
    }

    fn infection(patient: PatientId, specimen: NaiveDate, episode: i64, num: i64) -> Infection {
        Infection {
            newnhsno: patient,
            specimen_date: specimen.into(),
            episode_num: episode,
            infection_num: num,
            days_since_episode_start: 0,
        }
    }

    #[test]
    fn ignores_follow_up_tests() {
        let index = InfectionIndex::from_infections(&[
            infection(1, date(2021, 1, 1), 1, 1),
            infection(1, date(2021, 1, 3), 1, 2),
        ]);

        assert_eq!(index.episodes(1), &[EventTime::from(date(2021, 1, 1))]);
        assert_eq!(index.closest_prior(1, &date(2021, 1, 5)), at(2021, 1, 1));
    }

    #[test]
    fn picks_latest_episode_before_cutoff() {
        let index = InfectionIndex::from_infections(&[
            infection(7, date(2021, 6, 1), 2, 1),
            infection(7, date(2021, 1, 1), 1, 1),
        ]);

        assert_eq!(index.patients_with_multiple_episodes(), 1);
        assert_eq!(index.closest_prior(7, &date(2021, 3, 1)), at(2021, 1, 1));
        assert_eq!(index.closest_prior(7, &date(2021, 6, 1)), at(2021, 6, 1));
        assert_eq!(index.closest_prior(7, &date(2020, 12, 31)), None);
    }

    #[test]
    fn time_of_day_decides_same_day_episodes() {
        let morning = date(2021, 3, 1).and_hms_opt(9, 0, 0).unwrap();
        let index: InfectionIndex = [(3, morning)].into_iter().collect();

        assert_eq!(index.closest_prior(3, &date(2021, 3, 1)), None);
        let noon = date(2021, 3, 1).and_hms_opt(12, 0, 0).unwrap();
        assert_eq!(index.closest_prior(3, &noon), Some(EventTime::from(morning)));
    }

    #[test]
    fn unknown_patient_has_no_match() {
        let index = InfectionIndex::default();
        assert_eq!(index.closest_prior(99, &date(2021, 1, 1)), None);
        assert!(index.episodes(99).is_empty());
    }
}
