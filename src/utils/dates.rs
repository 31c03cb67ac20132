//! Continuous day counts for date arithmetic.
//!
//! Gaps between clinical dates are measured on the Julian day scale, the same
//! scale SQLite's `julianday()` uses, so in-memory and SQL evaluations agree
//! to the last fraction of a day.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

/// Julian day number of 0001-01-01 minus one day, at midnight
const JULIAN_DAY_CE_OFFSET: f64 = 1_721_424.5;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// A point in time that can be placed on the Julian day scale
pub trait JulianDay {
    /// Days since noon, 24 November 4714 BC (proleptic Gregorian)
    fn julian_day(&self) -> f64;
}

impl JulianDay for NaiveDate {
    fn julian_day(&self) -> f64 {
        f64::from(self.num_days_from_ce()) + JULIAN_DAY_CE_OFFSET
    }
}

impl JulianDay for NaiveDateTime {
    fn julian_day(&self) -> f64 {
        let time = self.time();
        let seconds = f64::from(time.num_seconds_from_midnight())
            + f64::from(time.nanosecond()) / 1_000_000_000.0;
        self.date().julian_day() + seconds / SECONDS_PER_DAY
    }
}

/// Elapsed days from `from` to `to`, fractional where either carries a time
#[must_use]
pub fn days_between<A: JulianDay, B: JulianDay>(from: &A, to: &B) -> f64 {
    to.julian_day() - from.julian_day()
}

/// Last day of the month containing `date`
#[must_use]
pub fn month_end(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first| first.pred_opt())
        .unwrap_or(date)
}

/// First day of the month containing `date`
#[must_use]
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn matches_sqlite_julianday() {
        // SELECT julianday('2000-01-01') = 2451544.5
        assert_eq!(date(2000, 1, 1).julian_day(), 2_451_544.5);
        // SELECT julianday('2021-01-10') = 2459224.5
        assert_eq!(date(2021, 1, 10).julian_day(), 2_459_224.5);
    }

    #[test]
    fn time_of_day_is_fractional() {
        let noon = date(2021, 1, 1).and_hms_opt(12, 0, 0).unwrap();
        assert_eq!(noon.julian_day(), date(2021, 1, 1).julian_day() + 0.5);
        assert_eq!(days_between(&date(2021, 1, 1), &noon), 0.5);
    }

    #[test]
    fn month_boundaries() {
        assert_eq!(month_end(date(2024, 2, 10)), date(2024, 2, 29));
        assert_eq!(month_end(date(2021, 12, 3)), date(2021, 12, 31));
        assert_eq!(month_start(date(2021, 12, 3)), date(2021, 12, 1));
    }
}
