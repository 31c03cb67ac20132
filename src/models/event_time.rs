//! Specimen, admission and death timestamps.
//!
//! Source extracts store these columns either as plain dates (`2021-01-15`)
//! or as date-times (`2021-01-15 06:00:00`). Both forms are read into one
//! type. A plain date is midnight, and any time of day is kept so it shifts
//! the Julian day gap.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::ToSql;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

use crate::utils::dates::JulianDay;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Accepted date-time layouts, tried in order before the date-only fallback
const DATE_TIME_FORMATS: [&str; 3] = [DATE_TIME_FORMAT, "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Not a date or date-time: {0:?}")]
pub struct ParseEventTimeError(String);

/// A clinical date with an optional time of day
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventTime(NaiveDateTime);

impl EventTime {
    #[must_use]
    pub const fn new(date_time: NaiveDateTime) -> Self {
        Self(date_time)
    }

    /// Calendar day, dropping the time of day
    #[must_use]
    pub fn date(self) -> NaiveDate {
        self.0.date()
    }

    #[must_use]
    pub const fn date_time(self) -> NaiveDateTime {
        self.0
    }

    /// No time of day was recorded, or it was exactly midnight
    #[must_use]
    pub fn is_date_only(self) -> bool {
        self.0.time() == NaiveTime::MIN
    }
}

impl From<NaiveDate> for EventTime {
    fn from(date: NaiveDate) -> Self {
        Self(date.and_time(NaiveTime::MIN))
    }
}

impl From<NaiveDateTime> for EventTime {
    fn from(date_time: NaiveDateTime) -> Self {
        Self(date_time)
    }
}

impl FromStr for EventTime {
    type Err = ParseEventTimeError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let text = text.trim();
        DATE_TIME_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
            .map(Self)
            .or_else(|| NaiveDate::parse_from_str(text, DATE_FORMAT).ok().map(Self::from))
            .ok_or_else(|| ParseEventTimeError(text.to_string()))
    }
}

/// Plain dates print without a time so they stay comparable with date-only
/// columns in SQL
impl fmt::Display for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_date_only() {
            write!(f, "{}", self.0.format(DATE_FORMAT))
        } else {
            write!(f, "{}", self.0.format(DATE_TIME_FORMAT))
        }
    }
}

impl JulianDay for EventTime {
    fn julian_day(&self) -> f64 {
        self.0.julian_day()
    }
}

impl PartialEq<NaiveDate> for EventTime {
    fn eq(&self, other: &NaiveDate) -> bool {
        *self == Self::from(*other)
    }
}

impl PartialOrd<NaiveDate> for EventTime {
    fn partial_cmp(&self, other: &NaiveDate) -> Option<Ordering> {
        Some(self.cmp(&Self::from(*other)))
    }
}

impl ToSql for EventTime {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.to_string()))
    }
}

impl FromSql for EventTime {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|err| FromSqlError::Other(Box::new(err)))
    }
}
