//! Calendar-month arithmetic
//!
//! The projection runs on a monthly grid, so every date a user supplies is
//! normalised to its calendar month before it reaches the engine.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::ProjectionError;

/// A calendar month, ordered chronologically and displayed as `YYYY-MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Returns `None` unless `month` is in 1..=12
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(Self { year, month })
        } else {
            None
        }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// First day of the month
    pub fn first_day(&self) -> NaiveDate {
        // year/month are range-checked on construction; day 1 always exists
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// The following calendar month
    pub fn succ(&self) -> Self {
        self.add_months(1)
    }

    /// Shift by a signed number of months
    pub fn add_months(&self, months: i64) -> Self {
        let total = self.ordinal() + months;
        Self {
            year: total.div_euclid(12) as i32,
            month: (total.rem_euclid(12) + 1) as u32,
        }
    }

    /// Signed number of months from `earlier` to `self`
    pub fn months_since(&self, earlier: YearMonth) -> i64 {
        self.ordinal() - earlier.ordinal()
    }

    /// Long form used in human-readable messages, e.g. "March 2025"
    pub fn long_name(&self) -> String {
        self.first_day().format("%B %Y").to_string()
    }

    fn ordinal(&self) -> i64 {
        self.year as i64 * 12 + (self.month as i64 - 1)
    }
}

impl From<NaiveDate> for YearMonth {
    fn from(date: NaiveDate) -> Self {
        Self::from_date(date)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = ProjectionError;

    /// Accepts `YYYY-MM` or a full `YYYY-MM-DD` date
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Ok(Self::from_date(date));
        }
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| ProjectionError::invalid("year_month", format!("expected YYYY-MM, got '{s}'")))?;
        let year: i32 = year
            .parse()
            .map_err(|_| ProjectionError::invalid("year_month", format!("bad year in '{s}'")))?;
        let month: u32 = month
            .parse()
            .map_err(|_| ProjectionError::invalid("year_month", format!("bad month in '{s}'")))?;
        Self::new(year, month)
            .ok_or_else(|| ProjectionError::invalid("year_month", format!("month out of range in '{s}'")))
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
