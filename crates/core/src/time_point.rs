// SPDX-License-Identifier: MIT

//!
//! The Chronolane instant type
//!

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// The textual format every date in a data resource must use (e.g.
/// `1900.05.01.`)
pub const DATE_FORMAT: &str = "%Y.%m.%d.";

/// The minimum year allowed in the Chronolane system
pub const MIN_YEAR: i32 = -50000;

/// The maximum year allowed in the Chronolane system
pub const MAX_YEAR: i32 = 50000;

/// The number of milliseconds in one day
pub const MILLIS_PER_DAY: i64 = 86_400_000;

/// English month names
const ENGLISH_MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Hungarian month names
const HUNGARIAN_MONTHS: [&str; 12] = [
    "január",
    "február",
    "március",
    "április",
    "május",
    "június",
    "július",
    "augusztus",
    "szeptember",
    "október",
    "november",
    "december",
];

/// Errors that can arise when parsing a [`TimePoint`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimePointError {
    /// The text doesn't match `YYYY.MM.DD.`
    #[error("`{0}` is not a valid `YYYY.MM.DD.` date")]
    Format(String),

    /// The year is outside of [`MIN_YEAR`]..=[`MAX_YEAR`]
    #[error("`{0}` is outside of the supported year range")]
    OutOfRange(String),
}

/// The locale used when formatting a [`TimePoint`] for display
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateLocale {
    /// e.g. `1 May 1900`
    English,

    /// e.g. `1900. május 01.`
    #[default]
    Hungarian,
}

/// An absolute instant, stored as milliseconds since the Unix epoch (UTC).
///
/// Dates are civil dates with no time zone attached, so a day is always
/// exactly [`MILLIS_PER_DAY`] long.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimePoint(i64);

impl TimePoint {
    /// Parse a `YYYY.MM.DD.` string
    pub fn parse(text: &str) -> Result<Self, TimePointError> {
        let date = NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)
            .map_err(|_| TimePointError::Format(text.to_string()))?;
        if !(MIN_YEAR..=MAX_YEAR).contains(&date.year()) {
            return Err(TimePointError::OutOfRange(text.to_string()));
        }
        Ok(Self::from_naive_date(date))
    }

    /// Create a [`TimePoint`] at midnight of the given day if the date exists
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return None;
        }
        NaiveDate::from_ymd_opt(year, month, day).map(Self::from_naive_date)
    }

    /// Midnight on the 1st of January of the given year (clamped to the
    /// supported year range)
    pub fn start_of_year(year: i32) -> Self {
        let year = year.clamp(MIN_YEAR, MAX_YEAR);
        NaiveDate::from_ymd_opt(year, 1, 1)
            .map(Self::from_naive_date)
            .unwrap_or(Self::min())
    }

    /// Create a [`TimePoint`] from milliseconds since the epoch (clamped to
    /// the supported range)
    pub fn from_millis(millis: i64) -> Self {
        Self(millis.clamp(Self::min().0, Self::max().0))
    }

    /// Create a [`TimePoint`] from fractional milliseconds (rounded to the
    /// nearest millisecond and clamped to the supported range)
    pub fn from_millis_f64(millis: f64) -> Self {
        if millis.is_nan() {
            return Self(0);
        }
        let min = Self::min().0 as f64;
        let max = Self::max().0 as f64;
        Self(millis.round().clamp(min, max) as i64)
    }

    /// The earliest representable [`TimePoint`]
    pub fn min() -> Self {
        Self(year_start_millis(MIN_YEAR))
    }

    /// The latest representable [`TimePoint`] (the start of the last day of
    /// [`MAX_YEAR`])
    pub fn max() -> Self {
        Self(year_start_millis(MAX_YEAR + 1) - MILLIS_PER_DAY)
    }

    /// Milliseconds since the epoch
    pub fn as_millis(&self) -> i64 {
        self.0
    }

    /// Add a (possibly negative) number of whole days
    pub fn add_days(&self, days: i64) -> Self {
        Self::from_millis(self.0.saturating_add(days.saturating_mul(MILLIS_PER_DAY)))
    }

    /// The instant halfway between `a` and `b`
    pub fn midpoint(a: TimePoint, b: TimePoint) -> Self {
        // Both values are well inside i64, so this can't overflow
        Self((a.0 + b.0).div_euclid(2))
    }

    /// The calendar year
    pub fn year(&self) -> i32 {
        self.naive().year()
    }

    /// The calendar month (1-12)
    pub fn month(&self) -> u32 {
        self.naive().month()
    }

    /// The day of the month (1-31)
    pub fn day(&self) -> u32 {
        self.naive().day()
    }

    /// e.g. `1 May 1900` or `1900. május 01.`
    pub fn format_long(&self, locale: DateLocale) -> String {
        let month_index = (self.month() - 1) as usize;
        match locale {
            DateLocale::English => {
                format!("{} {} {}", self.day(), ENGLISH_MONTHS[month_index], self.year())
            }
            DateLocale::Hungarian => {
                format!(
                    "{}. {} {:02}.",
                    self.year(),
                    HUNGARIAN_MONTHS[month_index],
                    self.day()
                )
            }
        }
    }

    fn from_naive_date(date: NaiveDate) -> Self {
        Self(date.and_time(chrono::NaiveTime::MIN).and_utc().timestamp_millis())
    }

    fn naive(&self) -> NaiveDateTime {
        // Always in range because every constructor clamps
        DateTime::from_timestamp_millis(self.0)
            .map(|date_time| date_time.naive_utc())
            .unwrap_or_default()
    }
}

/// Milliseconds since the epoch at the start of `year`
fn year_start_millis(year: i32) -> i64 {
    NaiveDate::from_ymd_opt(year, 1, 1)
        .map(|date| {
            date.and_time(chrono::NaiveTime::MIN)
                .and_utc()
                .timestamp_millis()
        })
        .unwrap_or_default()
}

/// `YYYY.MM.DD.`
impl fmt::Display for TimePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}.{:02}.{:02}.",
            self.year(),
            self.month(),
            self.day()
        )
    }
}

impl Serialize for TimePoint {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TimePoint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        TimePoint::parse(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse() {
        // Should be ok
        let date = TimePoint::parse("1900.05.01.").unwrap();
        assert_eq!(date.year(), 1900);
        assert_eq!(date.month(), 5);
        assert_eq!(date.day(), 1);
        assert_eq!(TimePoint::parse("1970.01.01.").unwrap().as_millis(), 0);

        // Should return error
        assert!(TimePoint::parse("1900-05-01").is_err());
        assert!(TimePoint::parse("1900.05.01").is_err());
        assert!(TimePoint::parse("1900.13.01.").is_err());
        assert!(TimePoint::parse("1900.02.30.").is_err());
        assert!(TimePoint::parse("").is_err());
        assert!(TimePoint::parse("yesterday").is_err());
        assert_eq!(
            TimePoint::parse("yesterday"),
            Err(TimePointError::Format("yesterday".to_string()))
        );
        assert!(TimePoint::from_ymd(99999, 1, 1).is_none());
    }

    #[test]
    fn ordering() {
        let a = TimePoint::parse("1950.01.01.").unwrap();
        let b = TimePoint::parse("1950.01.02.").unwrap();
        assert!(a < b);
        assert_eq!(b.as_millis() - a.as_millis(), MILLIS_PER_DAY);
        assert_eq!(a.add_days(1), b);
    }

    #[test]
    fn midpoint() {
        let a = TimePoint::parse("1950.01.01.").unwrap();
        let b = TimePoint::parse("1950.01.03.").unwrap();
        assert_eq!(TimePoint::midpoint(a, b), a.add_days(1));
    }

    #[test]
    fn negative_years() {
        let date = TimePoint::start_of_year(-44);
        assert_eq!(date.year(), -44);
        assert!(date < TimePoint::start_of_year(0));
    }

    #[test]
    fn clamping() {
        assert_eq!(TimePoint::from_millis(i64::MAX), TimePoint::max());
        assert_eq!(TimePoint::from_millis_f64(f64::NEG_INFINITY), TimePoint::min());
        assert_eq!(TimePoint::from_millis_f64(1.4).as_millis(), 1);
        assert_eq!(TimePoint::max().year(), MAX_YEAR);
    }

    #[test]
    fn format() {
        let date = TimePoint::parse("1900.05.01.").unwrap();
        assert_eq!(date.format_long(DateLocale::English), "1 May 1900");
        assert_eq!(date.format_long(DateLocale::Hungarian), "1900. május 01.");
        assert_eq!(date.to_string(), "1900.05.01.");
    }

    #[test]
    fn serde() {
        let date: TimePoint = serde_json::from_str(r#""2020.01.01.""#).unwrap();
        assert_eq!(serde_json::to_string(&date).unwrap(), r#""2020.01.01.""#);
        assert!(serde_json::from_str::<TimePoint>(r#""2020/01/01""#).is_err());
    }
}
