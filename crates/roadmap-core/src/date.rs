//! Calendar dates and quarters
//!
//! All dates are calendar dates without time of day. Date-time strings are
//! accepted, but only their calendar-date prefix is used, as written: no
//! timezone conversion is ever applied, so a task ending on `2025-03-31`
//! always lands in Q1.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Parse an ISO calendar date.
///
/// Accepts `YYYY-MM-DD` and date-times such as `2025-03-31T23:00:00Z`.
/// Returns `None` for anything else.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    // Date-time: keep the calendar date exactly as written
    let (date_part, time_part) = s.split_once(['T', ' '])?;
    if time_part.is_empty() || !time_part.as_bytes()[0].is_ascii_digit() {
        return None;
    }
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Display format used in tooltips and detail views (`Mar 31, 2025`)
pub fn format_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// Format a raw date field: `N/A` when missing, the raw text when malformed
pub fn format_date_str(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        None | Some("") => "N/A".into(),
        Some(text) => parse_date(text).map_or_else(|| text.to_string(), format_date),
    }
}

// ============================================================================
// Quarter
// ============================================================================

/// A calendar quarter, e.g. `2025-Q3`
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quarter {
    pub year: i32,
    /// 1..=4
    pub quarter: u8,
}

impl Quarter {
    pub fn new(year: i32, quarter: u8) -> Option<Self> {
        (1..=4).contains(&quarter).then_some(Self { year, quarter })
    }

    /// The quarter containing `date`: `floor(month0 / 3) + 1` of the date's own year
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            quarter: (date.month0() / 3 + 1) as u8,
        }
    }

    /// The following quarter, wrapping Q4 into Q1 of the next year
    pub fn next(self) -> Self {
        if self.quarter >= 4 {
            Self {
                year: self.year + 1,
                quarter: 1,
            }
        } else {
            Self {
                year: self.year,
                quarter: self.quarter + 1,
            }
        }
    }

    /// Sequential number of the quarter, so that consecutive quarters differ by one
    pub fn ordinal(self) -> i64 {
        i64::from(self.year) * 4 + i64::from(self.quarter) - 1
    }

    /// First calendar day of the quarter
    pub fn first_day(self) -> NaiveDate {
        let month = u32::from(self.quarter - 1) * 3 + 1;
        NaiveDate::from_ymd_opt(self.year, month, 1).unwrap_or(NaiveDate::MIN)
    }
}

impl std::fmt::Display for Quarter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-Q{}", self.year, self.quarter)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid quarter label: {0:?} (expected YYYY-Qn)")]
pub struct QuarterParseError(pub String);

impl std::str::FromStr for Quarter {
    type Err = QuarterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || QuarterParseError(s.to_string());
        let (year, quarter) = s.split_once("-Q").ok_or_else(err)?;
        let year = year.parse::<i32>().map_err(|_| err())?;
        let quarter = quarter.parse::<u8>().map_err(|_| err())?;
        Quarter::new(year, quarter).ok_or_else(err)
    }
}

impl Serialize for Quarter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Quarter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn parse_plain_iso_date() {
        assert_eq!(parse_date("2025-02-15"), Some(date(2025, 2, 15)));
        assert_eq!(parse_date(" 2025-02-15 "), Some(date(2025, 2, 15)));
    }

    #[test]
    fn parse_date_time_keeps_calendar_date() {
        // Late-evening UTC stays on the written day, whatever the local zone
        assert_eq!(parse_date("2025-03-31T23:30:00Z"), Some(date(2025, 3, 31)));
        assert_eq!(parse_date("2025-03-31T23:30:00-08:00"), Some(date(2025, 3, 31)));
        assert_eq!(parse_date("2025-03-31 08:00"), Some(date(2025, 3, 31)));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("TBD"), None);
        assert_eq!(parse_date("2025-02-30"), None);
        assert_eq!(parse_date("03/31/2025"), None);
        assert_eq!(parse_date("2025-03-31Tfoo"), None);
    }

    #[test]
    fn format_display_dates() {
        assert_eq!(format_date(date(2025, 3, 31)), "Mar 31, 2025");
        assert_eq!(format_date_str(Some("2025-01-05")), "Jan 5, 2025");
        assert_eq!(format_date_str(None), "N/A");
        assert_eq!(format_date_str(Some("")), "N/A");
        assert_eq!(format_date_str(Some("Q3 someday")), "Q3 someday");
    }

    #[test]
    fn quarter_containing_date() {
        assert_eq!(Quarter::containing(date(2025, 1, 1)).to_string(), "2025-Q1");
        assert_eq!(Quarter::containing(date(2025, 3, 31)).to_string(), "2025-Q1");
        assert_eq!(Quarter::containing(date(2025, 4, 1)).to_string(), "2025-Q2");
        assert_eq!(Quarter::containing(date(2025, 12, 31)).to_string(), "2025-Q4");
    }

    #[test]
    fn quarter_next_wraps_year() {
        let q4 = Quarter::new(2025, 4).unwrap();
        assert_eq!(q4.next(), Quarter::new(2026, 1).unwrap());
        assert_eq!(q4.next().ordinal() - q4.ordinal(), 1);
    }

    #[test]
    fn quarter_parse_round_trip() {
        let q: Quarter = "2026-Q3".parse().unwrap();
        assert_eq!(q, Quarter::new(2026, 3).unwrap());
        assert_eq!(q.first_day(), date(2026, 7, 1));
        assert!("2026-Q5".parse::<Quarter>().is_err());
        assert!("2026Q1".parse::<Quarter>().is_err());
    }

    #[test]
    fn quarter_rejects_out_of_range() {
        assert!(Quarter::new(2025, 0).is_none());
        assert!(Quarter::new(2025, 5).is_none());
    }
}
