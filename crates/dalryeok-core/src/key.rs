//! Canonical `YYYY-MM-DD` day keys.
//!
//! Keys partition events in the store. For well-formed keys lexicographic
//! order equals chronological order, which month filtering relies on.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::date::{add_months, CalendarDate};
use crate::error::DateKeyError;

/// Fallback year when a key carries no usable year segment.
const FALLBACK_YEAR: i32 = 1970;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DateKey(String);

impl DateKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Accept only canonical keys that name a real date.
    pub fn parse_canonical(s: &str) -> Result<Self, DateKeyError> {
        let well_formed = s.len() == 10
            && s.bytes().enumerate().all(|(i, b)| match i {
                4 | 7 => b == b'-',
                _ => b.is_ascii_digit(),
            });
        if !well_formed || NaiveDate::parse_from_str(s, "%Y-%m-%d").is_err() {
            return Err(DateKeyError::NotCanonical(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }

    /// The date this key names, with the permissive fallbacks of [`from_key`].
    pub fn date(&self) -> CalendarDate {
        from_key(&self.0)
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<CalendarDate> for DateKey {
    fn from(date: CalendarDate) -> Self {
        to_key(date)
    }
}

impl FromStr for DateKey {
    type Err = DateKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        key_from_iso(s)
    }
}

/// Canonical key of a date value.
pub fn to_key(date: impl Into<CalendarDate>) -> DateKey {
    DateKey(date.into().to_string())
}

/// Canonical key of an ISO date string.
///
/// Accepts `YYYY-MM-DD`, a naive `YYYY-MM-DDTHH:MM[:SS]` date-time, or an
/// RFC 3339 timestamp. Timestamps with an offset resolve to the local
/// calendar day.
pub fn key_from_iso(s: &str) -> Result<DateKey, DateKeyError> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(to_key(date));
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(s) {
        return Ok(to_key(datetime.with_timezone(&Local)));
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(s, pattern) {
            return Ok(to_key(datetime));
        }
    }
    Err(DateKeyError::NotIsoDate(s.to_string()))
}

/// Parse a key back into a date.
///
/// Segments are parsed leniently, taking the leading integer of each.
/// Missing, zero or non-numeric month and day fall back to 1. Values past
/// the end of the year or month roll over into the following ones, so
/// `2024-13-01` is January 1st 2025.
pub fn from_key(key: &str) -> CalendarDate {
    let mut segments = key.split('-');
    let year = segments
        .next()
        .and_then(leading_int)
        .and_then(|y| i32::try_from(y).ok())
        .unwrap_or(FALLBACK_YEAR);
    let month = segments.next().and_then(leading_int).filter(|&m| m != 0).unwrap_or(1);
    let day = segments.next().and_then(leading_int).filter(|&d| d != 0).unwrap_or(1);

    let first = CalendarDate::from_ymd(year, 1, 1).unwrap_or(CalendarDate::MIN);
    let month_start = match i32::try_from(month - 1) {
        Ok(offset) => add_months(first, offset),
        Err(_) if month > 0 => add_months(CalendarDate::MAX, 0),
        Err(_) => add_months(CalendarDate::MIN, 0),
    };
    offset_days(month_start, day - 1)
}

fn offset_days(date: CalendarDate, days: i64) -> CalendarDate {
    let shifted = if days >= 0 {
        date.naive().checked_add_days(chrono::Days::new(days.unsigned_abs()))
    } else {
        date.naive().checked_sub_days(chrono::Days::new(days.unsigned_abs()))
    };
    match shifted {
        Some(d) => d.into(),
        None if days < 0 => CalendarDate::MIN,
        None => CalendarDate::MAX,
    }
}

/// Leading signed integer of a segment, ignoring leading whitespace.
fn leading_int(segment: &str) -> Option<i64> {
    let s = segment.trim_start();
    let (sign, digits) = match s.strip_prefix('+') {
        Some(rest) => (1, rest),
        None => match s.strip_prefix('-') {
            Some(rest) => (-1, rest),
            None => (1, s),
        },
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> CalendarDate {
        CalendarDate::from_ymd(y, m, d).unwrap()
    }

    #[test]
    fn test_to_key_zero_pads() {
        assert_eq!(to_key(date(2024, 3, 5)).as_str(), "2024-03-05");
        assert_eq!(to_key(date(2024, 12, 25)).as_str(), "2024-12-25");
    }

    #[test]
    fn test_key_roundtrip_for_valid_keys() {
        let keys = [
            "2024-01-01",
            "2024-02-29",
            "2023-02-28",
            "2024-12-31",
            "1999-07-15",
            "2100-10-09",
        ];
        for key in keys {
            assert_eq!(to_key(from_key(key)).as_str(), key, "key {}", key);
        }
    }

    #[test]
    fn test_from_key_defaults_missing_segments() {
        assert_eq!(from_key("2024"), date(2024, 1, 1));
        assert_eq!(from_key("2024-05"), date(2024, 5, 1));
        assert_eq!(from_key("2024-05-"), date(2024, 5, 1));
    }

    #[test]
    fn test_from_key_zero_falls_back_to_one() {
        assert_eq!(from_key("2024-00-00"), date(2024, 1, 1));
        assert_eq!(from_key("2024-07-00"), date(2024, 7, 1));
    }

    #[test]
    fn test_from_key_is_lenient() {
        assert_eq!(from_key("2024-05-05abc"), date(2024, 5, 5));
        assert_eq!(from_key("2024-xx-10"), date(2024, 1, 10));
        assert_eq!(from_key(" 2024- 3- 9"), date(2024, 3, 9));
    }

    #[test]
    fn test_from_key_rolls_over() {
        assert_eq!(from_key("2024-13-01"), date(2025, 1, 1));
        assert_eq!(from_key("2023-02-29"), date(2023, 3, 1));
        assert_eq!(from_key("2024-01-32"), date(2024, 2, 1));
    }

    #[test]
    fn test_from_key_without_year() {
        assert_eq!(from_key(""), date(1970, 1, 1));
        assert_eq!(from_key("abc"), date(1970, 1, 1));
    }

    #[test]
    fn test_key_from_iso_date() {
        assert_eq!(key_from_iso("2024-03-05").unwrap().as_str(), "2024-03-05");
        assert_eq!(key_from_iso("2024-3-5").unwrap().as_str(), "2024-03-05");
        assert_eq!(
            key_from_iso("2024-03-05T23:10").unwrap().as_str(),
            "2024-03-05"
        );
        assert_eq!(
            key_from_iso("2024-03-05T23:10:59.250").unwrap().as_str(),
            "2024-03-05"
        );
    }

    #[test]
    fn test_key_from_iso_rfc3339_uses_local_day() {
        let expected = to_key(
            DateTime::parse_from_rfc3339("2024-03-05T12:00:00+09:00")
                .unwrap()
                .with_timezone(&Local),
        );
        assert_eq!(key_from_iso("2024-03-05T12:00:00+09:00").unwrap(), expected);
    }

    #[test]
    fn test_key_from_iso_rejects_garbage() {
        assert_eq!(
            key_from_iso("next tuesday"),
            Err(DateKeyError::NotIsoDate("next tuesday".to_string()))
        );
        assert!("2024-02-30".parse::<DateKey>().is_err());
    }

    #[test]
    fn test_parse_canonical() {
        assert!(DateKey::parse_canonical("2024-03-05").is_ok());
        assert!(DateKey::parse_canonical("2024-3-5").is_err());
        assert!(DateKey::parse_canonical("2024-02-30").is_err());
        assert!(DateKey::parse_canonical("2024/03/05").is_err());
        assert!(DateKey::parse_canonical("").is_err());
    }

    #[test]
    fn test_keys_sort_chronologically() {
        let mut keys = vec![
            to_key(date(2024, 10, 1)),
            to_key(date(2024, 2, 9)),
            to_key(date(2023, 12, 31)),
        ];
        keys.sort();
        let sorted: Vec<&str> = keys.iter().map(DateKey::as_str).collect();
        assert_eq!(sorted, vec!["2023-12-31", "2024-02-09", "2024-10-01"]);
    }
}
