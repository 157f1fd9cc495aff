use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use serde::{Deserialize, Serialize};

/// A date truncated to day granularity.
///
/// Two values are equal iff year, month and day-of-month match. Ordering is
/// chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    pub const MIN: CalendarDate = CalendarDate(NaiveDate::MIN);
    pub const MAX: CalendarDate = CalendarDate(NaiveDate::MAX);

    /// Build a date from its parts. Returns `None` for dates that do not exist.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    /// Month of the year, 1-based.
    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Day of the month, 1-based.
    pub fn day(&self) -> u32 {
        self.0.day()
    }

    /// Weekday index with Sunday as 0.
    pub fn weekday_index(&self) -> u32 {
        self.0.weekday().num_days_from_sunday()
    }

    /// The following calendar day, or `None` past the representable range.
    pub fn succ(&self) -> Option<Self> {
        self.0.succ_opt().map(Self)
    }

    /// The preceding calendar day, or `None` before the representable range.
    pub fn pred(&self) -> Option<Self> {
        self.0.pred_opt().map(Self)
    }

    /// Midnight at the start of this day.
    pub fn at_midnight(&self) -> NaiveDateTime {
        self.0.and_time(NaiveTime::MIN)
    }

    pub fn naive(&self) -> NaiveDate {
        self.0
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl From<NaiveDateTime> for CalendarDate {
    fn from(datetime: NaiveDateTime) -> Self {
        Self(datetime.date())
    }
}

/// Zoned timestamps resolve to the calendar day in their own zone.
impl<Tz: TimeZone> From<DateTime<Tz>> for CalendarDate {
    fn from(datetime: DateTime<Tz>) -> Self {
        Self(datetime.date_naive())
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year(), self.month(), self.day())
    }
}

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        _ => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
    }
}

/// Drop the time-of-day component.
pub fn strip_time(value: impl Into<CalendarDate>) -> CalendarDate {
    value.into()
}

/// Compare year, month and day only.
pub fn same_day(a: impl Into<CalendarDate>, b: impl Into<CalendarDate>) -> bool {
    a.into() == b.into()
}

/// Shift by `months`, pinned to the first of the month.
///
/// Pinning keeps month-length overflow out: Jan 31 + 1 month is Feb 1, never
/// March. Results outside the representable range saturate at the first or
/// last representable month.
pub fn add_months(date: CalendarDate, months: i32) -> CalendarDate {
    let total = i64::from(date.year()) * 12 + i64::from(date.month() - 1) + i64::from(months);
    let year = total.div_euclid(12);
    let month = total.rem_euclid(12) as u32 + 1;

    i32::try_from(year)
        .ok()
        .and_then(|year| CalendarDate::from_ymd(year, month, 1))
        .unwrap_or_else(|| {
            if months < 0 {
                start_of_month(CalendarDate::MIN)
            } else {
                start_of_month(CalendarDate::MAX)
            }
        })
}

pub fn start_of_month(date: CalendarDate) -> CalendarDate {
    CalendarDate(date.0.with_day(1).unwrap_or(date.0))
}

pub fn end_of_month(date: CalendarDate) -> CalendarDate {
    let last = days_in_month(date.year(), date.month());
    CalendarDate(date.0.with_day(last).unwrap_or(date.0))
}

pub fn is_weekend(date: CalendarDate) -> bool {
    matches!(date.weekday_index(), 0 | 6)
}

pub fn is_today(date: CalendarDate, today: CalendarDate) -> bool {
    same_day(date, today)
}
