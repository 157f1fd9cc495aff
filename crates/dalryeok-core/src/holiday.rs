use serde::Serialize;

use crate::date::CalendarDate;

/// Generic badge label for holiday names too long to fit a cell.
pub const GENERIC_HOLIDAY_LABEL: &str = "공휴일";

const BADGE_MAX_CHARS: usize = 5;

/// A national holiday on a fixed solar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Holiday {
    pub month: u32,
    pub day: u32,
    pub name: &'static str,
}

impl Holiday {
    /// Table key in `M-D` form, without zero padding.
    pub fn key(&self) -> String {
        format!("{}-{}", self.month, self.day)
    }
}

/// Fixed-date Korean national holidays. Lunar and substitute holidays are not
/// modeled.
pub const FIXED_HOLIDAYS: [Holiday; 8] = [
    Holiday { month: 1, day: 1, name: "신정" },
    Holiday { month: 3, day: 1, name: "삼일절" },
    Holiday { month: 5, day: 5, name: "어린이날" },
    Holiday { month: 6, day: 6, name: "현충일" },
    Holiday { month: 8, day: 15, name: "광복절" },
    Holiday { month: 10, day: 3, name: "개천절" },
    Holiday { month: 10, day: 9, name: "한글날" },
    Holiday { month: 12, day: 25, name: "성탄절" },
];

/// Name of the fixed holiday on `date`, or `""` when there is none.
pub fn korean_holiday_name(date: CalendarDate) -> &'static str {
    FIXED_HOLIDAYS
        .iter()
        .find(|h| h.month == date.month() && h.day == date.day())
        .map(|h| h.name)
        .unwrap_or("")
}

pub fn is_holiday(date: CalendarDate) -> bool {
    !korean_holiday_name(date).is_empty()
}

/// Short label for a cell badge.
pub fn holiday_badge(name: &str) -> &str {
    if name.chars().count() > BADGE_MAX_CHARS {
        GENERIC_HOLIDAY_LABEL
    } else {
        name
    }
}
