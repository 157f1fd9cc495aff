use serde::Serialize;

use crate::date::{end_of_month, is_today, is_weekend, start_of_month, CalendarDate};
use crate::holiday::korean_holiday_name;

/// Cells in a display grid: six full Sunday-first weeks.
pub const GRID_CELLS: usize = 42;

pub const DAYS_PER_WEEK: usize = 7;

/// One day of the display grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GridCell {
    pub date: CalendarDate,
    /// Whether the day lies in the reference month. Used for dimming only.
    pub in_month: bool,
}

impl GridCell {
    pub fn weekday_index(&self) -> u32 {
        self.date.weekday_index()
    }

    pub fn is_weekend(&self) -> bool {
        is_weekend(self.date)
    }

    pub fn is_today(&self, today: CalendarDate) -> bool {
        is_today(self.date, today)
    }

    pub fn holiday_name(&self) -> &'static str {
        korean_holiday_name(self.date)
    }

    /// Red day number: a weekend or holiday inside the reference month.
    pub fn is_red_day(&self) -> bool {
        self.in_month && (self.is_weekend() || !self.holiday_name().is_empty())
    }
}

/// Build the display grid for the month containing `view_date`.
///
/// The grid always holds [`GRID_CELLS`] consecutive days starting on a
/// Sunday: the tail of the previous month, every day of the reference month,
/// then the head of the next month. Six rows are emitted even when five would
/// fit, so the layout height never changes between months.
pub fn build_month_matrix(view_date: CalendarDate) -> Vec<GridCell> {
    let start = start_of_month(view_date);
    let end = end_of_month(view_date);
    let lead = start.weekday_index() as usize;

    let mut cells = Vec::with_capacity(GRID_CELLS);

    let mut leading = Vec::with_capacity(lead);
    let mut cursor = start;
    for _ in 0..lead {
        match cursor.pred() {
            Some(prev) => {
                leading.push(GridCell {
                    date: prev,
                    in_month: false,
                });
                cursor = prev;
            }
            None => break,
        }
    }
    cells.extend(leading.into_iter().rev());

    let mut day = start;
    loop {
        cells.push(GridCell {
            date: day,
            in_month: true,
        });
        if day >= end {
            break;
        }
        match day.succ() {
            Some(next) => day = next,
            None => break,
        }
    }

    while cells.len() % DAYS_PER_WEEK != 0 || cells.len() < GRID_CELLS {
        let Some(next) = cells.last().and_then(|c| c.date.succ()) else {
            break;
        };
        cells.push(GridCell {
            date: next,
            in_month: false,
        });
    }

    cells
}

/// Split a grid into week rows.
pub fn weeks(cells: &[GridCell]) -> impl Iterator<Item = &[GridCell]> {
    cells.chunks(DAYS_PER_WEEK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::add_months;

    fn date(y: i32, m: u32, d: u32) -> CalendarDate {
        CalendarDate::from_ymd(y, m, d).unwrap()
    }

    #[test]
    fn test_march_2024_layout() {
        let cells = build_month_matrix(date(2024, 3, 14));
        assert_eq!(cells.len(), GRID_CELLS);

        let before = cells.iter().take_while(|c| !c.in_month).count();
        let during = cells.iter().filter(|c| c.in_month).count();
        let after = cells.len() - before - during;
        assert_eq!(before, 5);
        assert_eq!(during, 31);
        assert_eq!(after, 6);

        assert_eq!(cells[0].date, date(2024, 2, 25));
        assert_eq!(cells[5].date, date(2024, 3, 1));
        assert_eq!(cells[41].date, date(2024, 4, 6));
    }

    #[test]
    fn test_month_starting_sunday_has_no_lead() {
        // February 2026 starts on a Sunday and fits four rows.
        let cells = build_month_matrix(date(2026, 2, 1));
        assert_eq!(cells.len(), GRID_CELLS);
        assert_eq!(cells[0].date, date(2026, 2, 1));
        assert!(cells[0].in_month);
        assert_eq!(cells.iter().filter(|c| c.in_month).count(), 28);
        assert_eq!(cells[41].date, date(2026, 3, 14));
    }

    #[test]
    fn test_month_starting_saturday() {
        // June 2024 starts on a Saturday and needs all six rows.
        let cells = build_month_matrix(date(2024, 6, 30));
        assert_eq!(cells.len(), GRID_CELLS);
        assert_eq!(cells[6].date, date(2024, 6, 1));
        assert_eq!(cells[35].date, date(2024, 6, 30));
        assert_eq!(cells[41].date, date(2024, 7, 6));
    }

    #[test]
    fn test_grid_is_always_six_sunday_first_weeks() {
        let mut month = date(2023, 1, 1);
        for _ in 0..48 {
            let cells = build_month_matrix(month);
            assert_eq!(cells.len(), GRID_CELLS, "month {}", month);
            assert_eq!(weeks(&cells).count(), 6);
            for week in weeks(&cells) {
                assert_eq!(week.len(), DAYS_PER_WEEK);
                assert_eq!(week[0].weekday_index(), 0);
                assert_eq!(week[6].weekday_index(), 6);
            }
            month = add_months(month, 1);
        }
    }

    #[test]
    fn test_grid_cells_are_consecutive() {
        let mut month = date(2024, 1, 1);
        for _ in 0..24 {
            let cells = build_month_matrix(month);
            for pair in cells.windows(2) {
                assert_eq!(pair[0].date.succ(), Some(pair[1].date), "month {}", month);
            }
            month = add_months(month, 1);
        }
    }

    #[test]
    fn test_in_month_flag_matches_reference_month() {
        let view = date(2024, 2, 10);
        for cell in build_month_matrix(view) {
            assert_eq!(cell.in_month, cell.date.month() == 2, "cell {}", cell.date);
        }
    }

    #[test]
    fn test_red_days() {
        let cells = build_month_matrix(date(2024, 5, 1));
        let childrens_day = cells.iter().find(|c| c.date == date(2024, 5, 5)).unwrap();
        assert!(childrens_day.is_red_day());
        assert_eq!(childrens_day.holiday_name(), "어린이날");

        let monday = cells.iter().find(|c| c.date == date(2024, 5, 6)).unwrap();
        assert!(!monday.is_red_day());

        // Weekends outside the reference month are dimmed, not red.
        let april_sunday = cells.iter().find(|c| c.date == date(2024, 4, 28)).unwrap();
        assert!(april_sunday.is_weekend());
        assert!(!april_sunday.is_red_day());
    }

    #[test]
    fn test_today_flag() {
        let cells = build_month_matrix(date(2024, 3, 1));
        let today = date(2024, 3, 20);
        let flagged: Vec<_> = cells.iter().filter(|c| c.is_today(today)).collect();
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].date, today);
    }
}
