use serde::Serialize;

use crate::date::{add_months, CalendarDate};
use crate::event::{events_on, month_events, Event, EventsByKey, MonthEvent};
use crate::grid::{build_month_matrix, GridCell};
use crate::key::{to_key, DateKey};

/// What the month page is looking at: the displayed month and the day whose
/// events are listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CalendarView {
    pub reference_month: CalendarDate,
    pub selected_date: CalendarDate,
}

impl CalendarView {
    pub fn new(today: CalendarDate) -> Self {
        Self {
            reference_month: today,
            selected_date: today,
        }
    }

    pub fn with_selection(reference_month: CalendarDate, selected_date: CalendarDate) -> Self {
        Self {
            reference_month,
            selected_date,
        }
    }

    pub fn prev_month(self) -> Self {
        Self {
            reference_month: add_months(self.reference_month, -1),
            ..self
        }
    }

    pub fn next_month(self) -> Self {
        Self {
            reference_month: add_months(self.reference_month, 1),
            ..self
        }
    }

    /// Jump the grid back to the current month. The selection is kept.
    pub fn go_today(self, today: CalendarDate) -> Self {
        Self {
            reference_month: today,
            ..self
        }
    }

    pub fn select(self, date: CalendarDate) -> Self {
        Self {
            selected_date: date,
            ..self
        }
    }

    pub fn selected_key(&self) -> DateKey {
        to_key(self.selected_date)
    }

    pub fn grid(&self) -> Vec<GridCell> {
        build_month_matrix(self.reference_month)
    }

    pub fn month_events<'a>(&self, events: &'a EventsByKey) -> Vec<MonthEvent<'a>> {
        month_events(events, self.reference_month)
    }

    pub fn selected_events<'a>(&self, events: &'a EventsByKey) -> &'a [Event] {
        events_on(events, self.selected_date)
    }
}
