use serde::{Deserialize, Serialize};

use dalryeok_core::{
    format_datetime, from_key, holiday_badge, preview, strip_time, to_key, CalendarDate,
    CalendarView, Event, EventsByKey, GridCell, Holiday, Snapshot,
};

/// Cell previews show this many titles before collapsing the rest.
pub const PREVIEW_TITLES: usize = 2;

/// Query parameters selecting what the month page shows.
#[derive(Debug, Default, Deserialize)]
pub struct MonthQuery {
    /// Reference month, `YYYY-MM` (a full key also works).
    pub month: Option<String>,
    /// Selected day, `YYYY-MM-DD`.
    pub selected: Option<String>,
}

impl MonthQuery {
    /// Resolve the query against `today`. Missing values default to today;
    /// malformed ones degrade the way [`from_key`] does.
    pub fn view(&self, today: CalendarDate) -> CalendarView {
        let parse = |s: &Option<String>| {
            s.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(from_key)
        };
        CalendarView::with_selection(
            parse(&self.month).unwrap_or(today),
            parse(&self.selected).unwrap_or(today),
        )
    }
}

/// `YYYY-MM` form of a month, as used in page links.
pub fn month_param(date: CalendarDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// Today in the server's local zone.
pub fn local_today() -> CalendarDate {
    strip_time(chrono::Local::now())
}

/// Query parameters for the day endpoint.
#[derive(Debug, Deserialize)]
pub struct DayQuery {
    pub date: String,
}

/// Query parameters for the watch endpoint.
#[derive(Debug, Deserialize)]
pub struct WatchQuery {
    /// Last snapshot version the client has seen.
    #[serde(default)]
    pub version: u64,
}

/// Request to create an event.
#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    pub date_key: String,
    pub title: String,
    #[serde(default)]
    pub body: String,
}

/// An event as served to clients.
#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub id: String,
    pub date_key: String,
    pub title: String,
    pub body: String,
    pub created_at: i64,
    /// `YYYY.MM.DD HH:MM` in server local time.
    pub created_at_display: String,
}

impl From<&Event> for EventResponse {
    fn from(e: &Event) -> Self {
        Self {
            id: e.id.to_string(),
            date_key: e.date_key.to_string(),
            title: e.title.clone(),
            body: e.body.clone(),
            created_at: e.created_at,
            created_at_display: format_datetime(e.created_at),
        }
    }
}

/// One grid cell with everything the UI needs to draw it.
#[derive(Debug, Serialize)]
pub struct CellResponse {
    pub date_key: String,
    pub day: u32,
    pub weekday: u32,
    pub in_month: bool,
    pub is_today: bool,
    pub is_weekend: bool,
    pub is_red_day: bool,
    /// Holiday name, empty when none.
    pub holiday: &'static str,
    pub holiday_badge: &'static str,
    pub event_count: usize,
    pub preview: Vec<String>,
    pub more: usize,
}

impl CellResponse {
    pub fn new(cell: &GridCell, today: CalendarDate, events: &EventsByKey) -> Self {
        let day_events = dalryeok_core::events_on(events, cell.date);
        let p = preview(day_events, PREVIEW_TITLES);
        let holiday = cell.holiday_name();
        Self {
            date_key: to_key(cell.date).to_string(),
            day: cell.date.day(),
            weekday: cell.weekday_index(),
            in_month: cell.in_month,
            is_today: cell.is_today(today),
            is_weekend: cell.is_weekend(),
            is_red_day: cell.is_red_day(),
            holiday,
            holiday_badge: holiday_badge(holiday),
            event_count: day_events.len(),
            preview: p.titles.into_iter().map(String::from).collect(),
            more: p.remaining,
        }
    }
}

/// Response for the month endpoint.
#[derive(Debug, Serialize)]
pub struct MonthResponse {
    pub year: i32,
    pub month: u32,
    pub today: String,
    pub selected: String,
    pub prev_month: String,
    pub next_month: String,
    pub version: u64,
    pub cells: Vec<CellResponse>,
    pub month_events: Vec<EventResponse>,
    pub selected_events: Vec<EventResponse>,
}

impl MonthResponse {
    pub fn new(view: CalendarView, today: CalendarDate, snapshot: &Snapshot) -> Self {
        let events = snapshot.by_key();
        let cells = view
            .grid()
            .iter()
            .map(|cell| CellResponse::new(cell, today, &events))
            .collect();
        Self {
            year: view.reference_month.year(),
            month: view.reference_month.month(),
            today: to_key(today).to_string(),
            selected: view.selected_key().to_string(),
            prev_month: month_param(view.prev_month().reference_month),
            next_month: month_param(view.next_month().reference_month),
            version: snapshot.version,
            cells,
            month_events: view
                .month_events(&events)
                .iter()
                .map(|item| EventResponse::from(item.event))
                .collect(),
            selected_events: view
                .selected_events(&events)
                .iter()
                .map(EventResponse::from)
                .collect(),
        }
    }
}

/// A fixed holiday as served to clients.
#[derive(Debug, Serialize)]
pub struct HolidayResponse {
    pub key: String,
    pub month: u32,
    pub day: u32,
    pub name: &'static str,
}

impl From<&Holiday> for HolidayResponse {
    fn from(h: &Holiday) -> Self {
        Self {
            key: h.key(),
            month: h.month,
            day: h.day,
            name: h.name,
        }
    }
}

/// Response for the watch endpoint.
#[derive(Debug, Serialize)]
pub struct WatchResponse {
    pub version: u64,
    pub events: Vec<EventResponse>,
}

impl From<&Snapshot> for WatchResponse {
    fn from(snapshot: &Snapshot) -> Self {
        Self {
            version: snapshot.version,
            events: snapshot.events.iter().map(EventResponse::from).collect(),
        }
    }
}
