use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::date::{end_of_month, start_of_month, CalendarDate};
use crate::key::{to_key, DateKey};

/// A calendar entry as held by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub org_id: String,
    pub date_key: DateKey,
    pub title: String,
    pub body: String,
    /// Server-assigned creation time, epoch milliseconds.
    pub created_at: i64,
}

/// A draft submitted for insertion. The store assigns id and creation time.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewEvent {
    pub org_id: String,
    pub date_key: String,
    pub title: String,
    #[serde(default)]
    pub body: String,
}

impl NewEvent {
    pub fn new(
        org_id: impl Into<String>,
        date_key: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            org_id: org_id.into(),
            date_key: date_key.into(),
            title: title.into(),
            body: body.into(),
        }
    }

    /// Finish the draft into a stored record.
    pub fn into_event(self, date_key: DateKey, id: Uuid, created_at: i64) -> Event {
        Event {
            id,
            org_id: self.org_id,
            date_key,
            title: self.title.trim().to_string(),
            body: self.body.trim().to_string(),
            created_at,
        }
    }
}

/// Events bucketed by day, each bucket in creation order.
pub type EventsByKey = BTreeMap<DateKey, Vec<Event>>;

/// Group events by key and sort each bucket by `created_at`.
///
/// The sort is stable, so events created in the same millisecond keep their
/// input order.
pub fn group_by_key(events: impl IntoIterator<Item = Event>) -> EventsByKey {
    let mut map = EventsByKey::new();
    for event in events {
        map.entry(event.date_key.clone()).or_default().push(event);
    }
    for bucket in map.values_mut() {
        bucket.sort_by_key(|e| e.created_at);
    }
    map
}

/// Events of a single day.
pub fn events_on(map: &EventsByKey, date: CalendarDate) -> &[Event] {
    map.get(&to_key(date)).map(Vec::as_slice).unwrap_or(&[])
}

/// An entry of the month listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthEvent<'a> {
    pub date: CalendarDate,
    pub event: &'a Event,
}

/// All events of the month containing `view_date`, by day then creation time.
pub fn month_events(map: &EventsByKey, view_date: CalendarDate) -> Vec<MonthEvent<'_>> {
    let start = to_key(start_of_month(view_date));
    let end = to_key(end_of_month(view_date));

    let mut items: Vec<MonthEvent<'_>> = map
        .range(start..=end)
        .flat_map(|(key, bucket)| {
            let date = key.date();
            bucket.iter().map(move |event| MonthEvent { date, event })
        })
        .collect();
    items.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then(a.event.created_at.cmp(&b.event.created_at))
    });
    items
}

/// Leading titles of a day plus how many were left out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preview<'a> {
    pub titles: Vec<&'a str>,
    pub remaining: usize,
}

pub fn preview(events: &[Event], limit: usize) -> Preview<'_> {
    Preview {
        titles: events.iter().take(limit).map(|e| e.title.as_str()).collect(),
        remaining: events.len().saturating_sub(limit),
    }
}
