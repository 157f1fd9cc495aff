//! Dalryeok Core - calendar grid engine, event model, and capabilities.
//!
//! The date functions here are pure and total: the grid, key codec and
//! holiday table never fail on well-formed input. Storage and authorization
//! are traits so the server and tests can plug in their own implementations.

pub mod date;
pub mod error;
pub mod event;
pub mod format;
pub mod grid;
pub mod holiday;
pub mod key;
pub mod policy;
pub mod storage;
pub mod validation;
pub mod view;

// Re-exports for convenience
pub use date::{
    add_months, end_of_month, is_today, is_weekend, same_day, start_of_month, strip_time,
    CalendarDate,
};
pub use error::{DateKeyError, StorageError, ValidationError};
pub use event::{
    events_on, group_by_key, month_events, preview, Event, EventsByKey, MonthEvent, NewEvent,
    Preview,
};
pub use format::{format_datetime, format_datetime_in};
pub use grid::{build_month_matrix, weeks, GridCell, GRID_CELLS};
pub use holiday::{holiday_badge, is_holiday, korean_holiday_name, Holiday, FIXED_HOLIDAYS};
pub use key::{from_key, key_from_iso, to_key, DateKey};
pub use policy::{AccessPolicy, DenyAll, EmailAllowList, Identity};
pub use storage::{current_epoch_ms, EventStore, Snapshot, SnapshotHub, Subscription};
pub use validation::Validator;
pub use view::CalendarView;

#[cfg(any(test, feature = "test-utils"))]
pub use storage::memory::InMemoryEventStore;
