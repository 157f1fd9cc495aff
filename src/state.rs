use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderName;

use dalryeok_core::{AccessPolicy, EventStore};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EventStore>,
    pub policy: Arc<dyn AccessPolicy>,
    pub org_id: Arc<str>,
    pub identity_header: HeaderName,
    pub watch_timeout: Duration,
}

impl AppState {
    pub fn new(
        store: Arc<dyn EventStore>,
        policy: Arc<dyn AccessPolicy>,
        org_id: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            store,
            policy,
            org_id: org_id.into(),
            identity_header: HeaderName::from_static("x-forwarded-email"),
            watch_timeout: Duration::from_secs(25),
        }
    }

    pub fn with_identity_header(mut self, header: HeaderName) -> Self {
        self.identity_header = header;
        self
    }

    pub fn with_watch_timeout(mut self, timeout: Duration) -> Self {
        self.watch_timeout = timeout;
        self
    }
}
