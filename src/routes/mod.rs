pub mod api;
pub mod events;
pub mod pages;

use axum::{
    http::Method,
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    // Reads are public; writes carry the identity header and stay same-origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET]);

    let api = Router::new()
        .route("/api/month", get(api::get_month))
        .route("/api/events", get(api::get_day_events).post(api::create_event))
        .route("/api/events/{id}", delete(api::delete_event))
        .route("/api/holidays", get(api::get_holidays))
        .route("/api/watch", get(api::watch))
        .layer(cors);

    Router::new()
        // Month page
        .route("/", get(pages::index))
        // Form handlers
        .route("/events", post(events::create_event))
        .route("/events/{id}/delete", post(events::delete_event))
        .merge(api)
        // Health check
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}
