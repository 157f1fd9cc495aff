use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

use dalryeok_core::{events_on, key_from_iso, NewEvent, FIXED_HOLIDAYS};

use crate::auth::Admin;
use crate::error::ApiError;
use crate::models::{
    local_today, CreateEventRequest, DayQuery, EventResponse, HolidayResponse, MonthQuery,
    MonthResponse, WatchQuery, WatchResponse,
};
use crate::state::AppState;

/// GET /api/month?month=YYYY-MM&selected=YYYY-MM-DD - Grid, month listing and selected day.
pub async fn get_month(
    State(state): State<AppState>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<MonthResponse>, ApiError> {
    let today = local_today();
    let view = query.view(today);
    let subscription = state.store.subscribe(&state.org_id).await?;
    let snapshot = subscription.borrow().clone();
    Ok(Json(MonthResponse::new(view, today, &snapshot)))
}

/// GET /api/events?date=YYYY-MM-DD - Events of one day in creation order.
pub async fn get_day_events(
    State(state): State<AppState>,
    Query(query): Query<DayQuery>,
) -> Result<Json<Vec<EventResponse>>, ApiError> {
    let key = key_from_iso(&query.date)?;
    let subscription = state.store.subscribe(&state.org_id).await?;
    let events = subscription.borrow().by_key();
    let day = events_on(&events, key.date())
        .iter()
        .map(EventResponse::from)
        .collect();
    Ok(Json(day))
}

/// POST /api/events - Create an event (admin only).
pub async fn create_event(
    State(state): State<AppState>,
    Admin(identity): Admin,
    Json(req): Json<CreateEventRequest>,
) -> Result<Response, ApiError> {
    let draft = NewEvent::new(state.org_id.as_ref(), req.date_key, req.title, req.body);
    let event = state.store.insert(draft).await?;

    tracing::info!(
        "Event {} added on {} by {}",
        event.id,
        event.date_key,
        identity.email.as_deref().unwrap_or("")
    );
    Ok((StatusCode::CREATED, Json(EventResponse::from(&event))).into_response())
}

/// DELETE /api/events/{id} - Delete an event (admin only).
pub async fn delete_event(
    State(state): State<AppState>,
    Admin(identity): Admin,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = Uuid::parse_str(&id).map_err(|_| ApiError::InvalidId(id))?;

    if !state.store.delete(id).await? {
        return Err(ApiError::NotFound);
    }

    tracing::info!(
        "Event {} deleted by {}",
        id,
        identity.email.as_deref().unwrap_or("")
    );
    Ok(Json(serde_json::json!({ "id": id.to_string(), "deleted": true })))
}

/// GET /api/holidays - The fixed holiday table.
pub async fn get_holidays() -> Json<Vec<HolidayResponse>> {
    Json(FIXED_HOLIDAYS.iter().map(HolidayResponse::from).collect())
}

/// GET /api/watch?version=N - Long-poll for a snapshot newer than `version`.
///
/// Answers immediately when the client is behind (or ahead, after a server
/// restart), otherwise waits for the next change up to the watch timeout and
/// answers with whatever is current.
pub async fn watch(
    State(state): State<AppState>,
    Query(query): Query<WatchQuery>,
) -> Result<Json<WatchResponse>, ApiError> {
    let mut subscription = state.store.subscribe(&state.org_id).await?;

    if subscription.borrow_and_update().version == query.version {
        // Timing out or a closed channel both mean nothing new to report.
        let _ = tokio::time::timeout(state.watch_timeout, subscription.changed()).await;
    }

    let snapshot = subscription.borrow();
    Ok(Json(WatchResponse::from(&*snapshot)))
}
