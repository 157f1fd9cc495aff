use axum::{
    extract::{Path, State},
    response::Redirect,
    Form,
};
use serde::Deserialize;
use uuid::Uuid;

use dalryeok_core::{CalendarView, NewEvent};

use crate::auth::Admin;
use crate::error::ApiError;
use crate::models::{local_today, month_param, MonthQuery};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateEventForm {
    date_key: String,
    title: String,
    #[serde(default)]
    body: String,
}

#[derive(Deserialize)]
pub struct DeleteEventForm {
    month: Option<String>,
    selected: Option<String>,
}

fn page_url(view: CalendarView) -> String {
    format!(
        "/?month={}&selected={}",
        month_param(view.reference_month),
        view.selected_key()
    )
}

/// POST /events - Add an event from the page form, then show its day.
pub async fn create_event(
    State(state): State<AppState>,
    Admin(identity): Admin,
    Form(form): Form<CreateEventForm>,
) -> Result<Redirect, ApiError> {
    let draft = NewEvent::new(state.org_id.as_ref(), form.date_key, form.title, form.body);
    let event = state.store.insert(draft).await?;

    tracing::info!(
        "Event {} added on {} by {}",
        event.id,
        event.date_key,
        identity.email.as_deref().unwrap_or("")
    );

    let date = event.date_key.date();
    Ok(Redirect::to(&page_url(CalendarView::new(date))))
}

/// POST /events/{id}/delete - Delete an event from the page, then go back.
pub async fn delete_event(
    State(state): State<AppState>,
    Admin(identity): Admin,
    Path(id): Path<String>,
    Form(form): Form<DeleteEventForm>,
) -> Result<Redirect, ApiError> {
    let id = Uuid::parse_str(&id).map_err(|_| ApiError::InvalidId(id))?;

    if !state.store.delete(id).await? {
        return Err(ApiError::NotFound);
    }

    tracing::info!(
        "Event {} deleted by {}",
        id,
        identity.email.as_deref().unwrap_or("")
    );

    let view = MonthQuery {
        month: form.month,
        selected: form.selected,
    }
    .view(local_today());
    Ok(Redirect::to(&page_url(view)))
}
