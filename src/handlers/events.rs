//! Event lifecycle handlers

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::handlers::AppState;
use crate::middleware::AuthClaims;
use crate::models::event::{Event, EventDraft, EventFilter, EventPage};
use crate::utils::errors::Result;

#[derive(Debug, Deserialize)]
pub struct ListEventsQuery {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub search_term: Option<String>,
    pub cursor: Option<String>,
}

/// POST /events
pub async fn create_event(
    State(state): State<AppState>,
    AuthClaims(auth): AuthClaims,
    Json(draft): Json<EventDraft>,
) -> Result<(StatusCode, Json<Event>)> {
    let event = state.services.event_service.create(&auth, draft).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// GET /events
///
/// Browsing is public; only mutations require identity.
pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<ListEventsQuery>,
) -> Result<Json<EventPage>> {
    let filter = EventFilter {
        start_date: query.start_date,
        end_date: query.end_date,
        search_term: query.search_term,
    };
    let page = state.services.event_service.list(filter, query.cursor).await?;
    Ok(Json(page))
}

/// GET /events/:event_id
pub async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<Event>> {
    let event = state.services.event_service.get(event_id).await?;
    Ok(Json(event))
}

/// PUT /events/:event_id
pub async fn update_event(
    State(state): State<AppState>,
    AuthClaims(auth): AuthClaims,
    Path(event_id): Path<Uuid>,
    Json(draft): Json<EventDraft>,
) -> Result<Json<Event>> {
    let event = state
        .services
        .event_service
        .update(&auth, event_id, draft)
        .await?;
    Ok(Json(event))
}

/// DELETE /events/:event_id
pub async fn cancel_event(
    State(state): State<AppState>,
    AuthClaims(auth): AuthClaims,
    Path(event_id): Path<Uuid>,
) -> Result<Json<Event>> {
    let event = state.services.event_service.cancel(&auth, event_id).await?;
    Ok(Json(event))
}
