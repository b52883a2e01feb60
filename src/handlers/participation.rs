//! Participation handlers

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::handlers::AppState;
use crate::middleware::AuthClaims;
use crate::models::participant::EventParticipant;
use crate::utils::errors::Result;

/// POST /events/:event_id/join
pub async fn join_event(
    State(state): State<AppState>,
    AuthClaims(auth): AuthClaims,
    Path(event_id): Path<Uuid>,
) -> Result<(StatusCode, Json<EventParticipant>)> {
    let participant = state
        .services
        .participation_service
        .join(&auth, event_id)
        .await?;
    Ok((StatusCode::CREATED, Json(participant)))
}

/// POST /events/:event_id/leave
pub async fn leave_event(
    State(state): State<AppState>,
    AuthClaims(auth): AuthClaims,
    Path(event_id): Path<Uuid>,
) -> Result<Json<EventParticipant>> {
    let participant = state
        .services
        .participation_service
        .leave(&auth, event_id)
        .await?;
    Ok(Json(participant))
}

/// GET /events/:event_id/participants
pub async fn list_participants(
    State(state): State<AppState>,
    AuthClaims(auth): AuthClaims,
    Path(event_id): Path<Uuid>,
) -> Result<Json<Vec<EventParticipant>>> {
    let participants = state
        .services
        .participation_service
        .list_participants(&auth, event_id)
        .await?;
    Ok(Json(participants))
}
