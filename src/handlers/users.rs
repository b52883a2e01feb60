//! User directory handlers

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::handlers::AppState;
use crate::middleware::AuthClaims;
use crate::models::user::{UpdateProfileRequest, UserProfile};
use crate::utils::errors::Result;

#[derive(Debug, Deserialize)]
pub struct CreateProfileBody {
    pub display_name: String,
    pub avatar_key: Option<String>,
}

/// POST /users
pub async fn create_profile(
    State(state): State<AppState>,
    AuthClaims(auth): AuthClaims,
    Json(body): Json<CreateProfileBody>,
) -> Result<(StatusCode, Json<UserProfile>)> {
    let profile = state
        .services
        .user_service
        .create_profile(&auth, body.display_name, body.avatar_key)
        .await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

/// GET /users/:user_id
pub async fn get_profile(
    State(state): State<AppState>,
    AuthClaims(auth): AuthClaims,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserProfile>> {
    let profile = state
        .services
        .user_service
        .get_profile(&auth, user_id)
        .await?;
    Ok(Json(profile))
}

/// PUT /users/:user_id
pub async fn update_profile(
    State(state): State<AppState>,
    AuthClaims(auth): AuthClaims,
    Path(user_id): Path<Uuid>,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<UserProfile>> {
    let profile = state
        .services
        .user_service
        .update_profile(&auth, user_id, request)
        .await?;
    Ok(Json(profile))
}
