//! Authentication extractor
//!
//! Pulls the bearer token out of the `Authorization` header and resolves it
//! into the caller's [`AuthContext`]. Handlers that take [`AuthClaims`] are
//! authenticated; everything else (the health check) is public.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::handlers::AppState;
use crate::services::auth::AuthContext;
use crate::utils::errors::AppError;

/// The authenticated caller of a request
#[derive(Debug, Clone)]
pub struct AuthClaims(pub AuthContext);

#[async_trait]
impl FromRequestParts<AppState> for AuthClaims {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".to_string()))?;

        let context = state.services.auth_service.authenticate(header)?;
        Ok(AuthClaims(context))
    }
}
