//! Error handling for Trailmeet
//!
//! This module defines the main error type used throughout the application
//! and its mapping onto HTTP responses. Expected conditions (missing entity,
//! authorization failure, validation failure) keep their own variants and
//! status codes; unexpected dependency failures are logged and surfaced to
//! clients as a generic internal error.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Main error type for the Trailmeet application
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Event not found: {event_id}")]
    EventNotFound { event_id: Uuid },

    #[error("User not found: {user_id}")]
    UserNotFound { user_id: Uuid },

    #[error("Registration not found for event {event_id}")]
    RegistrationNotFound { event_id: Uuid },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Event is full: {event_id}")]
    CapacityExceeded { event_id: Uuid },

    #[error("Email delivery error: {0}")]
    Email(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for Trailmeet operations
pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::EventNotFound { .. }
            | AppError::UserNotFound { .. }
            | AppError::RegistrationNotFound { .. } => StatusCode::NOT_FOUND,
            AppError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) | AppError::CapacityExceeded { .. } => StatusCode::CONFLICT,
            AppError::Database(_)
            | AppError::Migration(_)
            | AppError::Config(_)
            | AppError::Email(_)
            | AppError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code for client error handling
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::EventNotFound { .. }
            | AppError::UserNotFound { .. }
            | AppError::RegistrationNotFound { .. } => "NOT_FOUND",
            AppError::InvalidArgument(_) => "INVALID_ARGUMENT",
            AppError::Conflict(_) => "CONFLICT",
            AppError::CapacityExceeded { .. } => "CAPACITY_EXCEEDED",
            _ => "INTERNAL",
        }
    }
}

/// Error response body (JSON)
#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Internal details are logged, never returned to the caller.
        let message = if status.is_server_error() {
            tracing::error!(error = %self, "Internal error while handling request");
            "An internal error occurred".to_string()
        } else {
            self.to_string()
        };

        let body = ErrorBody {
            code: self.code(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_errors_keep_their_status() {
        let event_id = Uuid::new_v4();
        assert_eq!(
            AppError::Unauthorized("no token".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Forbidden("not the organizer".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::EventNotFound { event_id }.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::InvalidArgument("past date".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::CapacityExceeded { event_id }.status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_capacity_has_distinct_code() {
        let event_id = Uuid::new_v4();
        assert_eq!(AppError::CapacityExceeded { event_id }.code(), "CAPACITY_EXCEEDED");
        assert_eq!(AppError::Conflict("already registered".into()).code(), "CONFLICT");
    }

    #[test]
    fn test_internal_errors_are_generic() {
        let err = AppError::Email("smtp handshake failed".into());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code(), "INTERNAL");
    }
}
