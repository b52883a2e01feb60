//! Handlers module
//!
//! HTTP surface of the service: route table, shared state, and the request
//! handlers grouped by resource.

pub mod events;
pub mod health;
pub mod participation;
pub mod users;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::database::connection::DatabasePool;
use crate::services::ServiceFactory;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub services: ServiceFactory,
    pub pool: DatabasePool,
}

/// Build the full route table
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/events", post(events::create_event).get(events::list_events))
        .route(
            "/events/:event_id",
            get(events::get_event)
                .put(events::update_event)
                .delete(events::cancel_event),
        )
        .route("/events/:event_id/join", post(participation::join_event))
        .route("/events/:event_id/leave", post(participation::leave_event))
        .route(
            "/events/:event_id/participants",
            get(participation::list_participants),
        )
        .route("/users", post(users::create_profile))
        .route(
            "/users/:user_id",
            get(users::get_profile).put(users::update_profile),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
