//! Authentication behavior of the HTTP surface.
//!
//! These tests use a lazily-connected pool: requests that are rejected by the
//! authentication extractor never reach the database, so no server is needed.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

use trailmeet::config::Settings;
use trailmeet::database::DatabaseService;
use trailmeet::handlers::{self, AppState};
use trailmeet::services::ServiceFactory;

fn app() -> Router {
    let mut settings = Settings::default();
    settings.auth.jwt_secret = "test-secret".to_string();

    let pool = PgPoolOptions::new()
        .connect_lazy("postgresql://localhost/trailmeet_test")
        .expect("lazy pool");
    let db = DatabaseService::new(pool.clone());
    let services = ServiceFactory::new(&db, &settings);

    handlers::router(AppState { services, pool })
}

#[tokio::test]
async fn test_missing_authorization_header_rejected() {
    let response = app()
        .oneshot(Request::post("/events").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_bearer_token_rejected() {
    let response = app()
        .oneshot(
            Request::get("/users/3fa85f64-5717-4562-b3fc-2c963f66afa6")
                .header(header::AUTHORIZATION, "Bearer not-a-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_non_bearer_scheme_rejected() {
    let response = app()
        .oneshot(
            Request::delete("/events/3fa85f64-5717-4562-b3fc-2c963f66afa6")
                .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unauthorized_body_carries_error_code() {
    let response = app()
        .oneshot(Request::post("/events").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let response = app()
        .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
