//! HTTP route handlers for the users API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                - Liveness
//! GET    /health/ready          - Readiness (pings the repository)
//! GET    /docs/*                - Static API documentation
//!
//! # Users (bearer token required)
//! POST   /api/v1/users          - Create user
//! GET    /api/v1/users/{id}     - Get user
//! PATCH  /api/v1/users/{id}     - Partially update user
//! DELETE /api/v1/users/{id}     - Soft-delete user
//! ```

pub mod health;
pub mod users;

use std::any::Any;
use std::path::Path;
use std::time::Duration;

use axum::{
    Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::db::UserRepository;
use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Create the user routes router.
pub fn user_routes<R: UserRepository>() -> Router<AppState<R>> {
    Router::new().route("/", post(users::create::<R>)).route(
        "/{id}",
        get(users::show::<R>)
            .patch(users::update::<R>)
            .delete(users::delete::<R>),
    )
}

/// Create all routes for the users API.
pub fn routes<R: UserRepository>() -> Router<AppState<R>> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness::<R>))
        .nest("/api/v1/users", user_routes())
}

/// Answer a panicking handler with the same opaque 500 as any other
/// server-side failure.
fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = detail, "Handler panicked");

    (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
}

/// Build the complete application: routes, static docs and the middleware
/// stack.
pub fn app<R: UserRepository>(
    state: AppState<R>,
    docs_dir: &Path,
    request_timeout: Duration,
) -> Router {
    routes()
        .nest_service("/docs", ServeDir::new(docs_dir))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        user_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}
