//! Users service - JWT-gated CRUD over soft-deletable user records.
//!
//! This binary serves the users API on port 8080 by default.
//!
//! # Architecture
//!
//! - Axum web framework, JSON over HTTP
//! - Bearer tokens (HMAC-signed JWT) issued by an external auth service
//! - `PostgreSQL` for user records (schema in `crates/server/schema.sql`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use users_server::config::{LogFormat, ServerConfig};
use users_server::db::{self, PgUserRepository};
use users_server::routes;
use users_server::services::auth::JwtVerifier;
use users_server::state::AppState;

#[tokio::main]
async fn main() {
    let config = ServerConfig::from_env().expect("Failed to load configuration");

    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "users_server=info,tower_http=debug".into());

    let is_json = config.log_format == LogFormat::Json;
    let json_layer =
        is_json.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!is_json).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();

    tracing::debug!(?config, "Configuration loaded");

    let pool = db::create_pool(&config.database_url)
        .await
        .expect("Failed to create database pool");
    tracing::info!("Database pool created");

    // NOTE: The schema is NOT applied on startup.
    // Apply crates/server/schema.sql before the first run.

    let verifier = Arc::new(JwtVerifier::new(&config.jwt));
    if config.jwt.issuer.is_empty() {
        tracing::warn!("USERS_JWT_ISSUER is not set, token issuer will not be checked");
    }

    let state = AppState::new(PgUserRepository::new(pool), verifier);
    let app = routes::app(state, &config.docs_dir, config.request_timeout);

    let addr = config.socket_addr();
    tracing::info!("users-server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
