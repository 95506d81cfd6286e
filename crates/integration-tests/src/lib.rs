//! Integration tests for the users service.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process HTTP tests (no external services)
//! cargo test -p users-integration-tests
//!
//! # Including the PostgreSQL repository tests
//! psql "$USERS_TEST_DATABASE_URL" -f crates/server/schema.sql
//! cargo test -p users-integration-tests -- --include-ignored
//! ```
//!
//! # Test Categories
//!
//! - `users_api` - the full router over the in-memory repository
//! - `postgres_repository` - `PgUserRepository` against a live database
//! - `live_server` - a running `users-server` over real HTTP
//! - `api_docs` - the published OpenAPI document

#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use jsonwebtoken::{EncodingKey, Header, encode};
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::ServiceExt;

use users_core::Capabilities;
use users_server::config::JwtConfig;
use users_server::db::InMemoryUserRepository;
use users_server::routes;
use users_server::services::auth::{JwtVerifier, TokenVerifier};
use users_server::state::AppState;

/// HMAC key shared between the test issuer and the app under test.
pub const TEST_SECRET: &str = "kQ9#vR2!pL7@xT4$mW8^zB1&nC6*hF3%";

/// Issuer the app under test expects.
pub const TEST_ISSUER: &str = "auth.test";

/// Sign arbitrary claims with the test key.
pub fn mint(claims: &Value) -> String {
    mint_with_key(claims, TEST_SECRET)
}

/// Sign arbitrary claims with `key`.
pub fn mint_with_key(claims: &Value, key: &str) -> String {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(key.as_bytes()),
    )
    .unwrap()
}

/// A valid token for `user_id` with the given capabilities.
pub fn token_for(user_id: i64, capabilities: Capabilities) -> String {
    mint(&json!({
        "user_id": user_id,
        "can_create_users": capabilities.create,
        "can_delete_users": capabilities.delete,
        "can_update_users": capabilities.update_others,
        "can_view_users": capabilities.view_others,
        "iss": TEST_ISSUER,
    }))
}

/// Directory holding the server's static API documentation.
#[must_use]
pub fn docs_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../server/docs")
}

/// A response reduced to what the tests look at.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub request_id: Option<String>,
    pub body: String,
}

impl TestResponse {
    /// Parse the body as JSON.
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

/// The real router over an in-memory repository.
pub struct TestApp {
    router: Router,
    state: AppState<InMemoryUserRepository>,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    /// Build an app that expects tokens signed with [`TEST_SECRET`] and
    /// issued by [`TEST_ISSUER`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(5))
    }

    /// Same as [`Self::new`] with a custom request timeout.
    #[must_use]
    pub fn with_timeout(request_timeout: Duration) -> Self {
        let verifier = JwtVerifier::new(&JwtConfig {
            secret: SecretString::from(TEST_SECRET),
            issuer: TEST_ISSUER.to_string(),
        });
        Self::build(Arc::new(verifier), request_timeout)
    }

    /// Build an app that authenticates with `verifier` instead of JWTs.
    #[must_use]
    pub fn with_verifier(verifier: Arc<dyn TokenVerifier>) -> Self {
        Self::build(verifier, Duration::from_secs(5))
    }

    fn build(verifier: Arc<dyn TokenVerifier>, request_timeout: Duration) -> Self {
        let state = AppState::new(InMemoryUserRepository::new(), verifier);
        let router = routes::app(state.clone(), &docs_dir(), request_timeout);

        Self { router, state }
    }

    /// The repository behind the app.
    #[must_use]
    pub fn repository(&self) -> &InMemoryUserRepository {
        self.state.users().repository()
    }

    /// Send a request with an optional bearer token and raw body.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        if body.is_some() {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
        }
        let request = builder
            .body(body.map_or_else(Body::empty, |b| Body::from(b.to_owned())))
            .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let request_id = response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();

        TestResponse {
            status,
            request_id,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }

    /// Send a request with a JSON body.
    pub async fn send_json(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: &Value,
    ) -> TestResponse {
        self.send(method, uri, token, Some(&body.to_string())).await
    }

    /// Create a user through the API as an all-powerful caller, returning
    /// its id.
    pub async fn create_user(&self, first_name: &str) -> i64 {
        let admin = token_for(1_000, Capabilities::ALL);
        let response = self
            .send_json(
                Method::POST,
                "/api/v1/users",
                Some(&admin),
                &json!({
                    "first_name": first_name,
                    "last_name": "Doe",
                    "phone_number": "+15550001",
                    "address": "1 Main St",
                }),
            )
            .await;

        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.json()["id"].as_i64().unwrap()
    }
}
