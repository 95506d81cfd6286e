//! Persistence for user records.
//!
//! # Repository port
//!
//! [`UserRepository`] is the only way the service layer touches storage.
//! Two implementations ship with the server:
//!
//! - [`PgUserRepository`] - `PostgreSQL`, used in production
//! - `InMemoryUserRepository` - a map behind a lock, for tests
//!   (`test-utils` feature)
//!
//! # Database
//!
//! A single `users` table; see `crates/server/schema.sql`. The schema is
//! applied by the operator, the server never migrates on startup.

#[cfg(any(test, feature = "test-utils"))]
pub mod memory;
pub mod users;

use std::future::Future;
use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use users_core::{CreateUserParams, UpdateUserParams, User, UserId};

#[cfg(any(test, feature = "test-utils"))]
pub use memory::InMemoryUserRepository;
pub use users::PgUserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested user does not exist.
    #[error("not found")]
    NotFound,
}

/// Durable storage for user records.
///
/// `create` and `update` return the full stored record. `get` and `update`
/// report a missing id as [`RepositoryError::NotFound`]; `delete` never does.
/// Implementations must be safe to share between concurrent requests.
pub trait UserRepository: Send + Sync + 'static {
    /// Insert a new, active user and return it with its assigned id.
    fn create(
        &self,
        params: &CreateUserParams,
    ) -> impl Future<Output = Result<User, RepositoryError>> + Send;

    /// Fetch a user by id, tombstones included.
    fn get(&self, id: UserId) -> impl Future<Output = Result<User, RepositoryError>> + Send;

    /// Overwrite the present fields of `params` and return the merged record.
    ///
    /// An empty `params` returns the current record unchanged.
    fn update(
        &self,
        id: UserId,
        params: &UpdateUserParams,
    ) -> impl Future<Output = Result<User, RepositoryError>> + Send;

    /// Flag a user as deleted.
    ///
    /// Unconditional: an unknown or already-deleted id is not an error.
    fn delete(&self, id: UserId) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Check that the store is reachable.
    fn ping(&self) -> impl Future<Output = Result<(), RepositoryError>> + Send {
        async { Ok(()) }
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
