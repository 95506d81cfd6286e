//! Application state shared across handlers.

use std::sync::Arc;

use crate::db::UserRepository;
use crate::services::auth::TokenVerifier;
use crate::services::users::UserService;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. It is generic over the
/// repository so tests can run the real router against an in-memory store.
pub struct AppState<R> {
    inner: Arc<AppStateInner<R>>,
}

struct AppStateInner<R> {
    users: UserService<R>,
    verifier: Arc<dyn TokenVerifier>,
}

impl<R> Clone for AppState<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: UserRepository> AppState<R> {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `repo` - Storage for user records
    /// * `verifier` - Turns bearer tokens into principals
    pub fn new(repo: R, verifier: Arc<dyn TokenVerifier>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                users: UserService::new(repo),
                verifier,
            }),
        }
    }

    /// Get a reference to the user service.
    #[must_use]
    pub fn users(&self) -> &UserService<R> {
        &self.inner.users
    }

    /// Get a reference to the token verifier.
    #[must_use]
    pub fn verifier(&self) -> &dyn TokenVerifier {
        self.inner.verifier.as_ref()
    }
}
