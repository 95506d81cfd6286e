//! User lifecycle service.
//!
//! Sits between the HTTP handlers and the [`UserRepository`]. The repository
//! stores tombstones like any other record; this layer is where a deleted
//! user stops being visible.

use std::sync::Arc;

use thiserror::Error;
use tracing::instrument;

use users_core::{CreateUserParams, UpdateUserParams, User, UserId};

use crate::db::{RepositoryError, UserRepository};

/// Errors returned by [`UserService`].
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The user does not exist or has been deleted.
    #[error("user not found")]
    NotFound,

    /// The repository failed.
    #[error("{context}: {source}")]
    Repository {
        context: &'static str,
        #[source]
        source: RepositoryError,
    },
}

impl ServiceError {
    fn repository(context: &'static str) -> impl FnOnce(RepositoryError) -> Self {
        move |source| match source {
            RepositoryError::NotFound => Self::NotFound,
            source => Self::Repository { context, source },
        }
    }
}

/// User operations with soft-delete visibility applied.
pub struct UserService<R> {
    repo: Arc<R>,
}

impl<R> Clone for UserService<R> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
        }
    }
}

impl<R> std::fmt::Debug for UserService<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserService").finish_non_exhaustive()
    }
}

impl<R: UserRepository> UserService<R> {
    /// Create a service backed by `repo`.
    #[must_use]
    pub fn new(repo: R) -> Self {
        Self {
            repo: Arc::new(repo),
        }
    }

    /// The underlying repository.
    #[must_use]
    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Create a new active user.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Repository`] if the insert fails.
    #[instrument(skip_all)]
    pub async fn create_user(&self, params: CreateUserParams) -> Result<User, ServiceError> {
        let user = self
            .repo
            .create(&params)
            .await
            .map_err(ServiceError::repository("create user"))?;

        tracing::debug!(user_id = %user.id, "Created user");
        Ok(user)
    }

    /// Fetch an active user.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] for unknown and deleted users.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn get_user(&self, id: UserId) -> Result<User, ServiceError> {
        let user = self
            .repo
            .get(id)
            .await
            .map_err(ServiceError::repository("get user"))?;

        if user.is_deleted() {
            tracing::debug!("User is deleted");
            return Err(ServiceError::NotFound);
        }

        Ok(user)
    }

    /// Apply a partial update to an active user and return the result.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotFound`] for unknown and deleted users; the
    /// record is left untouched in that case.
    #[instrument(skip(self, params), fields(user_id = %id))]
    pub async fn update_user(
        &self,
        id: UserId,
        params: UpdateUserParams,
    ) -> Result<User, ServiceError> {
        self.get_user(id).await?;

        let user = self
            .repo
            .update(id, &params)
            .await
            .map_err(ServiceError::repository("update user"))?;

        tracing::debug!("Updated user");
        Ok(user)
    }

    /// Mark a user as deleted. Succeeds for unknown and already-deleted ids.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Repository`] if the store fails.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn delete_user(&self, id: UserId) -> Result<(), ServiceError> {
        self.repo
            .delete(id)
            .await
            .map_err(ServiceError::repository("delete user"))?;

        tracing::debug!("Deleted user");
        Ok(())
    }

    /// Check that the repository is reachable.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Repository`] if it is not.
    pub async fn ping(&self) -> Result<(), ServiceError> {
        self.repo
            .ping()
            .await
            .map_err(ServiceError::repository("ping"))
    }
}
