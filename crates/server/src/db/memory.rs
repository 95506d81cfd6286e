//! In-memory user repository for tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::RwLock;

use users_core::{CreateUserParams, UpdateUserParams, User, UserId};

use super::{RepositoryError, UserRepository};

/// A [`UserRepository`] that keeps users in a map behind a lock.
///
/// Ids start at 1 and are never reused. [`Self::fail_next`] makes the next
/// call return a database error and [`Self::delay_next`] stalls it, to
/// exercise failure and timeout paths.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    state: RwLock<State>,
    fail_next: AtomicBool,
    delay_next_ms: AtomicU64,
}

#[derive(Debug, Default)]
struct State {
    last_id: i64,
    users: BTreeMap<UserId, User>,
}

impl InMemoryUserRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next repository call fail with [`RepositoryError::Database`].
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    /// Make the next repository call wait for `delay` before touching any
    /// state. A call dropped while waiting leaves the store unchanged.
    pub fn delay_next(&self, delay: Duration) {
        let millis = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self.delay_next_ms.store(millis, Ordering::SeqCst);
    }

    /// Number of stored records, tombstones included.
    pub async fn len(&self) -> usize {
        self.state.read().await.users.len()
    }

    /// Returns `true` if nothing has been created yet.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn check_failure(&self) -> Result<(), RepositoryError> {
        let delay = self.delay_next_ms.swap(0, Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

impl UserRepository for InMemoryUserRepository {
    async fn create(&self, params: &CreateUserParams) -> Result<User, RepositoryError> {
        self.check_failure().await?;

        let mut state = self.state.write().await;
        state.last_id += 1;
        let user = User {
            id: UserId::new(state.last_id),
            first_name: params.first_name.to_string(),
            last_name: params.last_name.to_string(),
            phone_number: params.phone_number.to_string(),
            address: params.address.to_string(),
            deleted: false,
            created_at: Utc::now(),
            deleted_at: None,
        };
        state.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn get(&self, id: UserId) -> Result<User, RepositoryError> {
        self.check_failure().await?;

        self.state
            .read()
            .await
            .users
            .get(&id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn update(&self, id: UserId, params: &UpdateUserParams) -> Result<User, RepositoryError> {
        self.check_failure().await?;

        let mut state = self.state.write().await;
        let user = state.users.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        params.apply_to(user);

        Ok(user.clone())
    }

    async fn delete(&self, id: UserId) -> Result<(), RepositoryError> {
        self.check_failure().await?;

        let mut state = self.state.write().await;
        if let Some(user) = state.users.get_mut(&id)
            && !user.deleted
        {
            user.deleted = true;
            user.deleted_at = Some(Utc::now());
        }

        Ok(())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        self.check_failure().await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use users_core::RequiredText;

    use super::*;

    fn params(first_name: &str) -> CreateUserParams {
        CreateUserParams {
            first_name: RequiredText::parse(first_name).unwrap(),
            last_name: RequiredText::parse("Doe").unwrap(),
            phone_number: RequiredText::parse("+15550001").unwrap(),
            address: RequiredText::parse("1 Main St").unwrap(),
        }
    }

    #[tokio::test]
    async fn test_ids_are_sequential_and_positive() {
        let repo = InMemoryUserRepository::new();
        let first = repo.create(&params("Jane")).await.unwrap();
        let second = repo.create(&params("John")).await.unwrap();

        assert_eq!(first.id, UserId::new(1));
        assert_eq!(second.id, UserId::new(2));
        assert_eq!(repo.len().await, 2);
    }

    #[tokio::test]
    async fn test_delete_keeps_first_timestamp() {
        let repo = InMemoryUserRepository::new();
        let user = repo.create(&params("Jane")).await.unwrap();

        repo.delete(user.id).await.unwrap();
        let first = repo.get(user.id).await.unwrap();
        repo.delete(user.id).await.unwrap();
        let second = repo.get(user.id).await.unwrap();

        assert!(first.deleted);
        assert!(first.deleted_at.is_some());
        assert_eq!(first.deleted_at, second.deleted_at);
    }

    #[tokio::test]
    async fn test_unknown_id() {
        let repo = InMemoryUserRepository::new();

        assert!(matches!(
            repo.get(UserId::new(5)).await,
            Err(RepositoryError::NotFound)
        ));
        assert!(matches!(
            repo.update(UserId::new(5), &UpdateUserParams::default()).await,
            Err(RepositoryError::NotFound)
        ));
        assert!(repo.delete(UserId::new(5)).await.is_ok());
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_fail_next_fails_once() {
        let repo = InMemoryUserRepository::new();
        repo.fail_next();

        assert!(matches!(
            repo.create(&params("Jane")).await,
            Err(RepositoryError::Database(_))
        ));
        assert!(repo.create(&params("Jane")).await.is_ok());
    }

    #[tokio::test]
    async fn test_dropped_delayed_call_writes_nothing() {
        let repo = InMemoryUserRepository::new();
        repo.delay_next(Duration::from_secs(5));

        let result =
            tokio::time::timeout(Duration::from_millis(20), repo.create(&params("Jane"))).await;

        assert!(result.is_err());
        assert!(repo.is_empty().await);
        assert!(repo.create(&params("Jane")).await.is_ok());
    }
}
