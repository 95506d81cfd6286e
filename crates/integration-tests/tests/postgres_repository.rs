//! `PgUserRepository` against a live database.
//!
//! These tests require:
//! - A running `PostgreSQL` database reachable via `USERS_TEST_DATABASE_URL`
//! - The schema from `crates/server/schema.sql` applied to it
//!
//! Run with: cargo test -p users-integration-tests -- --ignored

#![allow(clippy::unwrap_used)]

use secrecy::SecretString;

use users_core::{CreateUserParams, RequiredText, UpdateUserParams, UserId};
use users_server::db::{PgUserRepository, RepositoryError, UserRepository, create_pool};

async fn repository() -> PgUserRepository {
    let url = std::env::var("USERS_TEST_DATABASE_URL")
        .expect("USERS_TEST_DATABASE_URL must be set for database tests");
    let pool = create_pool(&SecretString::from(url))
        .await
        .expect("Failed to connect to test database");
    PgUserRepository::new(pool)
}

fn text(s: &str) -> RequiredText {
    RequiredText::parse(s).unwrap()
}

fn jane() -> CreateUserParams {
    CreateUserParams {
        first_name: text("Jane"),
        last_name: text("Doe"),
        phone_number: text("+15550001"),
        address: text("1 Main St"),
    }
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_create_and_get() {
    let repo = repository().await;

    let created = repo.create(&jane()).await.unwrap();
    let fetched = repo.get(created.id).await.unwrap();

    assert!(created.id.as_i64() > 0);
    assert!(!created.deleted);
    assert!(created.deleted_at.is_none());
    assert_eq!(fetched, created);
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_get_missing_is_not_found() {
    let repo = repository().await;

    assert!(matches!(
        repo.get(UserId::new(i64::MAX)).await,
        Err(RepositoryError::NotFound)
    ));
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_partial_update() {
    let repo = repository().await;
    let created = repo.create(&jane()).await.unwrap();

    let updated = repo
        .update(
            created.id,
            &UpdateUserParams {
                address: Some("2 Oak St".to_string()),
                ..UpdateUserParams::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.first_name.as_str(), "Jane");
    assert_eq!(updated.address.as_str(), "2 Oak St");
    assert_eq!(updated.created_at, created.created_at);
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_empty_update_returns_current() {
    let repo = repository().await;
    let created = repo.create(&jane()).await.unwrap();

    let unchanged = repo
        .update(created.id, &UpdateUserParams::default())
        .await
        .unwrap();

    assert_eq!(unchanged, created);
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_update_missing_is_not_found() {
    let repo = repository().await;

    assert!(matches!(
        repo.update(
            UserId::new(i64::MAX),
            &UpdateUserParams {
                first_name: Some("Nobody".to_string()),
                ..UpdateUserParams::default()
            },
        )
        .await,
        Err(RepositoryError::NotFound)
    ));
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_delete_sets_tombstone_once() {
    let repo = repository().await;
    let created = repo.create(&jane()).await.unwrap();

    repo.delete(created.id).await.unwrap();
    let first = repo.get(created.id).await.unwrap();
    repo.delete(created.id).await.unwrap();
    let second = repo.get(created.id).await.unwrap();

    assert!(first.deleted);
    assert!(first.deleted_at.is_some());
    assert_eq!(first.deleted_at, second.deleted_at);
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_delete_missing_is_ok() {
    let repo = repository().await;

    assert!(repo.delete(UserId::new(i64::MAX)).await.is_ok());
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL"]
async fn test_ping() {
    let repo = repository().await;

    assert!(repo.ping().await.is_ok());
}
