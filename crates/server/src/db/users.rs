//! `PostgreSQL` user repository.
//!
//! Queries are checked at runtime (`query_as` + `FromRow`) so the crate
//! builds without a live database.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use users_core::{CreateUserParams, UpdateUserParams, User, UserId};

use super::{RepositoryError, UserRepository};

const USER_COLUMNS: &str =
    "id, first_name, last_name, phone_number, address, deleted, created_at, deleted_at";

/// Raw `users` row.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: UserId,
    first_name: String,
    last_name: String,
    phone_number: String,
    address: String,
    deleted: bool,
    created_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        if row.deleted && row.deleted_at.is_none() {
            return Err(RepositoryError::DataCorruption(format!(
                "user {} is deleted but has no deleted_at",
                row.id
            )));
        }

        Ok(Self {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            phone_number: row.phone_number,
            address: row.address,
            deleted: row.deleted,
            created_at: row.created_at,
            deleted_at: row.deleted_at,
        })
    }
}

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl UserRepository for PgUserRepository {
    async fn create(&self, params: &CreateUserParams) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r"
            INSERT INTO users (first_name, last_name, phone_number, address)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(params.first_name.as_str())
        .bind(params.last_name.as_str())
        .bind(params.phone_number.as_str())
        .bind(params.address.as_str())
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn get(&self, id: UserId) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE id = $1
            "
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    async fn update(&self, id: UserId, params: &UpdateUserParams) -> Result<User, RepositoryError> {
        if params.is_empty() {
            return self.get(id).await;
        }

        let row = sqlx::query_as::<_, UserRow>(&format!(
            r"
            UPDATE users
            SET first_name   = COALESCE($2, first_name),
                last_name    = COALESCE($3, last_name),
                phone_number = COALESCE($4, phone_number),
                address      = COALESCE($5, address)
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(id)
        .bind(params.first_name.as_deref())
        .bind(params.last_name.as_deref())
        .bind(params.phone_number.as_deref())
        .bind(params.address.as_deref())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    async fn delete(&self, id: UserId) -> Result<(), RepositoryError> {
        // Zero rows affected (unknown id) is fine: delete is idempotent.
        sqlx::query(
            r"
            UPDATE users
            SET deleted = TRUE,
                deleted_at = COALESCE(deleted_at, NOW())
            WHERE id = $1
            ",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(deleted: bool, deleted_at: Option<DateTime<Utc>>) -> UserRow {
        UserRow {
            id: UserId::new(3),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            phone_number: "+15550001".to_string(),
            address: "1 Main St".to_string(),
            deleted,
            created_at: Utc::now(),
            deleted_at,
        }
    }

    #[test]
    fn test_row_converts_to_user() {
        let user = User::try_from(row(false, None)).expect("valid row");
        assert_eq!(user.id, UserId::new(3));
        assert_eq!(user.first_name.as_str(), "Jane");
        assert!(!user.is_deleted());
    }

    #[test]
    fn test_empty_column_is_kept() {
        let mut cleared = row(false, None);
        cleared.address = String::new();

        let user = User::try_from(cleared).expect("empty text is a valid value");
        assert_eq!(user.address, "");
    }

    #[test]
    fn test_deleted_without_timestamp_is_data_corruption() {
        assert!(matches!(
            User::try_from(row(true, None)),
            Err(RepositoryError::DataCorruption(_))
        ));
        assert!(User::try_from(row(true, Some(Utc::now()))).is_ok());
    }
}
