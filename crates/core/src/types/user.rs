//! User domain types.
//!
//! These types represent validated domain objects separate from database row
//! types and HTTP payloads.

use chrono::{DateTime, Utc};

use super::{RequiredText, UserId};

/// A user record.
///
/// Text fields are non-empty when the user is created; a later update may
/// set any of them to an empty string.
///
/// Users are never physically removed. Deleting a user sets `deleted` and
/// stamps `deleted_at`; the record then stays a tombstone forever.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Store-assigned identifier.
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub address: String,
    /// Soft-delete flag.
    pub deleted: bool,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was deleted. Always `Some` when `deleted` is set.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    /// Whether this record is a tombstone.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted
    }
}

/// Parameters for creating a user. Every field is required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateUserParams {
    pub first_name: RequiredText,
    pub last_name: RequiredText,
    pub phone_number: RequiredText,
    pub address: RequiredText,
}

/// Parameters for a partial update.
///
/// Only fields that are `Some` overwrite the stored value, an empty string
/// included. A value with every field `None` is a valid request that leaves
/// the record unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateUserParams {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
}

impl UpdateUserParams {
    /// Returns `true` if no field would be changed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.phone_number.is_none()
            && self.address.is_none()
    }

    /// Apply the present fields to `user`, leaving the others untouched.
    pub fn apply_to(&self, user: &mut User) {
        if let Some(first_name) = &self.first_name {
            user.first_name = first_name.clone();
        }
        if let Some(last_name) = &self.last_name {
            user.last_name = last_name.clone();
        }
        if let Some(phone_number) = &self.phone_number {
            user.phone_number = phone_number.clone();
        }
        if let Some(address) = &self.address {
            user.address = address.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jane() -> User {
        User {
            id: UserId::new(1),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            phone_number: "+15550001".to_string(),
            address: "1 Main St".to_string(),
            deleted: false,
            created_at: Utc::now(),
            deleted_at: None,
        }
    }

    #[test]
    fn test_empty_update_is_empty() {
        assert!(UpdateUserParams::default().is_empty());

        let params = UpdateUserParams {
            address: Some("2 Oak St".to_string()),
            ..Default::default()
        };
        assert!(!params.is_empty());
    }

    #[test]
    fn test_apply_overwrites_only_present_fields() {
        let mut user = jane();
        let params = UpdateUserParams {
            address: Some("2 Oak St".to_string()),
            ..Default::default()
        };

        params.apply_to(&mut user);

        assert_eq!(user.first_name.as_str(), "Jane");
        assert_eq!(user.last_name.as_str(), "Doe");
        assert_eq!(user.phone_number.as_str(), "+15550001");
        assert_eq!(user.address.as_str(), "2 Oak St");
    }

    #[test]
    fn test_apply_stores_empty_string() {
        let mut user = jane();
        let params = UpdateUserParams {
            phone_number: Some(String::new()),
            ..Default::default()
        };

        params.apply_to(&mut user);

        assert_eq!(user.phone_number, "");
        assert_eq!(user.first_name, "Jane");
    }

    #[test]
    fn test_apply_empty_update_is_noop() {
        let mut user = jane();
        let before = user.clone();

        UpdateUserParams::default().apply_to(&mut user);

        assert_eq!(user, before);
    }
}
