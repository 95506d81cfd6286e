//! Authenticated principal and the authorization gate.
//!
//! A [`Principal`] is derived once per request from a verified credential and
//! dropped when the request ends. Capabilities are granted by the credential
//! issuer; this service only interprets them.
//!
//! # Rules
//!
//! | action | allowed when |
//! |--------|--------------|
//! | create | `create` capability |
//! | view   | `view_others` capability, or the target is the caller |
//! | update | `update_others` capability, or the target is the caller |
//! | delete | `delete` capability, and the target is *not* the caller |
//!
//! Self-deletion is always forbidden, whatever the capability says.

use core::fmt;

use super::UserId;

/// The four independent capability flags carried by a credential.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[allow(clippy::struct_excessive_bools)]
pub struct Capabilities {
    /// May create users.
    pub create: bool,
    /// May delete users other than themselves.
    pub delete: bool,
    /// May update users other than themselves.
    pub update_others: bool,
    /// May view users other than themselves.
    pub view_others: bool,
}

impl Capabilities {
    /// Every capability granted.
    pub const ALL: Self = Self {
        create: true,
        delete: true,
        update_others: true,
        view_others: true,
    };

    /// No capability granted. The caller can still view and update itself.
    pub const NONE: Self = Self {
        create: false,
        delete: false,
        update_others: false,
        view_others: false,
    };
}

/// An authenticated caller: subject id plus granted capabilities.
///
/// Immutable after construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    id: UserId,
    capabilities: Capabilities,
}

impl Principal {
    /// Create a principal for subject `id` with the given capabilities.
    #[must_use]
    pub const fn new(id: UserId, capabilities: Capabilities) -> Self {
        Self { id, capabilities }
    }

    /// The subject's user id.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// The granted capabilities.
    #[must_use]
    pub const fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Create has no self/other distinction.
    #[must_use]
    pub const fn can_create(&self) -> bool {
        self.capabilities.create
    }

    /// Delete needs the delete capability and a target other than the caller.
    ///
    /// Nobody may delete themselves, not even a principal holding every
    /// capability.
    #[must_use]
    pub fn can_delete(&self, target: UserId) -> bool {
        self.capabilities.delete && self.id != target
    }

    /// Callers may always update themselves; other targets need
    /// `update_others`.
    #[must_use]
    pub fn can_update(&self, target: UserId) -> bool {
        self.capabilities.update_others || self.id == target
    }

    /// Callers may always view themselves; other targets need `view_others`.
    #[must_use]
    pub fn can_view(&self, target: UserId) -> bool {
        self.capabilities.view_others || self.id == target
    }

    /// Check whether this principal may perform `action`.
    ///
    /// # Errors
    ///
    /// Returns [`AccessDenied`] naming the action when the check fails.
    pub fn authorize(&self, action: UserAction) -> Result<(), AccessDenied> {
        let allowed = match action {
            UserAction::Create => self.can_create(),
            UserAction::View(target) => self.can_view(target),
            UserAction::Update(target) => self.can_update(target),
            UserAction::Delete(target) => self.can_delete(target),
        };

        if allowed {
            Ok(())
        } else {
            Err(AccessDenied {
                subject: self.id,
                action,
            })
        }
    }
}

/// An operation on a user record, with its target where there is one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    Create,
    View(UserId),
    Update(UserId),
    Delete(UserId),
}

impl fmt::Display for UserAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => f.write_str("create user"),
            Self::View(id) => write!(f, "view user {id}"),
            Self::Update(id) => write!(f, "update user {id}"),
            Self::Delete(id) => write!(f, "delete user {id}"),
        }
    }
}

/// Returned by [`Principal::authorize`] when a capability check fails.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("user {subject} may not {action}")]
pub struct AccessDenied {
    /// Who asked.
    pub subject: UserId,
    /// What was refused.
    pub action: UserAction,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SELF_ID: UserId = UserId::new(10);
    const OTHER_ID: UserId = UserId::new(20);

    /// All sixteen capability combinations.
    fn all_capabilities() -> impl Iterator<Item = Capabilities> {
        (0u8..16).map(|bits| Capabilities {
            create: bits & 0b0001 != 0,
            delete: bits & 0b0010 != 0,
            update_others: bits & 0b0100 != 0,
            view_others: bits & 0b1000 != 0,
        })
    }

    #[test]
    fn test_self_update_always_allowed() {
        for caps in all_capabilities() {
            let principal = Principal::new(SELF_ID, caps);
            assert!(principal.can_update(SELF_ID), "{caps:?}");
        }
    }

    #[test]
    fn test_self_view_always_allowed() {
        for caps in all_capabilities() {
            let principal = Principal::new(SELF_ID, caps);
            assert!(principal.can_view(SELF_ID), "{caps:?}");
        }
    }

    #[test]
    fn test_self_delete_always_forbidden() {
        for caps in all_capabilities() {
            let principal = Principal::new(SELF_ID, caps);
            assert!(!principal.can_delete(SELF_ID), "{caps:?}");
        }
    }

    #[test]
    fn test_other_checks_follow_flags() {
        for caps in all_capabilities() {
            let principal = Principal::new(SELF_ID, caps);
            assert_eq!(principal.can_create(), caps.create);
            assert_eq!(principal.can_delete(OTHER_ID), caps.delete);
            assert_eq!(principal.can_update(OTHER_ID), caps.update_others);
            assert_eq!(principal.can_view(OTHER_ID), caps.view_others);
        }
    }

    #[test]
    fn test_authorize_matches_predicates() {
        for caps in all_capabilities() {
            let principal = Principal::new(SELF_ID, caps);
            for target in [SELF_ID, OTHER_ID] {
                assert_eq!(
                    principal.authorize(UserAction::View(target)).is_ok(),
                    principal.can_view(target)
                );
                assert_eq!(
                    principal.authorize(UserAction::Update(target)).is_ok(),
                    principal.can_update(target)
                );
                assert_eq!(
                    principal.authorize(UserAction::Delete(target)).is_ok(),
                    principal.can_delete(target)
                );
            }
            assert_eq!(
                principal.authorize(UserAction::Create).is_ok(),
                principal.can_create()
            );
        }
    }

    #[test]
    fn test_access_denied_message() {
        let principal = Principal::new(SELF_ID, Capabilities::ALL);
        let err = principal
            .authorize(UserAction::Delete(SELF_ID))
            .expect_err("self-delete must be refused");

        assert_eq!(err.subject, SELF_ID);
        assert_eq!(err.to_string(), "user 10 may not delete user 10");
    }

    #[test]
    fn test_no_capabilities_is_limited_to_self() {
        let principal = Principal::new(SELF_ID, Capabilities::NONE);
        assert!(!principal.can_create());
        assert!(principal.can_view(SELF_ID));
        assert!(!principal.can_view(OTHER_ID));
        assert!(principal.can_update(SELF_ID));
        assert!(!principal.can_update(OTHER_ID));
        assert!(!principal.can_delete(OTHER_ID));
    }
}
