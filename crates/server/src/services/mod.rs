//! Business logic services.
//!
//! - `auth` - bearer token verification into a [`users_core::Principal`]
//! - `users` - user lifecycle on top of the repository port

pub mod auth;
pub mod users;
