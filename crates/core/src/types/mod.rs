//! Core types for the users service.
//!
//! This module provides type-safe wrappers for the service's domain concepts.

pub mod id;
pub mod principal;
pub mod text;
pub mod user;

pub use id::*;
pub use principal::{AccessDenied, Capabilities, Principal, UserAction};
pub use text::{RequiredText, TextError};
pub use user::{CreateUserParams, UpdateUserParams, User};
