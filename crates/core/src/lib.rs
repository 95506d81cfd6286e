//! Users Core - Domain types for the users service.
//!
//! This crate provides the types shared by the server and its tests:
//! - user records and the parameters that create or change them
//! - the authenticated [`Principal`] and its capability checks
//!
//! # Architecture
//!
//! The core crate contains only types and pure decision logic - no I/O, no
//! database access, no HTTP. Authorization decisions live here so they can be
//! exercised without a running server.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, validated text, users and principals

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
