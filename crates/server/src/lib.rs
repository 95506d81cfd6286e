//! Users service library.
//!
//! This crate provides the server functionality as a library, allowing the
//! router to be exercised in-process by the integration tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
