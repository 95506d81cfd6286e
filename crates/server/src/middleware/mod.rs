//! HTTP middleware and extractors.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. `TraceLayer` (request span)
//! 2. Request ID (record into the span, echo in response)
//! 3. `TimeoutLayer` (408 after the configured duration)
//!
//! Authentication is an extractor rather than a layer so each handler
//! controls where in its argument list the caller is identified.

pub mod auth;
pub mod request_id;

pub use auth::{Authenticated, bearer_token};
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
