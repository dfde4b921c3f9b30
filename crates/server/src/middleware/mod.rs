//! Axum adapters around `chainrest_core::middleware`.
//!
//! The core crate owns the token buckets and the key comparison; the functions here deal
//! with headers, extensions and status codes.

pub mod correlation_id;
pub mod rate_limiting;
pub mod tier;

pub use correlation_id::{create_request_id_layers, RequestSpan, UuidRequestIdGenerator, X_REQUEST_ID};
pub use rate_limiting::rate_limit_middleware;
pub use tier::{tier_middleware, X_API_KEY};
