//! Request middleware logic.
//!
//! This module holds the framework-independent part of the middleware; the axum adapters
//! live in `crates/server/src/middleware`.
//!
//! - **[`rate_limiting`]**: token bucket per client IP, applied to the SLP routes
//! - **[`tier`]**: maps the `x-api-key` header to a [`CallerTier`](crate::types::CallerTier),
//!   which selects the bulk array limit

pub mod rate_limiting;
pub mod tier;

pub use rate_limiting::{rate_limit_message, RateLimiter};
pub use tier::TierResolver;
