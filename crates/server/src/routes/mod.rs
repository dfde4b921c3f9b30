//! Route handlers, one module per route family.
//!
//! Every handler returns `Result<Json<Value>, ApiError>`; failures are rendered in one place
//! by [`ApiError`]'s `IntoResponse`. Bulk handlers share the pipeline from
//! `chainrest_core::pipeline`: array guard, per-item validation, then fan-out.

pub mod block;
pub mod error;
pub mod health;
pub mod mining;
pub mod slp;

pub use error::ApiError;

use axum::body::Bytes;
use serde_json::Value;

/// Parses a request body leniently.
///
/// A missing or malformed body becomes `null`, so it fails the array guard with the route's
/// own 400 message instead of a framework rejection.
pub(crate) fn parse_body(body: &Bytes) -> Value {
    serde_json::from_slice(body).unwrap_or(Value::Null)
}

/// `true` for a 32-byte identifier written as 64 hex digits (block hashes, txids).
pub(crate) fn is_hex_id(id: &str) -> bool {
    id.len() == 64 && id.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Renders a bulk item for an error message: strings bare, anything else as JSON.
pub(crate) fn display_item(item: &Value) -> String {
    match item {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
