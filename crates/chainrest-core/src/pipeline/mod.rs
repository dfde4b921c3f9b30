//! The bulk request pipeline shared by every route family.
//!
//! ```text
//! body ─► ArrayGuard::extract ─► validate_items ─► FanOutExecutor::run ─► Ok(results)
//!               │                      │                    │
//!               └──── 400 / 429 ───────┴──── RouteError ────┴─► resolve_failure ─► status + body
//! ```
//!
//! Validation of every item happens before anything is dispatched, so a bad element never
//! costs an upstream call.

pub mod array_guard;
pub mod decode;
pub mod errors;
pub mod fan_out;
pub mod inspect;
pub mod respond;

pub use array_guard::{validate_array_size, ArrayGuard};
pub use decode::{decode_error, DecodedError, NETWORK_ERROR_MESSAGE};
pub use errors::RouteError;
pub use fan_out::{fan_out, FanOutExecutor};
pub use inspect::inspect_failure;
pub use respond::{resolve_failure, FailureResponse};

use serde_json::Value;

/// Validates every item up front, failing on the first invalid one in input order.
///
/// # Errors
///
/// Returns the error produced for the first invalid item.
pub fn validate_items<'a, T, F>(items: &'a [Value], validate: F) -> Result<Vec<T>, RouteError>
where
    F: FnMut(&'a Value) -> Result<T, RouteError>,
{
    items.iter().map(validate).collect()
}
