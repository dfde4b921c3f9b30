use serde_json::{json, Value};

use crate::pipeline::{decode::decode_error, errors::RouteError, inspect::inspect_failure};

/// Status and JSON body a failed route answers with.
#[derive(Debug, Clone, PartialEq)]
pub struct FailureResponse {
    pub status: u16,
    pub body: Value,
}

impl FailureResponse {
    fn error(status: u16, message: impl Into<Value>) -> Self {
        Self { status, body: json!({ "error": message.into() }) }
    }
}

/// Turns a route failure into its HTTP rendering.
///
/// Upstream failures go through [`decode_error`]; when it cannot classify the failure, an
/// empty-bodied `404` becomes `Not Found` and everything else a `500` carrying a bounded
/// dump of the failure.
#[must_use]
pub fn resolve_failure(error: &RouteError) -> FailureResponse {
    match error {
        RouteError::Validation { status, message } => {
            tracing::debug!(status, message = %message, "request rejected");
            FailureResponse::error(*status, message.as_str())
        }
        RouteError::Upstream(failure) => {
            let decoded = decode_error(failure);
            if let Some(message) = decoded.message {
                tracing::warn!(
                    status = decoded.status,
                    error_kind = failure.as_str(),
                    error = %failure,
                    "upstream request failed"
                );
                FailureResponse::error(decoded.status, message)
            } else if failure.is_not_found() {
                tracing::debug!(error = %failure, "upstream resource not found");
                FailureResponse::error(404, "Not Found")
            } else {
                tracing::error!(
                    error_kind = failure.as_str(),
                    error = %failure,
                    "unclassified upstream failure"
                );
                FailureResponse::error(500, inspect_failure(failure))
            }
        }
    }
}
