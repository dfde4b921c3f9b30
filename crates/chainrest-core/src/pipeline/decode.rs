use serde_json::{json, Value};

use crate::upstream::errors::{has_network_failure_marker, ResponseBody, UpstreamError};

/// Message returned for every failure to reach an upstream. The cause is not leaked.
pub const NETWORK_ERROR_MESSAGE: &str = "Network error: could not reach upstream";

/// Normalized failure: what to tell the caller and with which status.
///
/// `message == None` means the failure could not be classified; the caller substitutes a
/// generic rendering and the status is always `500`.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedError {
    pub message: Option<Value>,
    pub status: u16,
}

impl DecodedError {
    fn with(message: impl Into<Value>, status: u16) -> Self {
        Self { message: Some(message.into()), status }
    }

    fn network() -> Self {
        Self::with(NETWORK_ERROR_MESSAGE, 503)
    }

    fn unclassified() -> Self {
        Self { message: None, status: 500 }
    }
}

/// Classifies an upstream failure. First match wins:
///
/// 1. a structured error with a nested `error.message` → that message, `400`
/// 2. any other response body → the body, with the upstream's own status
/// 3. DNS or routing failure → network error, `503`
/// 4. refused, aborted or timed-out connection → network error, `503`
/// 5. anything else → no message, `500`
#[must_use]
pub fn decode_error(failure: &UpstreamError) -> DecodedError {
    match failure {
        UpstreamError::Rpc { code, message } => {
            if message.is_empty() {
                DecodedError::with(json!({"code": code, "message": message}), 400)
            } else {
                DecodedError::with(message.as_str(), 400)
            }
        }
        UpstreamError::Http { status, body } => match body {
            ResponseBody::Json(value) => match nested_error_message(value) {
                Some(message) => DecodedError::with(message, 400),
                None if is_truthy(value) => DecodedError::with(value.clone(), *status),
                None => DecodedError::unclassified(),
            },
            ResponseBody::Text(text) => DecodedError::with(text.as_str(), *status),
            ResponseBody::Empty => DecodedError::unclassified(),
        },
        UpstreamError::Dns(_) | UpstreamError::NetworkUnreachable(_) => DecodedError::network(),
        UpstreamError::ConnectionRefused(_) |
        UpstreamError::ConnectionAborted(_) |
        UpstreamError::Timeout => DecodedError::network(),
        UpstreamError::Transport(message) | UpstreamError::InvalidResponse(message) => {
            if has_network_failure_marker(message) {
                DecodedError::network()
            } else {
                DecodedError::unclassified()
            }
        }
    }
}

/// `error.message` when it is a non-empty string.
fn nested_error_message(body: &Value) -> Option<&str> {
    body.get("error")?.get("message")?.as_str().filter(|m| !m.is_empty())
}

/// Whether a JSON body carries anything worth passing on.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::Array(_) | Value::Object(_) => true,
    }
}
