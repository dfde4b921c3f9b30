use serde_json::Value;
use std::error::Error as StdError;
use thiserror::Error;

/// Markers found in transport error text when name resolution or routing failed.
///
/// The uppercase forms are the errno names some resolvers and proxies surface; the lowercase
/// ones are what hyper and the system resolver produce.
pub const NETWORK_FAILURE_MARKERS: &[&str] = &[
    "ENOTFOUND",
    "ENETUNREACH",
    "EAI_AGAIN",
    "dns error",
    "failed to lookup address",
    "network is unreachable",
    "temporary failure in name resolution",
];

/// Body of a non-success HTTP response, as far as it could be read.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Empty,
    Json(Value),
    Text(String),
}

impl ResponseBody {
    /// Parses raw response text, preferring JSON.
    #[must_use]
    pub fn from_text(text: String) -> Self {
        if text.trim().is_empty() {
            return Self::Empty;
        }
        match serde_json::from_str::<Value>(&text) {
            Ok(value) => Self::Json(value),
            Err(_) => Self::Text(text),
        }
    }
}

/// Every failure shape an upstream call can produce.
///
/// The variants are the closed set the error decoder matches on; transport errors from
/// reqwest are sorted into them by [`UpstreamError::from_transport`].
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum UpstreamError {
    /// The full node answered `200` with a non-null `error` object.
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// Non-success HTTP status, with whatever body came back.
    #[error("HTTP error: {status}")]
    Http { status: u16, body: ResponseBody },

    /// Host name could not be resolved.
    #[error("DNS resolution failed: {0}")]
    Dns(String),

    /// No route to the upstream network.
    #[error("Network unreachable: {0}")]
    NetworkUnreachable(String),

    /// The upstream refused the TCP connection.
    #[error("Connection refused: {0}")]
    ConnectionRefused(String),

    /// The connection was aborted or reset mid-request.
    #[error("Connection aborted: {0}")]
    ConnectionAborted(String),

    /// Request exceeded the configured timeout duration.
    #[error("Request timeout")]
    Timeout,

    /// Response from upstream could not be parsed or was malformed.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Any other transport failure, carrying the error chain as text.
    #[error("Transport error: {0}")]
    Transport(String),
}

impl UpstreamError {
    /// Sorts a reqwest failure into one of the typed variants.
    #[must_use]
    pub fn from_transport(error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            return Self::Timeout;
        }

        let chain = error_chain_text(error);

        let mut source: Option<&(dyn StdError + 'static)> = error.source();
        while let Some(err) = source {
            if let Some(io) = err.downcast_ref::<std::io::Error>() {
                match io.kind() {
                    std::io::ErrorKind::ConnectionRefused => {
                        return Self::ConnectionRefused(chain);
                    }
                    std::io::ErrorKind::ConnectionAborted |
                    std::io::ErrorKind::ConnectionReset => {
                        return Self::ConnectionAborted(chain);
                    }
                    std::io::ErrorKind::NetworkUnreachable |
                    std::io::ErrorKind::HostUnreachable => {
                        return Self::NetworkUnreachable(chain);
                    }
                    std::io::ErrorKind::TimedOut => return Self::Timeout,
                    _ => {}
                }
            }
            source = err.source();
        }

        let lower = chain.to_lowercase();
        if lower.contains("dns error") || lower.contains("failed to lookup address") {
            Self::Dns(chain)
        } else if lower.contains("connection refused") {
            Self::ConnectionRefused(chain)
        } else if lower.contains("network is unreachable") {
            Self::NetworkUnreachable(chain)
        } else if lower.contains("connection reset") || lower.contains("connection aborted") {
            Self::ConnectionAborted(chain)
        } else if error.is_decode() {
            Self::InvalidResponse(chain)
        } else {
            Self::Transport(chain)
        }
    }

    /// `true` when the upstream said the resource does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Http { status: 404, .. })
    }

    /// Returns a static string representation for metrics labels.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rpc { .. } => "rpc_error",
            Self::Http { .. } => "http_error",
            Self::Dns(_) => "dns",
            Self::NetworkUnreachable(_) => "network_unreachable",
            Self::ConnectionRefused(_) => "connection_refused",
            Self::ConnectionAborted(_) => "connection_aborted",
            Self::Timeout => "timeout",
            Self::InvalidResponse(_) => "invalid_response",
            Self::Transport(_) => "transport",
        }
    }
}

/// Joins an error and all of its sources into one line.
fn error_chain_text(error: &(dyn StdError + 'static)) -> String {
    let mut text = error.to_string();
    let mut source = error.source();
    while let Some(err) = source {
        let next = err.to_string();
        if !text.contains(&next) {
            text.push_str(": ");
            text.push_str(&next);
        }
        source = err.source();
    }
    text
}

/// `true` if `message` carries one of the [`NETWORK_FAILURE_MARKERS`].
#[must_use]
pub fn has_network_failure_marker(message: &str) -> bool {
    let lower = message.to_lowercase();
    NETWORK_FAILURE_MARKERS.iter().any(|marker| lower.contains(&marker.to_lowercase()))
}
