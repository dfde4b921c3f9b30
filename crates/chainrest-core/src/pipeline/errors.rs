use crate::upstream::errors::UpstreamError;

/// Failure of a route handler, before rendering.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    /// Input rejected locally. Never an upstream or server fault.
    #[error("{message}")]
    Validation { status: u16, message: String },

    /// An upstream call failed; rendered through the error decoder.
    #[error("Upstream error: {0}")]
    Upstream(#[from] UpstreamError),
}

impl RouteError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::Validation { status: 400, message: message.into() }
    }
}

impl PartialEq for RouteError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Self::Validation { status: a, message: m },
                Self::Validation { status: b, message: n },
            ) => a == b && m == n,
            (Self::Upstream(a), Self::Upstream(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
