use base64::{engine::general_purpose::STANDARD, Engine};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use crate::upstream::{errors::UpstreamError, http_client::HttpClient, join_url};

pub const BITDB_SERVICE: &str = "bitdb";

/// Matches returned by a `BitDB` query.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BitDbResponse {
    /// Unconfirmed matches.
    #[serde(default)]
    pub u: Vec<Value>,
    /// Confirmed matches.
    #[serde(default)]
    pub c: Vec<Value>,
}

impl BitDbResponse {
    /// Unconfirmed matches followed by confirmed ones.
    pub fn into_matches(self) -> impl Iterator<Item = Value> {
        self.u.into_iter().chain(self.c)
    }
}

/// Encodes a query the way `BitDB` expects it in the URL path.
#[must_use]
pub fn encode_query(query: &Value) -> String {
    STANDARD.encode(query.to_string())
}

pub struct BitDbClient {
    http: Arc<HttpClient>,
    base_url: String,
}

impl BitDbClient {
    #[must_use]
    pub fn new(http: Arc<HttpClient>, base_url: impl Into<String>) -> Self {
        Self { http, base_url: base_url.into() }
    }

    /// Runs `query` against `{base_url}q/{base64(query)}`.
    ///
    /// # Errors
    ///
    /// Any failure from the underlying [`HttpClient`], or
    /// [`UpstreamError::InvalidResponse`] if the body is not a `{u, c}` object.
    pub async fn query(&self, query: &Value) -> Result<BitDbResponse, UpstreamError> {
        let url = join_url(&self.base_url, &format!("q/{}", encode_query(query)));
        let raw = self.http.get_json(BITDB_SERVICE, &url).await?;
        serde_json::from_value(raw)
            .map_err(|e| UpstreamError::InvalidResponse(format!("malformed BitDB response: {e}")))
    }
}
