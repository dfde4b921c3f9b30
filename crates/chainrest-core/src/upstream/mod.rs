//! Upstream service clients.
//!
//! Three upstreams sit behind the gateway:
//!
//! - the **full node**, spoken to over JSON-RPC 1.0 with basic auth ([`UpstreamClient::rpc_call`])
//! - the **block indexer**, an Insight-style REST service ([`UpstreamClient::indexer_get`])
//! - **`BitDB`**, queried with base64-encoded JSON in the URL path ([`BitDbClient`])
//!
//! All of them share one [`HttpClient`] with a fixed per-call timeout. Every failure is sorted
//! into an [`UpstreamError`] variant at the transport boundary, so nothing above this module
//! inspects raw reqwest errors.

pub mod bitdb;
pub mod client;
pub mod errors;
pub mod http_client;

pub use bitdb::{BitDbClient, BitDbResponse};
pub use client::UpstreamClient;
pub use errors::{ResponseBody, UpstreamError};
pub use http_client::HttpClient;

use reqwest::Url;

/// Appends `path` to `base`, inserting a `/` only when `base` lacks one.
#[must_use]
pub fn join_url(base: &str, path: &str) -> String {
    let path = path.trim_start_matches('/');
    if base.ends_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}

/// Appends each of `segments` to the path of `base`, percent-encoding them, so a segment
/// can never add path components, a query or a fragment.
///
/// # Errors
///
/// Returns [`UpstreamError::Transport`] if `base` is not an absolute http(s) URL.
pub fn segment_url(base: &str, segments: &[&str]) -> Result<String, UpstreamError> {
    let mut url = Url::parse(base)
        .map_err(|e| UpstreamError::Transport(format!("invalid upstream url {base}: {e}")))?;
    url.path_segments_mut()
        .map_err(|()| UpstreamError::Transport(format!("upstream url has no path: {base}")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url.into())
}
