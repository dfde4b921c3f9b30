use axum::{
    body::Body,
    extract::State,
    http::{HeaderName, Request},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::state::AppState;

pub static X_API_KEY: HeaderName = HeaderName::from_static("x-api-key");

/// Resolves the caller tier from `x-api-key` and stores it as a request extension.
///
/// Runs on every route, so handlers can always extract `Extension<CallerTier>`. An unknown
/// or missing key is the freemium tier, never an error.
pub async fn tier_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let api_key = request.headers().get(&X_API_KEY).and_then(|v| v.to_str().ok());
    let tier = state.tier_resolver.resolve(api_key);

    tracing::trace!(tier = tier.as_str(), "caller tier resolved");
    request.extensions_mut().insert(tier);

    next.run(request).await
}
