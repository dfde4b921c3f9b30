use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::{net::SocketAddr, sync::Arc};

use crate::state::AppState;

/// Per-IP rate limiting for the SLP routes.
///
/// The client key is the peer IP from `ConnectInfo`. Requests served without connect info
/// (in-process tests) share the `unknown` bucket. Passes everything through when rate
/// limiting is disabled.
pub async fn rate_limit_middleware(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let Some(limiter) = &state.rate_limiter else {
        return next.run(request).await;
    };

    let key = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or_else(|| "unknown".to_string(), |ConnectInfo(addr)| addr.ip().to_string());

    if !limiter.check(&key) {
        tracing::warn!(client = %key, path = %request.uri().path(), "rate limit exceeded");
        state.metrics.record_rate_limited();
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({ "error": state.rate_limit_message })),
        )
            .into_response();
    }

    next.run(request).await
}
