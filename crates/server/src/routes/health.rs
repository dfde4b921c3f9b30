use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;

use crate::state::AppState;

/// `GET /health`
///
/// Liveness only. Upstreams are not probed, so a healthy answer says nothing about the full
/// node or the indexers.
pub async fn handle_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "network": state.network.as_str(),
        "uptime_seconds": state.started_at.elapsed().as_secs(),
        "rate_limit_enabled": state.rate_limiter.is_some(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// `GET /metrics`
#[allow(clippy::unused_async)]
pub async fn handle_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
        state.metrics.get_prometheus_metrics(),
    )
}
