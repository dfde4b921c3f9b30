use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chainrest_core::{cache::MemoryRawTxCache, config::AppConfig};
use serde_json::Value;
use server::{router::create_router, state::AppState};
use std::sync::Arc;
use tower::ServiceExt;

/// A 64-character hex string derived from `seed`, usable as a block hash or txid.
#[must_use]
pub fn hex64(seed: u64) -> String {
    format!("{seed:064x}")
}

/// App state over `config` with an in-memory raw transaction cache.
///
/// # Panics
///
/// Panics if the HTTP client cannot be built.
#[must_use]
pub fn test_state(config: &AppConfig) -> AppState {
    AppState::from_config(config, Arc::new(MemoryRawTxCache::new()))
        .expect("test state should build")
}

#[must_use]
pub fn test_app(state: AppState) -> Router {
    create_router(Arc::new(state))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body should read");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

/// `GET uri`, returning the status and the JSON body (`null` if not JSON).
pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).expect("valid request");
    send(app, request).await
}

/// `GET uri` with headers.
pub async fn get_with_headers(
    app: &Router,
    uri: &str,
    headers: &[(&str, &str)],
) -> (StatusCode, Value) {
    let mut builder = Request::builder().uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    send(app, builder.body(Body::empty()).expect("valid request")).await
}

/// `POST uri` with a JSON body and optional extra headers.
pub async fn post_json(
    app: &Router,
    uri: &str,
    body: &Value,
    headers: &[(&str, &str)],
) -> (StatusCode, Value) {
    let mut builder =
        Request::builder().method("POST").uri(uri).header("content-type", "application/json");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    send(app, builder.body(Body::from(body.to_string())).expect("valid request")).await
}

/// `POST uri` with a raw body.
pub async fn post_raw(app: &Router, uri: &str, body: &'static str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .expect("valid request");
    send(app, request).await
}
