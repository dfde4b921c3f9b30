//! `/block` family: block details by hash or height, single and bulk.

use axum::{
    body::Bytes,
    extract::{Path, State},
    Extension, Json,
};
use chainrest_core::{
    pipeline::{validate_items, RouteError},
    types::CallerTier,
};
use serde_json::{json, Value};
use std::sync::Arc;

use super::{display_item, is_hex_id, parse_body, ApiError};
use crate::state::AppState;

pub async fn root() -> Json<Value> {
    Json(json!({ "status": "block" }))
}

pub async fn missing_hash() -> ApiError {
    ApiError::bad_request("hash must not be empty")
}

pub async fn missing_height() -> ApiError {
    ApiError::bad_request("height must not be empty")
}

fn parse_hash(item: &Value) -> Result<&str, RouteError> {
    match item.as_str() {
        Some(hash) if is_hex_id(hash) => Ok(hash),
        _ => Err(RouteError::bad_request(format!(
            "Invalid hash. Double check your hash is valid: {}",
            display_item(item)
        ))),
    }
}

/// Accepts a non-negative integer, as a JSON number or a decimal string.
fn parse_height(item: &Value) -> Result<u64, RouteError> {
    let parsed = match item {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| {
        RouteError::bad_request(format!(
            "Invalid height. Double check your height is valid: {}",
            display_item(item)
        ))
    })
}

/// `GET /block/detailsByHash/{hash}`
pub async fn details_by_hash(
    State(state): State<Arc<AppState>>,
    Path(hash): Path<String>,
) -> Result<Json<Value>, ApiError> {
    if hash.is_empty() {
        return Err(ApiError::bad_request("hash must not be empty"));
    }
    let hash = parse_hash(&Value::String(hash))?.to_string();
    Ok(Json(state.upstream.block_by_hash(&hash).await?))
}

/// `POST /block/detailsByHash` with `{"hashes": [...]}`
pub async fn details_by_hash_bulk(
    State(state): State<Arc<AppState>>,
    Extension(tier): Extension<CallerTier>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let body = parse_body(&body);
    let items = state.array_guard.extract(
        &body,
        "hashes",
        "hashes needs to be an array. Use GET for single hash.",
        tier,
    )?;
    let hashes = validate_items(items, parse_hash)?;

    let blocks = state
        .fan_out
        .run("block_details_by_hash", hashes, |hash| state.upstream.block_by_hash(hash))
        .await?;
    Ok(Json(Value::Array(blocks)))
}

/// `GET /block/detailsByHeight/{height}`
pub async fn details_by_height(
    State(state): State<Arc<AppState>>,
    Path(height): Path<String>,
) -> Result<Json<Value>, ApiError> {
    if height.is_empty() {
        return Err(ApiError::bad_request("height must not be empty"));
    }
    let height = parse_height(&Value::String(height))?;
    Ok(Json(state.upstream.block_by_height(height).await?))
}

/// `POST /block/detailsByHeight` with `{"heights": [...]}`
pub async fn details_by_height_bulk(
    State(state): State<Arc<AppState>>,
    Extension(tier): Extension<CallerTier>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let body = parse_body(&body);
    let items = state.array_guard.extract(
        &body,
        "heights",
        "heights needs to be an array. Use GET for single height.",
        tier,
    )?;
    let heights = validate_items(items, parse_height)?;

    let blocks = state
        .fan_out
        .run("block_details_by_height", heights, |height| state.upstream.block_by_height(height))
        .await?;
    Ok(Json(Value::Array(blocks)))
}
