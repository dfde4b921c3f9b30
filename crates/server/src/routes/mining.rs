//! `/mining` family.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::ApiError;
use crate::state::AppState;

const DEFAULT_NBLOCKS: i64 = 120;
const DEFAULT_HEIGHT: i64 = -1;

pub async fn root() -> Json<Value> {
    Json(json!({ "status": "mining" }))
}

/// `GET /mining/getMiningInfo`
pub async fn mining_info(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    Ok(Json(state.upstream.mining_info().await?))
}

/// Query string of `getNetworkHashps`. Values are kept as text so a bad number gets this
/// API's error shape rather than the extractor's.
#[derive(Debug, Default, Deserialize)]
pub struct NetworkHashpsQuery {
    nblocks: Option<String>,
    height: Option<String>,
}

fn integer_param(name: &str, raw: Option<&str>, default: i64) -> Result<i64, ApiError> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| ApiError::bad_request(format!("{name} must be an integer: {value}"))),
    }
}

/// `GET /mining/getNetworkHashps?nblocks=120&height=-1`
pub async fn network_hashps(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NetworkHashpsQuery>,
) -> Result<Json<Value>, ApiError> {
    let nblocks = integer_param("nblocks", query.nblocks.as_deref(), DEFAULT_NBLOCKS)?;
    let height = integer_param("height", query.height.as_deref(), DEFAULT_HEIGHT)?;
    Ok(Json(state.upstream.network_hashps(nblocks, height).await?))
}
