//! Route table.
//!
//! Paths are registered in full, with and without the trailing slash, and an empty final
//! segment gets its own handler so it answers with this API's 400 rather than a 404.

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::{
    middleware::{create_request_id_layers, rate_limit_middleware, tier_middleware, RequestSpan},
    routes::{block, health, mining, slp},
    state::AppState,
};

fn block_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/block", get(block::root))
        .route("/block/", get(block::root))
        .route(
            "/block/detailsByHash",
            get(block::missing_hash).post(block::details_by_hash_bulk),
        )
        .route("/block/detailsByHash/", get(block::missing_hash))
        .route("/block/detailsByHash/{hash}", get(block::details_by_hash))
        .route(
            "/block/detailsByHeight",
            get(block::missing_height).post(block::details_by_height_bulk),
        )
        .route("/block/detailsByHeight/", get(block::missing_height))
        .route("/block/detailsByHeight/{height}", get(block::details_by_height))
}

fn mining_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/mining", get(mining::root))
        .route("/mining/", get(mining::root))
        .route("/mining/getMiningInfo", get(mining::mining_info))
        .route("/mining/getNetworkHashps", get(mining::network_hashps))
}

fn slp_routes(state: &Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/slp", get(slp::root))
        .route("/slp/", get(slp::root))
        .route("/slp/list", get(slp::list_tokens))
        .route("/slp/list/{token_id}", get(slp::list_token))
        .route("/slp/balancesForAddress", get(slp::missing_address))
        .route("/slp/balancesForAddress/", get(slp::missing_address))
        .route("/slp/balancesForAddress/{address}", get(slp::balances_for_address))
        .route("/slp/balance/{address}/{token_id}", get(slp::balance_for_token))
        .route("/slp/address/convert", get(slp::missing_address))
        .route("/slp/address/convert/", get(slp::missing_address))
        .route("/slp/address/convert/{address}", get(slp::convert_address))
        .route("/slp/validateTxid", post(slp::validate_txids))
        .route_layer(from_fn_with_state(state.clone(), rate_limit_middleware))
}

/// Builds the API router: every route family plus `/health` and `/metrics`, with caller tier
/// resolution, request ids and tracing.
///
/// Transport limits (compression, body size, concurrency) are added by the binary.
pub fn create_router(state: Arc<AppState>) -> Router {
    let (set_request_id, propagate_request_id) = create_request_id_layers();

    Router::new()
        .merge(block_routes())
        .merge(mining_routes())
        .merge(slp_routes(&state))
        .route("/health", get(health::handle_health))
        .route("/metrics", get(health::handle_metrics))
        .layer(from_fn_with_state(state.clone(), tier_middleware))
        .with_state(state)
        .layer(TraceLayer::new_for_http().make_span_with(RequestSpan))
        .layer(propagate_request_id)
        .layer(set_request_id)
}
