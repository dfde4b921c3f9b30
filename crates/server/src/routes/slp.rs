//! `/slp` family: token list, balances, address conversion and txid validation.
//!
//! Token metadata comes from `BitDB`; addresses, balances and DAG validation come from the
//! SDK capabilities held in [`AppState`].

use axum::{
    body::Bytes,
    extract::{Path, State},
    Extension, Json,
};
use chainrest_core::{
    pipeline::{validate_items, RouteError},
    sdk::{validate_network, AddressForms, SdkError},
    tokens::format_token_amount,
    types::CallerTier,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::{display_item, is_hex_id, parse_body, ApiError};
use crate::state::AppState;

const NO_BALANCES: &str = "No balances for this address";
const NO_TOKEN_BALANCE: &str = "No balance for this address and tokenId";

/// One token balance of an address, scaled by the token's decimals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalance {
    pub token_id: String,
    pub balance: String,
    pub decimal_count: u32,
}

pub async fn root() -> Json<Value> {
    Json(json!({ "status": "slp" }))
}

pub async fn missing_address() -> ApiError {
    ApiError::bad_request("address can not be empty")
}

/// `GET /slp/list`
pub async fn list_tokens(State(state): State<Arc<AppState>>) -> Result<Json<Value>, ApiError> {
    let tokens = state.tokens.list_tokens().await?;
    Ok(Json(json!(tokens)))
}

/// `GET /slp/list/{tokenId}`
pub async fn list_token(
    State(state): State<Arc<AppState>>,
    Path(token_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    match state.tokens.token(&token_id).await? {
        Some(token) => Ok(Json(json!(token))),
        None => Ok(Json(json!({ "id": "not found" }))),
    }
}

async fn convert(state: &AppState, address: &str) -> Result<AddressForms, ApiError> {
    if address.is_empty() {
        return Err(ApiError::bad_request("address can not be empty"));
    }

    state.address_codec.convert(address).await.map_err(|e| match e {
        SdkError::InvalidAddress(_) => ApiError::bad_request(format!(
            "Invalid BCH address. Double check your address is valid: {address}"
        )),
        SdkError::Upstream(failure) => failure.into(),
    })
}

/// Converts `address` and checks it belongs to the configured network.
async fn resolve_address(state: &AppState, address: &str) -> Result<AddressForms, ApiError> {
    let forms = convert(state, address).await?;

    if !validate_network(&forms.cash_address, state.network) {
        tracing::debug!(address, network = %state.network, "address from another network");
        return Err(ApiError::bad_request(
            "Invalid network. Trying to use a testnet address on mainnet, or vice versa.",
        ));
    }

    Ok(forms)
}

async fn scaled_balance(
    state: &AppState,
    token_id: String,
    raw: &str,
) -> Result<TokenBalance, ApiError> {
    let decimals = state.tokens.decimals(&token_id).await?;
    Ok(TokenBalance {
        balance: format_token_amount(raw, decimals),
        token_id,
        decimal_count: decimals,
    })
}

/// `GET /slp/balancesForAddress/{address}`
pub async fn balances_for_address(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let forms = resolve_address(&state, &address).await?;
    let balances = state.token_ledger.token_balances(&forms.slp_address).await?;
    if balances.is_empty() {
        return Ok(Json(json!(NO_BALANCES)));
    }

    let state: &AppState = &state;
    let scaled = state
        .fan_out
        .run("slp_balances_for_address", balances.into_iter().collect(), |(token_id, raw)| {
            async move { scaled_balance(state, token_id, &raw).await }
        })
        .await?;
    Ok(Json(json!(scaled)))
}

/// `GET /slp/balance/{address}/{tokenId}`
pub async fn balance_for_token(
    State(state): State<Arc<AppState>>,
    Path((address, token_id)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let forms = resolve_address(&state, &address).await?;
    let mut balances = state.token_ledger.token_balances(&forms.slp_address).await?;

    match balances.remove(&token_id) {
        Some(raw) => Ok(Json(json!(scaled_balance(&state, token_id, &raw).await?))),
        None => Ok(Json(json!(NO_TOKEN_BALANCE))),
    }
}

/// `GET /slp/address/convert/{address}`
pub async fn convert_address(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
) -> Result<Json<AddressForms>, ApiError> {
    Ok(Json(convert(&state, &address).await?))
}

fn parse_txid(item: &Value) -> Result<&str, RouteError> {
    match item.as_str() {
        Some(txid) if is_hex_id(txid) => Ok(txid),
        _ => Err(RouteError::bad_request(format!(
            "Invalid txid. Double check your txid is valid: {}",
            display_item(item)
        ))),
    }
}

/// `POST /slp/validateTxid` with `{"txids": [...]}`
pub async fn validate_txids(
    State(state): State<Arc<AppState>>,
    Extension(tier): Extension<CallerTier>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let body = parse_body(&body);
    let items = state.array_guard.extract(&body, "txids", "txids needs to be an array", tier)?;
    let txids = validate_items(items, parse_txid)?;

    let state: &AppState = &state;
    let verdicts = state
        .fan_out
        .run("slp_validate_txid", txids, |txid| async move {
            let valid = state.slp_validator.is_valid_slp_txid(txid).await?;
            Ok::<_, ApiError>(json!({ "txid": txid, "valid": valid }))
        })
        .await?;
    Ok(Json(Value::Array(verdicts)))
}
