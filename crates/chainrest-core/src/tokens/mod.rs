//! SLP token discovery through `BitDB` genesis records.

use chrono::DateTime;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::upstream::{BitDbClient, UpstreamError};

/// Most genesis records returned by one listing query.
pub const TOKEN_LIST_LIMIT: u32 = 1000;

/// Largest decimal count an SLP genesis may declare.
pub const MAX_DECIMALS: u32 = 9;

/// Formatted SLP genesis record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRecord {
    pub id: String,
    pub timestamp: String,
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub document_uri: Option<String>,
    pub document_hash: Option<String>,
    pub decimals: u32,
    pub initial_token_qty: f64,
}

/// `BitDB` query selecting SLP genesis transactions, optionally a single one.
#[must_use]
pub fn genesis_query(token_id: Option<&str>) -> Value {
    let mut find = json!({
        "out.h1": "534c5000",
        "out.s3": "GENESIS",
    });
    let limit = match token_id {
        Some(id) => {
            find["tx.h"] = json!(id);
            1
        }
        None => TOKEN_LIST_LIMIT,
    };
    json!({ "v": 3, "q": { "find": find, "limit": limit } })
}

/// Formats one genesis match.
///
/// `h8` is the hex-encoded decimals byte. Returns `None` when the record lacks a transaction
/// hash or declares decimals that are not a hex number up to [`MAX_DECIMALS`].
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_token(record: &Value) -> Option<TokenRecord> {
    let id = record.pointer("/tx/h")?.as_str()?.to_string();
    let out = record.pointer("/out/0").unwrap_or(&Value::Null);
    let field = |key: &str| out.get(key).and_then(Value::as_str).map(str::to_string);

    let timestamp = record
        .pointer("/blk/t")
        .and_then(Value::as_i64)
        .and_then(|t| DateTime::from_timestamp(t, 0))
        .map_or_else(|| "unconfirmed".to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string());

    let decimals = match field("h8") {
        None => 0,
        Some(h8) => match u32::from_str_radix(&h8, 16) {
            Ok(decimals) if decimals <= MAX_DECIMALS => decimals,
            _ => {
                tracing::debug!(token_id = %id, h8 = %h8, "genesis with invalid decimals skipped");
                return None;
            }
        },
    };
    let initial_raw = field("h10").and_then(|h| u64::from_str_radix(&h, 16).ok()).unwrap_or(0);
    let initial_token_qty = initial_raw as f64 / 10f64.powi(i32::try_from(decimals).unwrap_or(0));

    Some(TokenRecord {
        id,
        timestamp,
        symbol: field("s4"),
        name: field("s5"),
        document_uri: field("s6"),
        document_hash: field("h7"),
        decimals,
        initial_token_qty,
    })
}

/// Renders a base-unit amount with `decimals` fractional digits, without float rounding.
///
/// Trailing fractional zeros are dropped: `("1050", 2)` → `"10.5"`. `decimals` is capped at
/// [`MAX_DECIMALS`].
#[must_use]
pub fn format_token_amount(raw: &str, decimals: u32) -> String {
    let digits = raw.trim().trim_start_matches('0');
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return "0".to_string();
    }
    let decimals = decimals.min(MAX_DECIMALS) as usize;
    if decimals == 0 {
        return digits.to_string();
    }

    let padded = format!("{digits:0>width$}", width = decimals + 1);
    let (whole, fraction) = padded.split_at(padded.len() - decimals);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{fraction}")
    }
}

/// Token lookups backed by `BitDB`.
pub struct TokenDirectory {
    bitdb: Arc<BitDbClient>,
}

impl TokenDirectory {
    #[must_use]
    pub fn new(bitdb: Arc<BitDbClient>) -> Self {
        Self { bitdb }
    }

    /// Every known token, unconfirmed first.
    ///
    /// # Errors
    ///
    /// Any `BitDB` failure.
    pub async fn list_tokens(&self) -> Result<Vec<TokenRecord>, UpstreamError> {
        let response = self.bitdb.query(&genesis_query(None)).await?;
        Ok(response.into_matches().filter_map(|m| format_token(&m)).collect())
    }

    /// The token created by genesis transaction `token_id`, if any.
    ///
    /// # Errors
    ///
    /// Any `BitDB` failure.
    pub async fn token(&self, token_id: &str) -> Result<Option<TokenRecord>, UpstreamError> {
        let response = self.bitdb.query(&genesis_query(Some(token_id))).await?;
        Ok(response.into_matches().filter_map(|m| format_token(&m)).find(|t| t.id == token_id))
    }

    /// Decimal places of `token_id`.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError::InvalidResponse`] if `BitDB` has no genesis for the token.
    pub async fn decimals(&self, token_id: &str) -> Result<u32, UpstreamError> {
        self.token(token_id).await?.map(|t| t.decimals).ok_or_else(|| {
            UpstreamError::InvalidResponse(format!("no genesis record for token {token_id}"))
        })
    }
}
