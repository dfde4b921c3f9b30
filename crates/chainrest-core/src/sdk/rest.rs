use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::{collections::BTreeMap, sync::Arc};

use crate::{
    sdk::{AddressCodec, AddressForms, SdkError, SlpValidator, TokenLedger},
    upstream::{segment_url, HttpClient, UpstreamError},
};

pub const SDK_SERVICE: &str = "sdk";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BalancesResponse {
    #[serde(default)]
    slp_token_balances: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
struct TxidVerdict {
    txid: String,
    #[serde(default)]
    valid: bool,
}

/// Client for the SDK REST backend.
///
/// | Capability | Request |
/// |------------|---------|
/// | address conversion | `GET {base}slp/convert/{address}` |
/// | token balances | `GET {base}slp/balances/{slpAddress}` |
/// | DAG validation | `POST {base}slp/validateTxid` with `{"txids": [..]}` |
pub struct RestSdk {
    http: Arc<HttpClient>,
    base_url: String,
}

impl RestSdk {
    #[must_use]
    pub fn new(http: Arc<HttpClient>, base_url: impl Into<String>) -> Self {
        Self { http, base_url: base_url.into() }
    }

    fn url(&self, segments: &[&str]) -> Result<String, UpstreamError> {
        segment_url(&self.base_url, segments)
    }
}

#[async_trait]
impl AddressCodec for RestSdk {
    async fn convert(&self, address: &str) -> Result<AddressForms, SdkError> {
        let url = self.url(&["slp", "convert", address])?;
        let raw = match self.http.get_json(SDK_SERVICE, &url).await {
            Ok(raw) => raw,
            Err(UpstreamError::Http { status: 400 | 422, .. }) => {
                return Err(SdkError::InvalidAddress(address.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        serde_json::from_value(raw).map_err(|e| {
            SdkError::Upstream(UpstreamError::InvalidResponse(format!(
                "malformed address conversion: {e}"
            )))
        })
    }
}

#[async_trait]
impl TokenLedger for RestSdk {
    async fn token_balances(
        &self,
        slp_address: &str,
    ) -> Result<BTreeMap<String, String>, UpstreamError> {
        let url = self.url(&["slp", "balances", slp_address])?;
        let raw = self.http.get_json(SDK_SERVICE, &url).await?;
        let response: BalancesResponse = serde_json::from_value(raw)
            .map_err(|e| UpstreamError::InvalidResponse(format!("malformed balances: {e}")))?;

        response
            .slp_token_balances
            .into_iter()
            .map(|(token_id, amount)| match amount {
                Value::String(s) => Ok((token_id, s)),
                Value::Number(n) => Ok((token_id, n.to_string())),
                other => Err(UpstreamError::InvalidResponse(format!(
                    "balance for {token_id} is not a number: {other}"
                ))),
            })
            .collect()
    }
}

#[async_trait]
impl SlpValidator for RestSdk {
    async fn is_valid_slp_txid(&self, txid: &str) -> Result<bool, UpstreamError> {
        let url = self.url(&["slp", "validateTxid"])?;
        let raw = self.http.post_json(SDK_SERVICE, &url, &json!({ "txids": [txid] }), None).await?;
        let verdicts: Vec<TxidVerdict> = serde_json::from_value(raw)
            .map_err(|e| UpstreamError::InvalidResponse(format!("malformed validation: {e}")))?;

        Ok(verdicts.into_iter().any(|v| v.txid == txid && v.valid))
    }
}
