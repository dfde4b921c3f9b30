use serde_json::{json, Value};
use std::sync::Arc;

use crate::{
    config::UpstreamsConfig,
    types::{JsonRpcRequest, JsonRpcResponse},
    upstream::{errors::UpstreamError, http_client::HttpClient, segment_url},
};

pub const FULL_NODE_SERVICE: &str = "full_node";
pub const INDEXER_SERVICE: &str = "indexer";

/// Client for the full node JSON-RPC endpoint and the block indexer.
pub struct UpstreamClient {
    http: Arc<HttpClient>,
    rpc_url: String,
    rpc_username: String,
    rpc_password: String,
    indexer_base_url: String,
}

impl UpstreamClient {
    #[must_use]
    pub fn new(http: Arc<HttpClient>, config: &UpstreamsConfig) -> Self {
        Self {
            http,
            rpc_url: config.rpc_base_url.clone(),
            rpc_username: config.rpc_username.clone(),
            rpc_password: config.rpc_password.clone(),
            indexer_base_url: config.indexer_base_url.clone(),
        }
    }

    /// Calls `method` on the full node and returns its `result`.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError::Rpc`] when the node answers with an `error` object, or any
    /// transport/HTTP failure from the underlying [`HttpClient`].
    pub async fn rpc_call(&self, method: &str, params: Vec<Value>) -> Result<Value, UpstreamError> {
        let request = JsonRpcRequest::new(method, params);
        let raw = self
            .http
            .post_json(
                FULL_NODE_SERVICE,
                &self.rpc_url,
                &request,
                Some((&self.rpc_username, &self.rpc_password)),
            )
            .await?;

        let response: JsonRpcResponse = serde_json::from_value(raw).map_err(|e| {
            UpstreamError::InvalidResponse(format!("malformed JSON-RPC response: {e}"))
        })?;

        if let Some(error) = response.error {
            return Err(UpstreamError::Rpc { code: error.code, message: error.message });
        }

        Ok(response.result.unwrap_or(Value::Null))
    }

    /// `GET {indexer_base_url}{segments..}`, each segment percent-encoded.
    ///
    /// # Errors
    ///
    /// Any failure from the underlying [`HttpClient`].
    pub async fn indexer_get(&self, segments: &[&str]) -> Result<Value, UpstreamError> {
        let url = segment_url(&self.indexer_base_url, segments)?;
        self.http.get_json(INDEXER_SERVICE, &url).await
    }

    /// Block details from the indexer, returned verbatim.
    ///
    /// # Errors
    ///
    /// Any failure from the underlying [`HttpClient`].
    pub async fn block_by_hash(&self, hash: &str) -> Result<Value, UpstreamError> {
        self.indexer_get(&["block", hash]).await
    }

    /// Resolves a height to a block hash through `getblockhash`.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError::InvalidResponse`] if the node's result is not a string.
    pub async fn block_hash_at(&self, height: u64) -> Result<String, UpstreamError> {
        match self.rpc_call("getblockhash", vec![json!(height)]).await? {
            Value::String(hash) => Ok(hash),
            other => Err(UpstreamError::InvalidResponse(format!(
                "getblockhash returned a non-string result: {other}"
            ))),
        }
    }

    /// Height → hash on the full node, then hash → details on the indexer.
    ///
    /// # Errors
    ///
    /// Fails with whichever of the two calls failed first.
    pub async fn block_by_height(&self, height: u64) -> Result<Value, UpstreamError> {
        let hash = self.block_hash_at(height).await?;
        self.block_by_hash(&hash).await
    }

    /// Serialized transaction as hex (`getrawtransaction [txid, 0]`).
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError::InvalidResponse`] if the node's result is not a string.
    pub async fn raw_transaction(&self, txid: &str) -> Result<String, UpstreamError> {
        match self.rpc_call("getrawtransaction", vec![json!(txid), json!(0)]).await? {
            Value::String(hex) => Ok(hex),
            other => Err(UpstreamError::InvalidResponse(format!(
                "getrawtransaction returned a non-string result: {other}"
            ))),
        }
    }

    /// # Errors
    ///
    /// Any failure from [`rpc_call`](Self::rpc_call).
    pub async fn mining_info(&self) -> Result<Value, UpstreamError> {
        self.rpc_call("getmininginfo", Vec::new()).await
    }

    /// Estimated network hashes per second over the last `nblocks` blocks ending at `height`
    /// (`-1` for the tip).
    ///
    /// # Errors
    ///
    /// Any failure from [`rpc_call`](Self::rpc_call).
    pub async fn network_hashps(&self, nblocks: i64, height: i64) -> Result<Value, UpstreamError> {
        self.rpc_call("getnetworkhashps", vec![json!(nblocks), json!(height)]).await
    }
}
