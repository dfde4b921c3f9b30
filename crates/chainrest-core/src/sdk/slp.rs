use async_trait::async_trait;
use std::sync::Arc;

use crate::{
    cache::RawTransactionSource,
    sdk::SlpValidator,
    upstream::UpstreamError,
};

/// `OP_RETURN` followed by a 4-byte push of the SLP lokad id `SLP\0`.
const SLP_LOKAD_SCRIPT: &str = "6a04534c5000";

/// Same, with the push written as `OP_PUSHDATA1 0x04`.
const SLP_LOKAD_SCRIPT_PUSHDATA1: &str = "6a4c04534c5000";

/// `true` if a serialized transaction carries the SLP lokad id in an `OP_RETURN` output.
#[must_use]
pub fn has_slp_lokad_id(raw_hex: &str) -> bool {
    let hex = raw_hex.to_ascii_lowercase();
    hex.contains(SLP_LOKAD_SCRIPT) || hex.contains(SLP_LOKAD_SCRIPT_PUSHDATA1)
}

/// Rejects transactions without an SLP marker before asking the full validator.
///
/// The raw transaction comes from `source`, which in production reads through the
/// persistent raw transaction cache.
pub struct PrecheckedSlpValidator {
    source: Arc<dyn RawTransactionSource>,
    inner: Arc<dyn SlpValidator>,
}

impl PrecheckedSlpValidator {
    pub fn new(source: Arc<dyn RawTransactionSource>, inner: Arc<dyn SlpValidator>) -> Self {
        Self { source, inner }
    }
}

#[async_trait]
impl SlpValidator for PrecheckedSlpValidator {
    async fn is_valid_slp_txid(&self, txid: &str) -> Result<bool, UpstreamError> {
        let raw = self.source.raw_transaction(txid).await?;
        if !has_slp_lokad_id(&raw) {
            tracing::debug!(txid, "transaction has no SLP marker");
            return Ok(false);
        }
        self.inner.is_valid_slp_txid(txid).await
    }
}
