use async_trait::async_trait;
use std::sync::Arc;

use crate::{
    cache::raw_tx::RawTxCache,
    metrics::{CacheLookup, MetricsCollector},
    upstream::{UpstreamClient, UpstreamError},
};

/// Source of serialized transactions.
#[async_trait]
pub trait RawTransactionSource: Send + Sync {
    async fn raw_transaction(&self, txid: &str) -> Result<String, UpstreamError>;
}

/// Read-through fetcher: cache first, full node on a miss, then write back.
///
/// The cache never fails a lookup. A read error is treated as a miss and a write error is
/// logged, so a broken cache degrades to plain node lookups.
pub struct CachedRawTransactions {
    client: Arc<UpstreamClient>,
    cache: Arc<dyn RawTxCache>,
    metrics: Option<Arc<MetricsCollector>>,
}

impl CachedRawTransactions {
    pub fn new(
        client: Arc<UpstreamClient>,
        cache: Arc<dyn RawTxCache>,
        metrics: Option<Arc<MetricsCollector>>,
    ) -> Self {
        Self { client, cache, metrics }
    }

    fn record(&self, lookup: CacheLookup) {
        if let Some(metrics) = &self.metrics {
            metrics.record_cache_lookup(lookup);
        }
    }
}

#[async_trait]
impl RawTransactionSource for CachedRawTransactions {
    async fn raw_transaction(&self, txid: &str) -> Result<String, UpstreamError> {
        match self.cache.get(txid).await {
            Ok(Some(raw)) => {
                self.record(CacheLookup::Hit);
                tracing::trace!(txid, "raw transaction cache hit");
                return Ok(raw);
            }
            Ok(None) => self.record(CacheLookup::Miss),
            Err(e) => {
                self.record(CacheLookup::ReadError);
                tracing::warn!(txid, error = %e, "raw transaction cache read failed");
            }
        }

        let raw = self.client.raw_transaction(txid).await?;

        if let Err(e) = self.cache.put(txid, &raw).await {
            self.record(CacheLookup::WriteError);
            tracing::warn!(txid, error = %e, "raw transaction cache write failed");
        }

        Ok(raw)
    }
}
