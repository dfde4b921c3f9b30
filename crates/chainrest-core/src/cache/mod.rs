//! Raw transaction caching.
//!
//! [`RawTxCache`] is the storage seam with a `SQLite` implementation for production and a
//! `DashMap` one when persistence is disabled. [`CachedRawTransactions`] layers the
//! read-through policy on top of it.

pub mod fetcher;
pub mod raw_tx;

pub use fetcher::{CachedRawTransactions, RawTransactionSource};
pub use raw_tx::{MemoryRawTxCache, RawTxCache, SqliteRawTxCache};

use crate::config::RawTxCacheConfig;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Cache unavailable: {0}")]
    Unavailable(String),
}

/// Opens the cache selected by `config`.
///
/// # Errors
///
/// Returns [`CacheError::Database`] if the `SQLite` store cannot be opened.
pub async fn open_raw_tx_cache(config: &RawTxCacheConfig) -> Result<Arc<dyn RawTxCache>, CacheError> {
    if config.enabled {
        Ok(Arc::new(SqliteRawTxCache::new(&config.database_url).await?))
    } else {
        tracing::info!("raw transaction cache persistence disabled, using in-memory map");
        Ok(Arc::new(MemoryRawTxCache::new()))
    }
}
