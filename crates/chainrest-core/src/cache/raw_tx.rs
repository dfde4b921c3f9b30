use async_trait::async_trait;
use dashmap::DashMap;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};
use std::str::FromStr;

use crate::cache::CacheError;

/// Persistent txid → raw transaction hex store.
///
/// Entries are never evicted or invalidated: a transaction's serialization never changes,
/// so concurrent writers of the same key store the same value and the last write wins.
#[async_trait]
pub trait RawTxCache: Send + Sync {
    async fn get(&self, txid: &str) -> Result<Option<String>, CacheError>;

    async fn put(&self, txid: &str, raw_hex: &str) -> Result<(), CacheError>;
}

/// `SQLite`-backed cache, opened once at startup and kept for the process lifetime.
pub struct SqliteRawTxCache {
    pool: Pool<Sqlite>,
}

impl SqliteRawTxCache {
    /// Opens (creating if needed) the database at `database_url` and ensures the schema.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Database`] if the database cannot be opened or migrated.
    pub async fn new(database_url: &str) -> Result<Self, CacheError> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        // Every connection to an in-memory database is a separate database, so pin one.
        let pool = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new().max_connections(8).connect_with(options).await?
        };

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS raw_transactions (
                txid TEXT PRIMARY KEY NOT NULL,
                raw_hex TEXT NOT NULL
            )",
        )
        .execute(&pool)
        .await?;

        tracing::info!(database_url, "raw transaction cache opened");

        Ok(Self { pool })
    }

}

#[async_trait]
impl RawTxCache for SqliteRawTxCache {
    async fn get(&self, txid: &str) -> Result<Option<String>, CacheError> {
        let row = sqlx::query("SELECT raw_hex FROM raw_transactions WHERE txid = ?")
            .bind(txid)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(row.try_get("raw_hex")?)),
            None => Ok(None),
        }
    }

    async fn put(&self, txid: &str, raw_hex: &str) -> Result<(), CacheError> {
        sqlx::query("INSERT OR REPLACE INTO raw_transactions (txid, raw_hex) VALUES (?, ?)")
            .bind(txid)
            .bind(raw_hex)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

/// Process-local cache used when persistence is disabled, and in tests.
#[derive(Default)]
pub struct MemoryRawTxCache {
    entries: DashMap<String, String>,
}

impl MemoryRawTxCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RawTxCache for MemoryRawTxCache {
    async fn get(&self, txid: &str) -> Result<Option<String>, CacheError> {
        Ok(self.entries.get(txid).map(|entry| entry.value().clone()))
    }

    async fn put(&self, txid: &str, raw_hex: &str) -> Result<(), CacheError> {
        self.entries.insert(txid.to_string(), raw_hex.to_string());
        Ok(())
    }
}
