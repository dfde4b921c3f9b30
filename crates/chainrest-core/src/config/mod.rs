//! Application configuration with layered loading.
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded in this order (later overrides earlier):
//!
//! 1. **Compiled defaults**: `set_default` calls in [`AppConfig::from_sources`]
//! 2. **Config file**: TOML file specified by `CHAINREST_CONFIG` env var
//! 3. **Environment variables**: `CHAINREST__SECTION__FIELD` overrides any field
//! 4. **Legacy environment variables**: `RPC_BASEURL`, `RPC_USERNAME`, `RPC_PASSWORD`,
//!    `BITCOINCOM_BASEURL`, `BITDB_URL`, `SDK_REST_URL` and `NETWORK`, as deployed
//!    gateways already export them
//!
//! # Configuration Sections
//!
//! - [`ServerConfig`]: bind address, body limit, concurrency
//! - [`UpstreamsConfig`]: full node, indexer, `BitDB` and SDK endpoints
//! - [`LimitsConfig`]: per-tier bulk array limits
//! - [`RateLimitConfig`]: token bucket for the SLP routes
//! - [`RawTxCacheConfig`]: persistent raw transaction cache
//! - [`LoggingConfig`]: log level and format
//!
//! Everything is read once at startup. There is no hot reload.
//!
//! # Example
//!
//! ```toml
//! network = "mainnet"
//!
//! [server]
//! bind_port = 3000
//!
//! [upstreams]
//! rpc_base_url = "http://127.0.0.1:8332/"
//! rpc_username = "rpcuser"
//! rpc_password = "rpcpass"
//! indexer_base_url = "https://explorer.example.com/api/"
//! bitdb_url = "https://bitdb.example.com/"
//!
//! [limits]
//! freemium_array_size = 20
//! pro_array_size = 50
//! ```

use crate::types::Network;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};

/// HTTP server configuration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// IP address to bind the server to. Defaults to `127.0.0.1`.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Port number to listen on. Defaults to `3000`.
    pub bind_port: u16,

    /// Maximum number of requests served concurrently. Defaults to `256`.
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,

    /// Largest accepted request body in bytes. Defaults to 1 MiB.
    #[serde(default = "default_request_body_limit_bytes")]
    pub request_body_limit_bytes: usize,
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_max_concurrent_requests() -> usize {
    256
}

fn default_request_body_limit_bytes() -> usize {
    1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            bind_port: 3000,
            max_concurrent_requests: default_max_concurrent_requests(),
            request_body_limit_bytes: default_request_body_limit_bytes(),
        }
    }
}

/// Endpoints of every upstream the gateway talks to.
///
/// Missing fields fall back to local development endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamsConfig {
    /// Full node JSON-RPC endpoint.
    pub rpc_base_url: String,

    #[serde(default)]
    pub rpc_username: String,

    #[serde(default)]
    pub rpc_password: String,

    /// Insight-style indexer; block lookups go to `{indexer_base_url}block/{hash}`.
    pub indexer_base_url: String,

    /// `BitDB` query service; queries go to `{bitdb_url}q/{base64}`.
    pub bitdb_url: String,

    /// REST backend implementing the address and SLP capabilities.
    pub sdk_rest_url: String,

    /// Per-call timeout applied to every upstream request. Defaults to `15`.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_timeout_seconds() -> u64 {
    15
}

impl Default for UpstreamsConfig {
    fn default() -> Self {
        Self {
            rpc_base_url: "http://127.0.0.1:8332/".to_string(),
            rpc_username: String::new(),
            rpc_password: String::new(),
            indexer_base_url: "http://127.0.0.1:3001/api/".to_string(),
            bitdb_url: "http://127.0.0.1:3002/".to_string(),
            sdk_rest_url: "http://127.0.0.1:3003/v2/".to_string(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// Bulk request limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_array_size")]
    pub freemium_array_size: usize,

    #[serde(default = "default_array_size")]
    pub pro_array_size: usize,

    /// API keys granting the pro limit, sent in the `x-api-key` header.
    #[serde(default)]
    pub pro_api_keys: Vec<String>,

    /// Status returned for oversized arrays: `429` (compatible) or `413`.
    #[serde(default = "default_oversize_status")]
    pub oversize_status: u16,
}

fn default_array_size() -> usize {
    20
}

fn default_oversize_status() -> u16 {
    429
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            freemium_array_size: default_array_size(),
            pro_array_size: default_array_size(),
            pro_api_keys: Vec::new(),
            oversize_status: default_oversize_status(),
        }
    }
}

/// Token bucket applied per client IP to the SLP routes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_refill_per_second")]
    pub refill_per_second: u32,
}

fn default_true() -> bool {
    true
}

fn default_max_tokens() -> u32 {
    60
}

fn default_refill_per_second() -> u32 {
    1
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_tokens: default_max_tokens(),
            refill_per_second: default_refill_per_second(),
        }
    }
}

/// Persistent raw transaction cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTxCacheConfig {
    /// When disabled an in-memory map is used instead of `SQLite`.
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_database_url")]
    pub database_url: String,
}

fn default_database_url() -> String {
    "sqlite://slp-tx-db.sqlite".to_string()
}

impl Default for RawTxCacheConfig {
    fn default() -> Self {
        Self { enabled: true, database_url: default_database_url() }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `pretty` or `json`.
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), format: default_log_format() }
    }
}

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_environment")]
    pub environment: String,

    #[serde(default = "default_network")]
    pub network: Network,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub upstreams: UpstreamsConfig,

    #[serde(default)]
    pub limits: LimitsConfig,

    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    #[serde(default)]
    pub raw_tx_cache: RawTxCacheConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_network() -> Network {
    Network::Mainnet
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            network: default_network(),
            server: ServerConfig::default(),
            upstreams: UpstreamsConfig::default(),
            limits: LimitsConfig::default(),
            rate_limit: RateLimitConfig::default(),
            raw_tx_cache: RawTxCacheConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Legacy variable names and the keys they override.
const LEGACY_ENV_KEYS: &[(&str, &str)] = &[
    ("RPC_BASEURL", "upstreams.rpc_base_url"),
    ("RPC_USERNAME", "upstreams.rpc_username"),
    ("RPC_PASSWORD", "upstreams.rpc_password"),
    ("BITCOINCOM_BASEURL", "upstreams.indexer_base_url"),
    ("BITDB_URL", "upstreams.bitdb_url"),
    ("SDK_REST_URL", "upstreams.sdk_rest_url"),
];

impl AppConfig {
    /// Loads configuration from a TOML file with environment variable overrides.
    ///
    /// Environment variables with the `CHAINREST__` prefix can override any value, using `__`
    /// between nested fields (e.g. `CHAINREST__SERVER__BIND_PORT=8080`).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, parsed, or deserialized.
    pub fn from_file<P: AsRef<Path>>(config_path: P) -> Result<Self, ConfigError> {
        Self::from_sources(config_path, |key| std::env::var(key).ok())
    }

    /// Same as [`from_file`](Self::from_file) with the legacy variables read through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, parsed, or deserialized.
    pub fn from_sources<P, F>(config_path: P, lookup: F) -> Result<Self, ConfigError>
    where
        P: AsRef<Path>,
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Config::builder()
            .set_default("environment", "development")?
            .set_default("network", "mainnet")?
            .set_default("server.bind_address", "127.0.0.1")?
            .set_default("server.bind_port", 3000)?
            .set_default("upstreams.timeout_seconds", 15)?
            .set_default("limits.freemium_array_size", 20)?
            .set_default("limits.pro_array_size", 20)?
            .set_default("limits.oversize_status", 429)?
            .set_default("rate_limit.enabled", true)?
            .set_default("raw_tx_cache.enabled", true)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .add_source(File::with_name(&config_path.as_ref().to_string_lossy()).required(false))
            .add_source(Environment::with_prefix("CHAINREST").separator("__"));

        for (var, key) in LEGACY_ENV_KEYS {
            builder = builder.set_override_option(*key, lookup(var))?;
        }
        builder =
            builder.set_override_option("network", lookup("NETWORK").map(|n| n.to_lowercase()))?;

        builder.build()?.try_deserialize()
    }

    /// Loads configuration from `config/config.toml`, or the path in `CHAINREST_CONFIG`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration cannot be loaded or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("CHAINREST_CONFIG").unwrap_or_else(|_| "config/config.toml".to_string());
        Self::from_file(&config_path)
    }

    /// Returns the parsed socket address for the HTTP server.
    ///
    /// # Errors
    ///
    /// Returns an error string if the address cannot be parsed.
    pub fn socket_addr(&self) -> Result<std::net::SocketAddr, String> {
        format!("{}:{}", self.server.bind_address, self.server.bind_port)
            .parse()
            .map_err(|_| {
                format!(
                    "Invalid socket address: {}:{}",
                    self.server.bind_address, self.server.bind_port
                )
            })
    }

    #[must_use]
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstreams.timeout_seconds)
    }

    /// Validates the configuration for correctness and consistency.
    ///
    /// # Errors
    ///
    /// Returns a descriptive error string if validation fails.
    pub fn validate(&self) -> Result<(), String> {
        let urls = [
            ("rpc_base_url", &self.upstreams.rpc_base_url),
            ("indexer_base_url", &self.upstreams.indexer_base_url),
            ("bitdb_url", &self.upstreams.bitdb_url),
            ("sdk_rest_url", &self.upstreams.sdk_rest_url),
        ];
        for (name, url) in urls {
            if url.is_empty() {
                return Err(format!("Empty upstream URL: {name}"));
            }
            if !url.starts_with("http") {
                return Err(format!("Invalid upstream URL for {name}: {url}"));
            }
        }

        if self.upstreams.timeout_seconds == 0 {
            return Err("Upstream timeout must be greater than 0".to_string());
        }

        if self.limits.freemium_array_size == 0 || self.limits.pro_array_size == 0 {
            return Err("Array size limits must be greater than 0".to_string());
        }

        if ![413, 429].contains(&self.limits.oversize_status) {
            return Err("Oversize status must be 413 or 429".to_string());
        }

        if self.rate_limit.enabled &&
            (self.rate_limit.max_tokens == 0 || self.rate_limit.refill_per_second == 0)
        {
            return Err("Rate limit tokens and refill rate must be greater than 0".to_string());
        }

        if self.server.max_concurrent_requests == 0 {
            return Err("Max concurrent requests must be greater than 0".to_string());
        }

        if self.server.bind_port == 0 {
            return Err("Bind port must be greater than 0".to_string());
        }

        if !["json", "pretty"].contains(&self.logging.format.as_str()) {
            return Err("Logging format must be 'json' or 'pretty'".to_string());
        }

        Ok(())
    }
}
