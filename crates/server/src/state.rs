use chainrest_core::{
    cache::{CachedRawTransactions, RawTransactionSource, RawTxCache},
    config::AppConfig,
    metrics::MetricsCollector,
    middleware::{rate_limit_message, RateLimiter, TierResolver},
    pipeline::{ArrayGuard, FanOutExecutor},
    sdk::{AddressCodec, PrecheckedSlpValidator, RestSdk, SlpValidator, TokenLedger},
    tokens::TokenDirectory,
    types::Network,
    upstream::{BitDbClient, HttpClient, UpstreamClient, UpstreamError},
};
use std::{sync::Arc, time::Instant};

/// Everything the route handlers share.
///
/// Built once in `main`. The SDK capabilities are trait objects so tests can swap in fakes
/// with the `with_*` methods.
pub struct AppState {
    pub network: Network,
    pub upstream: Arc<UpstreamClient>,
    pub tokens: Arc<TokenDirectory>,
    pub address_codec: Arc<dyn AddressCodec>,
    pub token_ledger: Arc<dyn TokenLedger>,
    pub slp_validator: Arc<dyn SlpValidator>,
    pub array_guard: ArrayGuard,
    pub fan_out: FanOutExecutor,
    pub metrics: Arc<MetricsCollector>,
    pub rate_limiter: Option<Arc<RateLimiter>>,
    pub rate_limit_message: String,
    pub tier_resolver: TierResolver,
    pub started_at: Instant,
}

impl AppState {
    /// Wires the upstream clients, SDK backend and raw transaction cache from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(
        config: &AppConfig,
        raw_tx_cache: Arc<dyn RawTxCache>,
    ) -> Result<Self, UpstreamError> {
        let metrics = Arc::new(MetricsCollector::new());
        let http =
            Arc::new(HttpClient::new(config.upstream_timeout())?.with_metrics(metrics.clone()));

        let upstream = Arc::new(UpstreamClient::new(http.clone(), &config.upstreams));
        let bitdb = Arc::new(BitDbClient::new(http.clone(), config.upstreams.bitdb_url.clone()));
        let sdk = Arc::new(RestSdk::new(http, config.upstreams.sdk_rest_url.clone()));

        let raw_transactions: Arc<dyn RawTransactionSource> = Arc::new(
            CachedRawTransactions::new(upstream.clone(), raw_tx_cache, Some(metrics.clone())),
        );
        let slp_validator = Arc::new(PrecheckedSlpValidator::new(raw_transactions, sdk.clone()));

        let rate_limiter = config
            .rate_limit
            .enabled
            .then(|| Arc::new(RateLimiter::from_config(&config.rate_limit)));

        Ok(Self {
            network: config.network,
            upstream,
            tokens: Arc::new(TokenDirectory::new(bitdb)),
            address_codec: sdk.clone(),
            token_ledger: sdk,
            slp_validator,
            array_guard: ArrayGuard::from_config(&config.limits),
            fan_out: FanOutExecutor::new(Some(metrics.clone())),
            metrics,
            rate_limiter,
            rate_limit_message: rate_limit_message(config.rate_limit.refill_per_second),
            tier_resolver: TierResolver::new(config.limits.pro_api_keys.clone()),
            started_at: Instant::now(),
        })
    }

    #[must_use]
    pub fn with_address_codec(mut self, codec: Arc<dyn AddressCodec>) -> Self {
        self.address_codec = codec;
        self
    }

    #[must_use]
    pub fn with_token_ledger(mut self, ledger: Arc<dyn TokenLedger>) -> Self {
        self.token_ledger = ledger;
        self
    }

    #[must_use]
    pub fn with_slp_validator(mut self, validator: Arc<dyn SlpValidator>) -> Self {
        self.slp_validator = validator;
        self
    }
}
