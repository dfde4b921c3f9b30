use dashmap::DashMap;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use crate::config::RateLimitConfig;

/// Message returned to throttled clients.
#[must_use]
pub fn rate_limit_message(refill_per_second: u32) -> String {
    format!(
        "Too many requests. Limits are {} requests per minute.",
        u64::from(refill_per_second) * 60
    )
}

/// Per-client token bucket limiter.
///
/// Each client key gets `max_tokens` tokens refilled at `refill_per_second`. The number of
/// tracked clients is capped; new clients beyond the cap are refused rather than growing the
/// map without bound.
pub struct RateLimiter {
    buckets: Arc<DashMap<String, Bucket>>,
    max_tokens: u32,
    refill_per_second: u32,
    bucket_ttl: Duration,
    max_clients: usize,
}

#[derive(Debug, Clone)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
    last_seen: Instant,
}

impl Bucket {
    fn full(max_tokens: u32, now: Instant) -> Self {
        Self { tokens: f64::from(max_tokens), last_refill: now, last_seen: now }
    }

    fn try_take(&mut self, now: Instant, max_tokens: u32, refill_per_second: u32) -> bool {
        self.last_seen = now;

        let refill = now.duration_since(self.last_refill).as_secs_f64() *
            f64::from(refill_per_second);
        if refill > 0.0 {
            self.tokens = (self.tokens + refill).min(f64::from(max_tokens));
            self.last_refill = now;
        }

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

impl RateLimiter {
    const DEFAULT_MAX_CLIENTS: usize = 100_000;

    #[must_use]
    pub fn new(max_tokens: u32, refill_per_second: u32) -> Self {
        Self::with_max_clients(max_tokens, refill_per_second, Self::DEFAULT_MAX_CLIENTS)
    }

    #[must_use]
    pub fn with_max_clients(max_tokens: u32, refill_per_second: u32, max_clients: usize) -> Self {
        Self {
            buckets: Arc::new(DashMap::new()),
            max_tokens,
            refill_per_second,
            bucket_ttl: Duration::from_secs(300),
            max_clients,
        }
    }

    #[must_use]
    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.max_tokens, config.refill_per_second)
    }

    /// Spawns a task dropping buckets of clients idle for longer than the bucket TTL.
    pub fn start_cleanup_task(&self) {
        let buckets = Arc::clone(&self.buckets);
        let ttl = self.bucket_ttl;

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(ttl);
            loop {
                interval.tick().await;
                let now = Instant::now();
                buckets.retain(|_, bucket| now.duration_since(bucket.last_seen) < ttl);
            }
        });
    }

    /// Takes one token for `client`. Returns `false` when the client is throttled.
    #[must_use]
    pub fn check(&self, client: &str) -> bool {
        let now = Instant::now();

        if let Some(mut bucket) = self.buckets.get_mut(client) {
            return bucket.try_take(now, self.max_tokens, self.refill_per_second);
        }

        if self.buckets.len() >= self.max_clients {
            tracing::warn!(clients = self.buckets.len(), "rate limiter at client capacity");
            return false;
        }

        self.buckets
            .entry(client.to_string())
            .or_insert_with(|| Bucket::full(self.max_tokens, now))
            .try_take(now, self.max_tokens, self.refill_per_second)
    }
}
