//! # Metrics
//!
//! Prometheus counters and histograms recorded through the `metrics` facade.
//!
//! | Metric | Labels | Recorded by |
//! |--------|--------|-------------|
//! | `chainrest_upstream_requests_total` | `service`, `outcome` | every upstream call |
//! | `chainrest_upstream_request_duration_seconds` | `service` | every upstream call |
//! | `chainrest_fan_out_batch_size` | `route` | bulk routes |
//! | `chainrest_fan_out_duration_seconds` | `route` | bulk routes |
//! | `chainrest_raw_tx_cache_total` | `result` | raw transaction fetcher |
//! | `chainrest_failure_responses_total` | `status` | error rendering |
//! | `chainrest_rate_limit_rejected_total` | | rate limit middleware |
//!
//! The recorder is installed globally once per process. If another recorder already owns the
//! global slot, a detached recorder is used so rendering still works.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::{sync::OnceLock, time::Duration};

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn init_prometheus_recorder() -> PrometheusHandle {
    PROMETHEUS_HANDLE
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => handle,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "failed to install global prometheus recorder, using detached recorder"
                );
                PrometheusBuilder::new().build_recorder().handle()
            }
        })
        .clone()
}

/// Outcome label of an upstream call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamOutcome {
    Success,
    Failure,
}

impl UpstreamOutcome {
    fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }
}

/// Result label of a raw transaction cache lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheLookup {
    Hit,
    Miss,
    ReadError,
    WriteError,
}

impl CacheLookup {
    fn as_str(self) -> &'static str {
        match self {
            Self::Hit => "hit",
            Self::Miss => "miss",
            Self::ReadError => "read_error",
            Self::WriteError => "write_error",
        }
    }
}

/// Counts a failed route response by status.
///
/// Free-standing so response rendering can record without holding a collector; the counter
/// lands in whichever recorder is installed.
pub fn record_failure_response(status: u16) {
    counter!("chainrest_failure_responses_total", "status" => status.to_string()).increment(1);
}

pub struct MetricsCollector {
    prometheus_handle: PrometheusHandle,
}

impl MetricsCollector {
    #[must_use]
    pub fn new() -> Self {
        Self { prometheus_handle: init_prometheus_recorder() }
    }

    pub fn record_upstream_request(
        &self,
        service: &'static str,
        outcome: UpstreamOutcome,
        elapsed: Duration,
    ) {
        counter!(
            "chainrest_upstream_requests_total",
            "service" => service,
            "outcome" => outcome.as_str()
        )
        .increment(1);
        histogram!("chainrest_upstream_request_duration_seconds", "service" => service)
            .record(elapsed.as_secs_f64());
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn record_fan_out(&self, route: &'static str, batch_size: usize, elapsed: Duration) {
        histogram!("chainrest_fan_out_batch_size", "route" => route).record(batch_size as f64);
        histogram!("chainrest_fan_out_duration_seconds", "route" => route)
            .record(elapsed.as_secs_f64());
    }

    pub fn record_cache_lookup(&self, lookup: CacheLookup) {
        counter!("chainrest_raw_tx_cache_total", "result" => lookup.as_str()).increment(1);
    }

    pub fn record_rate_limited(&self) {
        counter!("chainrest_rate_limit_rejected_total").increment(1);
    }

    /// Prometheus text exposition of everything recorded so far.
    #[must_use]
    pub fn get_prometheus_metrics(&self) -> String {
        self.prometheus_handle.render()
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}
