//! Concurrent execution of per-item work units.
//!
//! Every unit is created up front in input order and polled concurrently with
//! [`futures::future::join_all`]. There is no batching or backpressure; bulk inputs are
//! bounded by the [`ArrayGuard`](super::ArrayGuard) before they get here.
//!
//! # Failure semantics
//!
//! All units run to completion even when one fails. Results of the remaining units are then
//! discarded and the failure with the **lowest input index** is returned, so the reported
//! error does not depend on which upstream answered first.

use futures::future::join_all;
use std::{future::Future, sync::Arc, time::Instant};

use crate::metrics::MetricsCollector;

/// Runs `make_work_unit` for every item concurrently.
///
/// Returns the results in input order, or the lowest-index failure.
///
/// # Errors
///
/// Returns the error of the first failed unit in input order.
pub async fn fan_out<I, T, R, E, F, Fut>(items: I, make_work_unit: F) -> Result<Vec<R>, E>
where
    I: IntoIterator<Item = T>,
    F: FnMut(T) -> Fut,
    Fut: Future<Output = Result<R, E>>,
{
    let units: Vec<Fut> = items.into_iter().map(make_work_unit).collect();
    join_all(units).await.into_iter().collect()
}

/// [`fan_out`] with tracing and batch metrics, labelled by route.
#[derive(Clone, Default)]
pub struct FanOutExecutor {
    metrics: Option<Arc<MetricsCollector>>,
}

impl FanOutExecutor {
    #[must_use]
    pub fn new(metrics: Option<Arc<MetricsCollector>>) -> Self {
        Self { metrics }
    }

    /// # Errors
    ///
    /// Returns the error of the first failed unit in input order.
    pub async fn run<T, R, E, F, Fut>(
        &self,
        route: &'static str,
        items: Vec<T>,
        make_work_unit: F,
    ) -> Result<Vec<R>, E>
    where
        F: FnMut(T) -> Fut,
        Fut: Future<Output = Result<R, E>>,
    {
        let batch_size = items.len();
        let started = Instant::now();

        let result = fan_out(items, make_work_unit).await;

        let elapsed = started.elapsed();
        if let Some(metrics) = &self.metrics {
            metrics.record_fan_out(route, batch_size, elapsed);
        }
        tracing::debug!(
            route,
            batch_size,
            elapsed_ms = elapsed.as_millis(),
            success = result.is_ok(),
            "fan-out completed"
        );

        result
    }
}
