use reqwest::{Client, ClientBuilder, RequestBuilder};
use serde::Serialize;
use serde_json::Value;
use std::{sync::Arc, time::Duration, time::Instant};

use crate::{
    metrics::{MetricsCollector, UpstreamOutcome},
    upstream::errors::{ResponseBody, UpstreamError},
};

/// Longest non-JSON error body kept in an [`UpstreamError::Http`].
const MAX_TEXT_BODY_CHARS: usize = 1024;

/// Shared HTTP client for every upstream.
///
/// One request per call, no retries: a failed call is surfaced to the route immediately and
/// the HTTP caller decides whether to retry.
pub struct HttpClient {
    client: Client,
    metrics: Option<Arc<MetricsCollector>>,
}

impl HttpClient {
    /// Creates a client applying `timeout` to every request.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reqwest client fails to build.
    pub fn new(timeout: Duration) -> Result<Self, UpstreamError> {
        let client = ClientBuilder::new()
            .pool_idle_timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(32)
            .connect_timeout(timeout.min(Duration::from_secs(5)))
            .timeout(timeout)
            .use_rustls_tls()
            .user_agent(concat!("chainrest/", env!("CARGO_PKG_VERSION")))
            .tcp_keepalive(Duration::from_secs(30))
            .tcp_nodelay(true)
            .build()
            .map_err(|e| {
                tracing::error!(error = %e, "failed to build http client");
                UpstreamError::Transport(format!("HTTP client build failed: {e}"))
            })?;

        Ok(Self { client, metrics: None })
    }

    /// Records request counts and latency into `metrics`.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// `GET url`, decoding a JSON body.
    ///
    /// # Errors
    ///
    /// - [`UpstreamError::Http`] for non-success status codes
    /// - [`UpstreamError::InvalidResponse`] when a success body is not JSON
    /// - any transport variant from [`UpstreamError::from_transport`]
    pub async fn get_json(&self, service: &'static str, url: &str) -> Result<Value, UpstreamError> {
        self.execute(service, url, self.client.get(url)).await
    }

    /// `POST url` with a JSON body, optionally with basic auth.
    ///
    /// # Errors
    ///
    /// Same as [`get_json`](Self::get_json).
    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        service: &'static str,
        url: &str,
        body: &B,
        basic_auth: Option<(&str, &str)>,
    ) -> Result<Value, UpstreamError> {
        let mut request = self.client.post(url).json(body);
        if let Some((user, password)) = basic_auth {
            request = request.basic_auth(user, Some(password));
        }
        self.execute(service, url, request).await
    }

    async fn execute(
        &self,
        service: &'static str,
        url: &str,
        request: RequestBuilder,
    ) -> Result<Value, UpstreamError> {
        let started = Instant::now();
        let result = Self::send(request).await;

        if let Some(metrics) = &self.metrics {
            let outcome =
                if result.is_ok() { UpstreamOutcome::Success } else { UpstreamOutcome::Failure };
            metrics.record_upstream_request(service, outcome, started.elapsed());
        }

        match &result {
            Ok(_) => tracing::trace!(service, url, "upstream request completed"),
            Err(e) => tracing::debug!(
                service,
                url,
                error_kind = e.as_str(),
                error = %e,
                "upstream request failed"
            ),
        }

        result
    }

    async fn send(request: RequestBuilder) -> Result<Value, UpstreamError> {
        let response = request.send().await.map_err(|e| UpstreamError::from_transport(&e))?;
        let status = response.status();

        let text = response.text().await.map_err(|e| UpstreamError::from_transport(&e))?;

        if !status.is_success() {
            let body = match ResponseBody::from_text(text) {
                ResponseBody::Text(t) if t.chars().count() > MAX_TEXT_BODY_CHARS => {
                    let truncated: String = t.chars().take(MAX_TEXT_BODY_CHARS).collect();
                    ResponseBody::Text(format!("{truncated}... (truncated)"))
                }
                body => body,
            };
            return Err(UpstreamError::Http { status: status.as_u16(), body });
        }

        serde_json::from_str(&text).map_err(|e| {
            UpstreamError::InvalidResponse(format!("response is not valid JSON: {e}"))
        })
    }
}
