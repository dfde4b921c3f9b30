use anyhow::Result;
use axum::{serve, Router};
use chainrest_core::{cache::open_raw_tx_cache, config::AppConfig};
use server::{router::create_router, state::AppState};
use std::{net::SocketAddr, sync::Arc};
use tokio::signal;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::{compression::CompressionLayer, limit::RequestBodyLimitLayer};
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// `RUST_LOG` wins over the configured level; `debug` and `trace` are widened to every
/// crate of the workspace.
fn init_logging(config: &AppConfig) {
    let workspace_filter =
        |level: &str| format!("warn,chainrest_core={level},server={level},chainrest={level}");

    let filter = match std::env::var("RUST_LOG") {
        Ok(value) if value == "debug" || value == "trace" => {
            EnvFilter::new(workspace_filter(&value))
        }
        Ok(_) => EnvFilter::try_from_env("RUST_LOG")
            .unwrap_or_else(|_| EnvFilter::new(workspace_filter(&config.logging.level))),
        Err(_) => EnvFilter::new(workspace_filter(&config.logging.level)),
    };

    let registry = tracing_subscriber::registry().with(filter);

    if config.logging.format.as_str() == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .pretty()
            .with_file(true)
            .with_line_number(true)
            .with_target(false);
        registry.with(fmt_layer).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config =
        AppConfig::load().map_err(|e| anyhow::anyhow!("Failed to load configuration: {e}"))?;
    config.validate().map_err(|e| anyhow::anyhow!("Configuration validation failed: {e}"))?;

    init_logging(&config);
    info!(environment = %config.environment, network = %config.network, "Starting chainrest");
    debug!(
        rpc = %config.upstreams.rpc_base_url,
        indexer = %config.upstreams.indexer_base_url,
        bitdb = %config.upstreams.bitdb_url,
        timeout_seconds = config.upstreams.timeout_seconds,
        "Upstreams configured"
    );

    let raw_tx_cache = open_raw_tx_cache(&config.raw_tx_cache)
        .await
        .map_err(|e| anyhow::anyhow!("Raw transaction cache initialization failed: {e}"))?;

    let state = Arc::new(
        AppState::from_config(&config, raw_tx_cache)
            .map_err(|e| anyhow::anyhow!("Upstream client initialization failed: {e}"))?,
    );
    if let Some(limiter) = &state.rate_limiter {
        limiter.start_cleanup_task();
    }

    let app = create_app(state, &config);
    let addr = config.socket_addr().map_err(|e| anyhow::anyhow!(e))?;
    info!(address = %addr, "chainrest listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    if let Err(e) = serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!(error = %e, "Server error occurred");
    }

    info!("Server shutdown complete");
    Ok(())
}

fn create_app(state: Arc<AppState>, config: &AppConfig) -> Router {
    create_router(state)
        .layer(ConcurrencyLimitLayer::new(config.server.max_concurrent_requests))
        .layer(RequestBodyLimitLayer::new(config.server.request_body_limit_bytes))
        .layer(CompressionLayer::new())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install signal handler");
                () = std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received, draining in-flight requests");
}
