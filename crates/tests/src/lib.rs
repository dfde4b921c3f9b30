//! Integration tests for the chainrest gateway.
//!
//! Routers are built with `server::router::create_router` and driven in-process with
//! `tower::ServiceExt::oneshot`; every upstream is a mockito server.
//!
//! - `block_route_tests`: single and bulk block lookups, array limits, failure rendering
//! - `mining_route_tests`: mining info and network hash rate
//! - `slp_route_tests`: token list, balances, address conversion, txid validation
//! - `middleware_tests`: caller tier, rate limiting, request ids, health and metrics
//!
//! ```bash
//! cargo test --package tests
//! ```

#[cfg(test)]
mod block_route_tests;



#[cfg(test)]
mod middleware_tests;

/// Mock upstreams, fake SDK capabilities and request helpers
#[allow(clippy::unwrap_used, clippy::expect_used)]
pub mod mock_infrastructure;
