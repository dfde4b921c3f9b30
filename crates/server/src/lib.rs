//! HTTP surface of the chainrest gateway.
//!
//! [`router::create_router`] assembles the axum router over an [`state::AppState`]; the
//! `chainrest` binary adds transport limits and serves it.

pub mod middleware;
pub mod router;
pub mod routes;
pub mod state;
