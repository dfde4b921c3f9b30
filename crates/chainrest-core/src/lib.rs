//! # Chainrest Core
//!
//! Core library for the chainrest blockchain REST gateway.
//!
//! This crate provides the building blocks every route handler is assembled from:
//!
//! - **[`upstream`]**: HTTP clients for the full-node JSON-RPC service, the Insight-style block
//!   indexer and the `BitDB` query service, returning typed [`upstream::UpstreamError`] failures.
//!
//! - **[`pipeline`]**: The bulk request pipeline. [`pipeline::ArrayGuard`] bounds bulk payloads,
//!   [`pipeline::fan_out`] runs one work unit per item concurrently while preserving order, and
//!   [`pipeline::decode_error`] normalizes upstream failures into HTTP status/message pairs.
//!
//! - **[`cache`]**: The persistent raw transaction cache and the read-through fetcher built on it.
//!
//! - **[`sdk`]**: Capability traits for address conversion, SLP balances and SLP validation, with a
//!   REST-backed production implementation.
//!
//! - **[`tokens`]**: Formatting of SLP genesis records returned by `BitDB`.
//!
//! - **[`middleware`]**: Per-client token bucket rate limiting and caller tier resolution.
//!
//! - **[`metrics`]**: Prometheus metrics collection.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        RouteHandler                          │
//! │   ┌────────────┐   ┌──────────────┐   ┌──────────────────┐   │
//! │   │ ArrayGuard │ → │ FanOut       │ → │ ErrorDecoder     │   │
//! │   └────────────┘   └──────┬───────┘   └──────────────────┘   │
//! │                           │                                  │
//! │             ┌─────────────▼─────────────┐                    │
//! │             │ UpstreamClient / BitDb    │ ← RawTxCache       │
//! │             └───────────────────────────┘                    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The HTTP surface itself lives in the `server` crate.

pub mod cache;
pub mod config;
pub mod metrics;
pub mod middleware;
pub mod pipeline;
pub mod sdk;
pub mod tokens;
pub mod types;
pub mod upstream;
