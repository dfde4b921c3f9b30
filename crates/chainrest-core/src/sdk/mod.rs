//! Address and SLP capabilities the gateway consumes but does not implement.
//!
//! Address encodings, SLP balance accounting and SLP DAG validation belong to an external
//! SDK service. Route handlers only see the traits below; `main` wires the REST-backed
//! [`RestSdk`] in and tests substitute fakes.

pub mod rest;
pub mod slp;

pub use rest::RestSdk;
pub use slp::{has_slp_lokad_id, PrecheckedSlpValidator};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{types::Network, upstream::UpstreamError};

/// One address in all three encodings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressForms {
    pub slp_address: String,
    pub cash_address: String,
    pub legacy_address: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SdkError {
    /// The SDK rejected the address as malformed.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

#[async_trait]
pub trait AddressCodec: Send + Sync {
    /// Converts any supported encoding of `address` into all encodings.
    async fn convert(&self, address: &str) -> Result<AddressForms, SdkError>;
}

#[async_trait]
pub trait TokenLedger: Send + Sync {
    /// Unspent token balance per token id, in base units as decimal strings.
    async fn token_balances(&self, slp_address: &str)
        -> Result<BTreeMap<String, String>, UpstreamError>;
}

#[async_trait]
pub trait SlpValidator: Send + Sync {
    /// `true` if `txid` is a valid SLP transaction.
    async fn is_valid_slp_txid(&self, txid: &str) -> Result<bool, UpstreamError>;
}

/// `true` if `cash_address` belongs to `network`.
///
/// Unprefixed or unrecognized addresses never match.
#[must_use]
pub fn validate_network(cash_address: &str, network: Network) -> bool {
    Network::from_address(cash_address) == Some(network)
}
