//! Shared type definitions.
//!
//! - [`JsonRpcRequest`], [`JsonRpcResponse`], [`JsonRpcError`]: the full node's JSON-RPC 1.0
//!   envelope
//! - [`Network`]: the chain the gateway is configured for
//! - [`CallerTier`]: which bulk-size limit applies to a request

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{fmt, str::FromStr};

/// JSON-RPC protocol version spoken by the full node.
pub const JSONRPC_VERSION: &str = "1.0";

/// Request envelope posted to the full node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: String,
    pub method: String,
    pub params: Vec<Value>,
}

impl JsonRpcRequest {
    /// Builds a request whose id is the method name, as the node's own CLI does.
    #[must_use]
    pub fn new(method: &str, params: Vec<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: method.to_string(),
            method: method.to_string(),
            params,
        }
    }
}

/// Response envelope returned by the full node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<JsonRpcError>,
    #[serde(default)]
    pub id: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

/// Chain the gateway serves. Addresses from another chain are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Testnet,
    Regtest,
}

impl Network {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
            Self::Regtest => "regtest",
        }
    }

    /// Cash address prefix used on this network.
    #[must_use]
    pub fn cash_address_prefix(&self) -> &'static str {
        match self {
            Self::Mainnet => "bitcoincash",
            Self::Testnet => "bchtest",
            Self::Regtest => "bchreg",
        }
    }

    /// Detects the network of a prefixed cash or SLP address.
    ///
    /// Returns `None` for unprefixed or unknown addresses.
    #[must_use]
    pub fn from_address(address: &str) -> Option<Self> {
        let (prefix, _) = address.split_once(':')?;
        match prefix.to_ascii_lowercase().as_str() {
            "bitcoincash" | "simpleledger" => Some(Self::Mainnet),
            "bchtest" | "slptest" => Some(Self::Testnet),
            "bchreg" | "slpreg" => Some(Self::Regtest),
            _ => None,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Self::Mainnet),
            "testnet" => Ok(Self::Testnet),
            "regtest" => Ok(Self::Regtest),
            other => Err(format!("unknown network: {other}")),
        }
    }
}

/// Tier of the calling client, selecting the bulk array limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CallerTier {
    #[default]
    Freemium,
    Pro,
}

impl CallerTier {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Freemium => "freemium",
            Self::Pro => "pro",
        }
    }
}
