use async_trait::async_trait;
use chainrest_core::{
    sdk::{AddressCodec, AddressForms, SdkError, SlpValidator, TokenLedger},
    upstream::UpstreamError,
};
use std::{
    collections::{BTreeMap, HashMap, HashSet},
    sync::atomic::{AtomicUsize, Ordering},
};

/// Address codec over a fixed table; unknown addresses are invalid.
#[derive(Default)]
pub struct FakeAddressCodec {
    known: HashMap<String, AddressForms>,
}

impl FakeAddressCodec {
    /// Registers an address whose three forms share `payload` under the given prefixes.
    #[must_use]
    pub fn with_address(mut self, address: &str, cash_prefix: &str, slp_prefix: &str) -> Self {
        let payload = address.rsplit(':').next().unwrap_or(address);
        self.known.insert(
            address.to_string(),
            AddressForms {
                slp_address: format!("{slp_prefix}:{payload}"),
                cash_address: format!("{cash_prefix}:{payload}"),
                legacy_address: format!("1{payload}"),
            },
        );
        self
    }
}

#[async_trait]
impl AddressCodec for FakeAddressCodec {
    async fn convert(&self, address: &str) -> Result<AddressForms, SdkError> {
        self.known
            .get(address)
            .cloned()
            .ok_or_else(|| SdkError::InvalidAddress(address.to_string()))
    }
}

/// Token ledger over a fixed table, keyed by SLP address.
#[derive(Default)]
pub struct FakeTokenLedger {
    balances: HashMap<String, BTreeMap<String, String>>,
}

impl FakeTokenLedger {
    #[must_use]
    pub fn with_balance(mut self, slp_address: &str, token_id: &str, raw: &str) -> Self {
        self.balances
            .entry(slp_address.to_string())
            .or_default()
            .insert(token_id.to_string(), raw.to_string());
        self
    }
}

#[async_trait]
impl TokenLedger for FakeTokenLedger {
    async fn token_balances(
        &self,
        slp_address: &str,
    ) -> Result<BTreeMap<String, String>, UpstreamError> {
        Ok(self.balances.get(slp_address).cloned().unwrap_or_default())
    }
}

/// Validator accepting a fixed set of txids and counting calls.
#[derive(Default)]
pub struct FakeSlpValidator {
    valid: HashSet<String>,
    calls: AtomicUsize,
}

impl FakeSlpValidator {
    #[must_use]
    pub fn accepting(txids: &[&str]) -> Self {
        Self { valid: txids.iter().map(ToString::to_string).collect(), calls: AtomicUsize::new(0) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SlpValidator for FakeSlpValidator {
    async fn is_valid_slp_txid(&self, txid: &str) -> Result<bool, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.valid.contains(txid))
    }
}
