use subtle::ConstantTimeEq;

use crate::types::CallerTier;

/// Resolves the caller tier from a presented API key.
///
/// Keys are compared in constant time against every configured key.
#[derive(Debug, Clone, Default)]
pub struct TierResolver {
    pro_keys: Vec<String>,
}

impl TierResolver {
    #[must_use]
    pub fn new(pro_keys: Vec<String>) -> Self {
        Self { pro_keys: pro_keys.into_iter().filter(|k| !k.is_empty()).collect() }
    }

    #[must_use]
    pub fn resolve(&self, api_key: Option<&str>) -> CallerTier {
        let Some(presented) = api_key.filter(|k| !k.is_empty()) else {
            return CallerTier::Freemium;
        };

        let matched = self
            .pro_keys
            .iter()
            .fold(0u8, |acc, key| acc | key.as_bytes().ct_eq(presented.as_bytes()).unwrap_u8());

        if matched == 1 {
            CallerTier::Pro
        } else {
            CallerTier::Freemium
        }
    }
}
