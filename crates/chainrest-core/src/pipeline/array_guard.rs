use serde_json::Value;

use crate::{config::LimitsConfig, pipeline::errors::RouteError, types::CallerTier};

/// `true` if `items` is a JSON array holding at most `max_size` elements.
///
/// An empty array is valid.
#[must_use]
pub fn validate_array_size(items: &Value, max_size: usize) -> bool {
    items.as_array().is_some_and(|array| array.len() <= max_size)
}

/// Bounds bulk request payloads, with a separate limit for pro callers.
#[derive(Debug, Clone)]
pub struct ArrayGuard {
    freemium_limit: usize,
    pro_limit: usize,
    oversize_status: u16,
}

impl ArrayGuard {
    #[must_use]
    pub fn new(freemium_limit: usize, pro_limit: usize, oversize_status: u16) -> Self {
        Self { freemium_limit, pro_limit, oversize_status }
    }

    #[must_use]
    pub fn from_config(limits: &LimitsConfig) -> Self {
        Self::new(limits.freemium_array_size, limits.pro_array_size, limits.oversize_status)
    }

    #[must_use]
    pub fn limit_for(&self, tier: CallerTier) -> usize {
        match tier {
            CallerTier::Freemium => self.freemium_limit,
            CallerTier::Pro => self.pro_limit,
        }
    }

    #[must_use]
    pub fn validate(&self, items: &Value, tier: CallerTier) -> bool {
        validate_array_size(items, self.limit_for(tier))
    }

    /// Pulls the array named `field` out of a request body.
    ///
    /// A missing or non-array field fails with `400 not_array_message`; an array over the
    /// caller's limit fails with the configured oversize status.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::Validation`] as described above.
    pub fn extract<'a>(
        &self,
        body: &'a Value,
        field: &str,
        not_array_message: &str,
        tier: CallerTier,
    ) -> Result<&'a [Value], RouteError> {
        let items = body.get(field).unwrap_or(&Value::Null);
        let Some(array) = items.as_array() else {
            return Err(RouteError::bad_request(not_array_message));
        };

        if !self.validate(items, tier) {
            let limit = self.limit_for(tier);
            tracing::debug!(
                field,
                len = array.len(),
                limit,
                tier = tier.as_str(),
                "bulk request over array limit"
            );
            return Err(RouteError::Validation {
                status: self.oversize_status,
                message: format!("Array too large. Max {limit} {field}"),
            });
        }

        Ok(array)
    }
}

impl Default for ArrayGuard {
    fn default() -> Self {
        Self::from_config(&LimitsConfig::default())
    }
}
