//! Restricted-currency policy.

use crate::core::error::ExchangeError;
use rust_decimal::Decimal;
use std::collections::{BTreeSet, HashMap};

/// Currency codes permanently excluded from all rate and conversion
/// operations.
const RESTRICTED_CURRENCIES: [&str; 4] = ["TRY", "PLN", "THB", "MXN"];

/// Enforces the restricted set before any cache or network access happens.
/// Stateless apart from the static set; codes are expected in uppercase.
pub struct CurrencyGuard {
    restricted: BTreeSet<&'static str>,
}

impl CurrencyGuard {
    pub fn new() -> Self {
        Self {
            restricted: RESTRICTED_CURRENCIES.into_iter().collect(),
        }
    }

    pub fn is_restricted(&self, code: &str) -> bool {
        self.restricted.contains(code)
    }

    /// Restricted codes in lexicographic order, for message formatting.
    pub fn restricted_codes(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.restricted.iter().copied()
    }

    /// Fails with the full restricted set named when any given code is
    /// restricted.
    pub fn ensure_allowed(&self, codes: &[&str]) -> Result<(), ExchangeError> {
        if codes.iter().any(|code| self.is_restricted(code)) {
            let listed = self.restricted_codes().collect::<Vec<_>>().join(", ");
            return Err(ExchangeError::RestrictedCurrency(listed));
        }
        Ok(())
    }

    /// Drops restricted codes from a rates mapping.
    pub fn filter(&self, rates: HashMap<String, Decimal>) -> HashMap<String, Decimal> {
        rates
            .into_iter()
            .filter(|(code, _)| !self.is_restricted(code))
            .collect()
    }
}

impl Default for CurrencyGuard {
    fn default() -> Self {
        Self::new()
    }
}
