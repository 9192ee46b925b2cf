pub mod caching;
pub mod frankfurter;
pub mod resilient;

pub use caching::CachingProvider;
pub use frankfurter::FrankfurterProvider;
pub use resilient::{CircuitBreaker, CircuitState, ResilientProvider, RetryPolicy};

use crate::core::error::ExchangeError;
use crate::core::rate::RateProvider;
use std::collections::HashMap;
use std::sync::Arc;

/// Named rate providers, registered and resolved once at startup. Lookup is
/// case-insensitive.
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn RateProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }

    pub fn register(&mut self, provider: Arc<dyn RateProvider>) {
        self.providers
            .insert(provider.name().to_lowercase(), provider);
    }

    pub fn resolve(&self, name: &str) -> Result<Arc<dyn RateProvider>, ExchangeError> {
        self.providers
            .get(&name.to_lowercase())
            .cloned()
            .ok_or_else(|| ExchangeError::UnknownProvider(name.to_string()))
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
