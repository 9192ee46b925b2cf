use crate::core::cache::{RateCache, RateKey};
use crate::core::error::ExchangeError;
use crate::core::rate::{RateProvider, RateSnapshot};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;

/// Puts the shared snapshot cache in front of any provider. Only successful
/// snapshots are cached; failures always go back to the inner provider.
pub struct CachingProvider<P> {
    inner: P,
    cache: Arc<RateCache>,
}

impl<P> CachingProvider<P> {
    pub fn new(inner: P, cache: Arc<RateCache>) -> Self {
        Self { inner, cache }
    }
}

#[async_trait]
impl<P: RateProvider> RateProvider for CachingProvider<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn fetch_latest(&self, base: &str) -> Result<RateSnapshot, ExchangeError> {
        let key = RateKey::latest(base);
        if let Some(snapshot) = self.cache.get(&key).await {
            return Ok(snapshot);
        }

        let snapshot = self.inner.fetch_latest(base).await?;
        self.cache.put(key, snapshot.clone()).await;
        Ok(snapshot)
    }

    async fn fetch_historical(
        &self,
        base: &str,
        date: NaiveDate,
    ) -> Result<RateSnapshot, ExchangeError> {
        let key = RateKey::historical(base, date);
        if let Some(snapshot) = self.cache.get(&key).await {
            return Ok(snapshot);
        }

        let snapshot = self.inner.fetch_historical(base, date).await?;
        self.cache.put(key, snapshot.clone()).await;
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::test_clock::ManualClock;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct MockInnerProvider {
        call_count: AtomicUsize,
    }

    impl MockInnerProvider {
        fn new() -> Self {
            Self {
                call_count: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl<'a> RateProvider for &'a MockInnerProvider {
        fn name(&self) -> &str {
            "mock"
        }

        async fn fetch_latest(&self, base: &str) -> Result<RateSnapshot, ExchangeError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            if base == "USD" {
                Ok(RateSnapshot {
                    base: base.to_string(),
                    date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
                    rates: HashMap::from([("EUR".to_string(), dec!(0.9))]),
                })
            } else {
                Err(ExchangeError::Unavailable("503".into()))
            }
        }

        async fn fetch_historical(
            &self,
            base: &str,
            date: NaiveDate,
        ) -> Result<RateSnapshot, ExchangeError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            Ok(RateSnapshot {
                base: base.to_string(),
                date,
                rates: HashMap::from([("EUR".to_string(), dec!(0.91))]),
            })
        }
    }

    fn cache_with_clock(ttl: Duration, clock: Arc<ManualClock>) -> Arc<RateCache> {
        Arc::new(RateCache::new(ttl, clock))
    }

    #[tokio::test]
    async fn test_second_fetch_is_served_from_cache() {
        let inner = MockInnerProvider::new();
        let clock = Arc::new(ManualClock::new());
        let provider = CachingProvider::new(&inner, cache_with_clock(Duration::from_secs(300), clock));

        let first = provider.fetch_latest("USD").await.unwrap();
        assert_eq!(inner.calls(), 1);

        let second = provider.fetch_latest("USD").await.unwrap();
        assert_eq!(inner.calls(), 1);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_expired_entry_triggers_a_new_fetch() {
        let inner = MockInnerProvider::new();
        let clock = Arc::new(ManualClock::new());
        let provider =
            CachingProvider::new(&inner, cache_with_clock(Duration::from_secs(300), clock.clone()));

        provider.fetch_latest("USD").await.unwrap();
        provider.fetch_latest("USD").await.unwrap();
        assert_eq!(inner.calls(), 1);

        clock.advance(Duration::from_secs(301));
        provider.fetch_latest("USD").await.unwrap();
        assert_eq!(inner.calls(), 2);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let inner = MockInnerProvider::new();
        let clock = Arc::new(ManualClock::new());
        let provider = CachingProvider::new(&inner, cache_with_clock(Duration::from_secs(300), clock));

        assert!(provider.fetch_latest("GBP").await.is_err());
        assert!(provider.fetch_latest("GBP").await.is_err());
        assert_eq!(inner.calls(), 2);
    }

    #[tokio::test]
    async fn test_historical_dates_are_cached_independently() {
        let inner = MockInnerProvider::new();
        let clock = Arc::new(ManualClock::new());
        let provider = CachingProvider::new(&inner, cache_with_clock(Duration::from_secs(300), clock));

        let first = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let second = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();

        provider.fetch_historical("USD", first).await.unwrap();
        provider.fetch_historical("USD", second).await.unwrap();
        assert_eq!(inner.calls(), 2);

        provider.fetch_historical("USD", first).await.unwrap();
        assert_eq!(inner.calls(), 2);
    }
}
