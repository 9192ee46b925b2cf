//! Time-bounded cache for rate snapshots.

use crate::core::clock::Clock;
use crate::core::rate::RateSnapshot;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

/// Cache key: query kind, base currency, and date for historical lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RateKey {
    Latest { base: String },
    Historical { base: String, date: NaiveDate },
}

impl RateKey {
    pub fn latest(base: &str) -> Self {
        RateKey::Latest {
            base: base.to_string(),
        }
    }

    pub fn historical(base: &str, date: NaiveDate) -> Self {
        RateKey::Historical {
            base: base.to_string(),
            date,
        }
    }
}

struct CacheEntry {
    snapshot: RateSnapshot,
    expires_at: Instant,
}

/// Shared snapshot cache with a uniform TTL and passive expiry: entries past
/// `expires_at` are dropped on lookup, never returned. Concurrent misses for
/// the same key may both reach the upstream; the cache does not deduplicate
/// in-flight fetches.
pub struct RateCache {
    inner: Mutex<HashMap<RateKey, CacheEntry>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl RateCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    pub async fn get(&self, key: &RateKey) -> Option<RateSnapshot> {
        let mut cache = self.inner.lock().await;
        match cache.get(key) {
            Some(entry) if entry.expires_at > self.clock.now() => {
                debug!(?key, "Cache HIT");
                Some(entry.snapshot.clone())
            }
            Some(_) => {
                debug!(?key, "Cache EXPIRED");
                cache.remove(key);
                None
            }
            None => {
                debug!(?key, "Cache MISS");
                None
            }
        }
    }

    pub async fn put(&self, key: RateKey, snapshot: RateSnapshot) {
        let mut cache = self.inner.lock().await;
        debug!(?key, "Cache PUT");
        cache.insert(
            key,
            CacheEntry {
                snapshot,
                expires_at: self.clock.now() + self.ttl,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::test_clock::ManualClock;
    use rust_decimal_macros::dec;

    fn snapshot(base: &str) -> RateSnapshot {
        RateSnapshot {
            base: base.to_string(),
            date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            rates: HashMap::from([("EUR".to_string(), dec!(0.9))]),
        }
    }

    #[tokio::test]
    async fn test_cache_get_put() {
        let clock = Arc::new(ManualClock::new());
        let cache = RateCache::new(Duration::from_secs(300), clock);
        let key = RateKey::latest("USD");

        assert!(cache.get(&key).await.is_none());

        cache.put(key.clone(), snapshot("USD")).await;
        assert_eq!(cache.get(&key).await, Some(snapshot("USD")));

        assert!(cache.get(&RateKey::latest("GBP")).await.is_none());
    }

    #[tokio::test]
    async fn test_entry_expires_after_ttl() {
        let clock = Arc::new(ManualClock::new());
        let cache = RateCache::new(Duration::from_secs(300), clock.clone());
        let key = RateKey::latest("USD");

        cache.put(key.clone(), snapshot("USD")).await;

        clock.advance(Duration::from_secs(299));
        assert!(cache.get(&key).await.is_some());

        clock.advance(Duration::from_secs(2));
        assert!(cache.get(&key).await.is_none());
    }

    #[tokio::test]
    async fn test_latest_and_historical_keys_are_independent() {
        let clock = Arc::new(ManualClock::new());
        let cache = RateCache::new(Duration::from_secs(300), clock);
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();

        cache.put(RateKey::latest("USD"), snapshot("USD")).await;

        assert!(cache.get(&RateKey::historical("USD", date)).await.is_none());
        assert!(cache.get(&RateKey::latest("USD")).await.is_some());
    }

    #[tokio::test]
    async fn test_put_overwrites_expired_entry() {
        let clock = Arc::new(ManualClock::new());
        let cache = RateCache::new(Duration::from_secs(10), clock.clone());
        let key = RateKey::latest("USD");

        cache.put(key.clone(), snapshot("USD")).await;
        clock.advance(Duration::from_secs(11));
        assert!(cache.get(&key).await.is_none());

        cache.put(key.clone(), snapshot("USD")).await;
        assert!(cache.get(&key).await.is_some());
    }
}
