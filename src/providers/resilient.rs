//! Retry and circuit-breaking decorator for upstream calls.

use crate::core::clock::Clock;
use crate::core::error::ExchangeError;
use crate::core::rate::{RateProvider, RateSnapshot};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Retry knobs for transient upstream failures.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the initial attempt.
    pub max_retries: u32,
    /// Base delay; attempt n waits base * 2^n.
    pub backoff_base: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_retries: 3,
            backoff_base: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    fn delay_for(&self, attempt: u32) -> Duration {
        self.backoff_base * 2u32.saturating_pow(attempt)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

struct BreakerInner {
    state: CircuitState,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
}

/// Trips after a run of consecutive transient failures and rejects calls
/// until the cooldown elapses; a single half-open trial then decides whether
/// the circuit closes again. One breaker is shared per upstream provider.
pub struct CircuitBreaker {
    inner: Mutex<BreakerInner>,
    failure_threshold: u32,
    cooldown: Duration,
    clock: Arc<dyn Clock>,
}

impl CircuitBreaker {
    pub fn new(failure_threshold: u32, cooldown: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Mutex::new(BreakerInner {
                state: CircuitState::Closed,
                consecutive_failures: 0,
                opened_at: None,
            }),
            failure_threshold,
            cooldown,
            clock,
        }
    }

    pub fn state(&self) -> CircuitState {
        self.lock().state
    }

    fn lock(&self) -> MutexGuard<'_, BreakerInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Gates a call. Open circuits reject immediately; once the cooldown has
    /// elapsed the first caller through is admitted as the half-open trial.
    fn check(&self) -> Result<(), ExchangeError> {
        let mut inner = self.lock();
        match inner.state {
            CircuitState::Closed => Ok(()),
            CircuitState::Open => {
                let elapsed = inner
                    .opened_at
                    .map(|at| self.clock.now().duration_since(at))
                    .unwrap_or(Duration::ZERO);
                if elapsed >= self.cooldown {
                    debug!("Circuit breaker half-open, admitting trial call");
                    inner.state = CircuitState::HalfOpen;
                    Ok(())
                } else {
                    Err(ExchangeError::Unavailable(
                        "circuit breaker is open".to_string(),
                    ))
                }
            }
            CircuitState::HalfOpen => Err(ExchangeError::Unavailable(
                "circuit breaker is open, trial call in flight".to_string(),
            )),
        }
    }

    fn record_success(&self) {
        let mut inner = self.lock();
        if inner.state != CircuitState::Closed {
            debug!("Circuit breaker closed");
        }
        inner.state = CircuitState::Closed;
        inner.consecutive_failures = 0;
        inner.opened_at = None;
    }

    fn record_failure(&self) {
        let mut inner = self.lock();
        inner.consecutive_failures += 1;
        let tripped = inner.state == CircuitState::HalfOpen
            || inner.consecutive_failures >= self.failure_threshold;
        if tripped {
            inner.state = CircuitState::Open;
            inner.opened_at = Some(self.clock.now());
            warn!(
                failures = inner.consecutive_failures,
                "Circuit breaker opened"
            );
        }
    }
}

/// Wraps a provider with retry, circuit breaking and a per-attempt deadline.
///
/// Transient errors are retried with exponential backoff and counted by the
/// breaker; all other errors propagate from the first attempt. A deadline
/// expiry surfaces as `Cancelled`. Dropping the returned future aborts the
/// in-flight request.
pub struct ResilientProvider<P> {
    inner: P,
    retry: RetryPolicy,
    breaker: Arc<CircuitBreaker>,
    request_timeout: Duration,
}

impl<P> ResilientProvider<P> {
    pub fn new(
        inner: P,
        retry: RetryPolicy,
        breaker: Arc<CircuitBreaker>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            inner,
            retry,
            breaker,
            request_timeout,
        }
    }

    async fn execute<F, Fut>(&self, mut operation: F) -> Result<RateSnapshot, ExchangeError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<RateSnapshot, ExchangeError>>,
    {
        let mut attempt = 0u32;
        loop {
            self.breaker.check()?;

            let result = match tokio::time::timeout(self.request_timeout, operation()).await {
                Ok(result) => result,
                Err(_) => Err(ExchangeError::Cancelled(format!(
                    "upstream attempt exceeded {:?}",
                    self.request_timeout
                ))),
            };

            match result {
                Ok(snapshot) => {
                    self.breaker.record_success();
                    return Ok(snapshot);
                }
                Err(err) if err.is_transient() => {
                    self.breaker.record_failure();
                    if attempt >= self.retry.max_retries {
                        return Err(err);
                    }
                    attempt += 1;
                    let delay = self.retry.delay_for(attempt);
                    debug!(
                        "Attempt {}/{} failed: {}. Retrying in {:?}",
                        attempt, self.retry.max_retries, err, delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[async_trait]
impl<P: RateProvider> RateProvider for ResilientProvider<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn fetch_latest(&self, base: &str) -> Result<RateSnapshot, ExchangeError> {
        self.execute(|| self.inner.fetch_latest(base)).await
    }

    async fn fetch_historical(
        &self,
        base: &str,
        date: NaiveDate,
    ) -> Result<RateSnapshot, ExchangeError> {
        self.execute(|| self.inner.fetch_historical(base, date))
            .await
    }
}
