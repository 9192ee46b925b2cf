//! Conversion, latest-rate and paginated history operations.

use crate::core::error::ExchangeError;
use crate::core::guard::CurrencyGuard;
use crate::core::page::{Page, PageRequest};
use crate::core::rate::{Conversion, RateProvider, RateSnapshot};
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use std::sync::Arc;
use tracing::debug;

/// Fractional digits kept on converted amounts.
const CONVERSION_SCALE: u32 = 4;

/// Orchestrates the provider stack: restriction checks run before any cache
/// or network access, then the resolved provider (cache and resilience
/// decorators included) serves the rates.
pub struct ExchangeEngine {
    provider: Arc<dyn RateProvider>,
    guard: CurrencyGuard,
}

impl ExchangeEngine {
    pub fn new(provider: Arc<dyn RateProvider>, guard: CurrencyGuard) -> Self {
        Self { provider, guard }
    }

    /// Converts `amount` from one currency to another at the latest rate,
    /// rounded to four fractional digits, half away from zero.
    pub async fn convert(
        &self,
        from: &str,
        to: &str,
        amount: Decimal,
    ) -> Result<Conversion, ExchangeError> {
        let from = from.to_uppercase();
        let to = to.to_uppercase();
        self.guard.ensure_allowed(&[from.as_str(), to.as_str()])?;

        if from == to {
            return Ok(Conversion {
                from,
                to,
                amount,
                converted: amount,
            });
        }

        let snapshot = self.provider.fetch_latest(&from).await?;
        let rate = snapshot
            .rates
            .get(&to)
            .copied()
            .ok_or_else(|| ExchangeError::CurrencyNotFound(to.clone()))?;

        let converted = (amount * rate)
            .round_dp_with_strategy(CONVERSION_SCALE, RoundingStrategy::MidpointAwayFromZero);
        debug!(%from, %to, %amount, %rate, %converted, "Converted amount");

        Ok(Conversion {
            from,
            to,
            amount,
            converted,
        })
    }

    /// Latest rates for a base currency, with restricted codes filtered out
    /// of the returned snapshot.
    pub async fn latest_rates(&self, base: &str) -> Result<RateSnapshot, ExchangeError> {
        let base = base.to_uppercase();
        self.guard.ensure_allowed(&[base.as_str()])?;

        let mut snapshot = self.provider.fetch_latest(&base).await?;
        snapshot.rates = self.guard.filter(snapshot.rates);
        Ok(snapshot)
    }

    /// One page of daily snapshots for the inclusive date range, ascending.
    /// Totals cover the full range; a page past the end is empty, not an
    /// error. Any failed fetch fails the whole call.
    pub async fn history(
        &self,
        base: &str,
        from: NaiveDate,
        to: NaiveDate,
        page: PageRequest,
    ) -> Result<Page<RateSnapshot>, ExchangeError> {
        if from > to {
            return Err(ExchangeError::InvalidRange { from, to });
        }
        let base = base.to_uppercase();
        self.guard.ensure_allowed(&[base.as_str()])?;

        let total_count = (to - from).num_days() as usize + 1;
        debug!(%base, %from, %to, total_count, page = page.number(), "Fetching rate history");

        let mut items = Vec::new();
        for date in from
            .iter_days()
            .take(total_count)
            .skip(page.offset())
            .take(page.size())
        {
            let mut snapshot = self.provider.fetch_historical(&base, date).await?;
            snapshot.rates = self.guard.filter(snapshot.rates);
            items.push(snapshot);
        }

        Ok(Page::new(items, total_count, page))
    }
}
