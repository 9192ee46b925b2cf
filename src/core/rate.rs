//! Rate snapshot types and the provider abstraction.

use crate::core::error::ExchangeError;
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A dated mapping from currency code to exchange rate, relative to a base
/// currency. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateSnapshot {
    pub base: String,
    pub date: NaiveDate,
    pub rates: HashMap<String, Decimal>,
}

/// Outcome of a currency conversion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conversion {
    pub from: String,
    pub to: String,
    pub amount: Decimal,
    pub converted: Decimal,
}

/// A single upstream rate source. Implementations issue one request per call;
/// caching and retries are layered on top by decorators.
#[async_trait]
pub trait RateProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch_latest(&self, base: &str) -> Result<RateSnapshot, ExchangeError>;

    async fn fetch_historical(
        &self,
        base: &str,
        date: NaiveDate,
    ) -> Result<RateSnapshot, ExchangeError>;
}
