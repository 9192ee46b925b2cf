use crate::core::error::ExchangeError;
use crate::core::rate::{RateProvider, RateSnapshot};
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Adapter for the Frankfurter exchange rate API.
///
/// Pure transport: one request per call, no caching, no retries. Those
/// concerns are layered on by the caching and resilient decorators.
pub struct FrankfurterProvider {
    base_url: String,
    client: reqwest::Client,
}

impl FrankfurterProvider {
    pub fn new(base_url: &str) -> Result<Self, ExchangeError> {
        let client = reqwest::Client::builder()
            .user_agent("fxr/0.2")
            .build()
            .map_err(|e| ExchangeError::Unavailable(format!("failed to build client: {e}")))?;

        Ok(FrankfurterProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    async fn fetch(&self, endpoint: &str, base: &str) -> Result<RateSnapshot, ExchangeError> {
        let url = format!("{}/{}?base={}", self.base_url, endpoint, base);
        debug!("Requesting rates from {}", url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            ExchangeError::Unavailable(format!("request error: {e} for base: {base}"))
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            // The upstream answers 404 for currencies and dates it does not
            // know, as opposed to being down.
            return Err(ExchangeError::CurrencyNotFound(base.to_string()));
        }
        if status.is_server_error() {
            return Err(ExchangeError::Unavailable(format!(
                "HTTP error: {status} for base: {base}"
            )));
        }
        if !status.is_success() {
            return Err(ExchangeError::Malformed(format!(
                "unexpected status {status} for base: {base}"
            )));
        }

        let text = response.text().await.map_err(|e| {
            ExchangeError::Unavailable(format!("failed to read response for {base}: {e}"))
        })?;

        let parsed: FrankfurterResponse = serde_json::from_str(&text).map_err(|e| {
            ExchangeError::Malformed(format!("failed to parse response for {base}: {e}"))
        })?;

        Ok(RateSnapshot {
            base: parsed.base,
            date: parsed.date,
            rates: parsed.rates,
        })
    }
}

#[derive(Debug, Deserialize)]
struct FrankfurterResponse {
    base: String,
    date: NaiveDate,
    rates: HashMap<String, Decimal>,
}

#[async_trait]
impl RateProvider for FrankfurterProvider {
    fn name(&self) -> &str {
        "frankfurter"
    }

    #[instrument(name = "FrankfurterLatest", skip(self), fields(base = %base))]
    async fn fetch_latest(&self, base: &str) -> Result<RateSnapshot, ExchangeError> {
        self.fetch("latest", base).await
    }

    #[instrument(name = "FrankfurterHistorical", skip(self), fields(base = %base, date = %date))]
    async fn fetch_historical(
        &self,
        base: &str,
        date: NaiveDate,
    ) -> Result<RateSnapshot, ExchangeError> {
        self.fetch(&date.format("%Y-%m-%d").to_string(), base).await
    }
}
