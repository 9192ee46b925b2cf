//! Error kinds surfaced by the engine and the provider stack.

use chrono::NaiveDate;

#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    #[error("operations involving restricted currencies ({0}) are not allowed")]
    RestrictedCurrency(String),

    #[error("currency '{0}' not found")]
    CurrencyNotFound(String),

    #[error("invalid date range: {from} is after {to}")]
    InvalidRange { from: NaiveDate, to: NaiveDate },

    #[error("upstream unavailable: {0}")]
    Unavailable(String),

    #[error("malformed upstream response: {0}")]
    Malformed(String),

    #[error("request cancelled: {0}")]
    Cancelled(String),

    #[error("no provider registered as '{0}'")]
    UnknownProvider(String),
}

impl ExchangeError {
    /// Transient failures are the only ones worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(self, ExchangeError::Unavailable(_))
    }
}
