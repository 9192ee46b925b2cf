pub mod core;
pub mod engine;
pub mod providers;
pub mod ui;

use crate::core::cache::RateCache;
use crate::core::clock::SystemClock;
use crate::core::config::AppConfig;
use crate::core::guard::CurrencyGuard;
use crate::core::page::PageRequest;
use crate::engine::ExchangeEngine;
use crate::providers::{
    CachingProvider, CircuitBreaker, FrankfurterProvider, ProviderRegistry, ResilientProvider,
    RetryPolicy,
};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::debug;

pub enum AppCommand {
    Convert {
        from: String,
        to: String,
        amount: Decimal,
    },
    Latest {
        base: String,
    },
    History {
        base: String,
        from: NaiveDate,
        to: NaiveDate,
        page: usize,
        page_size: usize,
    },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let engine = build_engine(&config)?;

    match command {
        AppCommand::Convert { from, to, amount } => {
            let conversion = engine.convert(&from, &to, amount).await?;
            println!("{}", ui::render_conversion(&conversion));
        }
        AppCommand::Latest { base } => {
            let snapshot = engine.latest_rates(&base).await?;
            println!("{}", ui::render_snapshot(&snapshot));
        }
        AppCommand::History {
            base,
            from,
            to,
            page,
            page_size,
        } => {
            let request = PageRequest::new(page, page_size);
            let spinner = ui::new_spinner("Fetching historical rates...");
            let result = engine.history(&base, from, to, request).await;
            spinner.finish_and_clear();
            println!("{}", ui::render_history(&base.to_uppercase(), &result?));
        }
    }

    Ok(())
}

/// Builds the engine from configuration. The Frankfurter adapter is wrapped
/// with the resilience and caching decorators, then registered and resolved
/// by name.
pub fn build_engine(config: &AppConfig) -> Result<ExchangeEngine> {
    let clock = Arc::new(SystemClock);
    let cache = Arc::new(RateCache::new(config.cache.ttl(), clock.clone()));
    let breaker = Arc::new(CircuitBreaker::new(
        config.resilience.failure_threshold,
        config.resilience.cooldown(),
        clock,
    ));
    let retry = RetryPolicy {
        max_retries: config.resilience.max_retries,
        backoff_base: config.resilience.backoff_base(),
    };

    let base_url = config
        .providers
        .frankfurter
        .as_ref()
        .map_or("https://api.frankfurter.dev/v1", |p| &p.base_url);
    let frankfurter = FrankfurterProvider::new(base_url)?;
    let transport = ResilientProvider::new(
        frankfurter,
        retry,
        breaker,
        config.resilience.request_timeout(),
    );
    let cached = CachingProvider::new(transport, cache);

    let mut registry = ProviderRegistry::new();
    registry.register(Arc::new(cached));

    let provider = registry
        .resolve(&config.provider)
        .with_context(|| format!("Provider '{}' is not registered", config.provider))?;

    Ok(ExchangeEngine::new(provider, CurrencyGuard::new()))
}
