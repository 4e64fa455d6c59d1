//! Price retrieval abstraction.
//!
//! The benchmark builder and the dataset assembler only see [`PriceSource`];
//! a failed retrieval is an `Err`, which both treat as "symbol absent".

use crate::error::{DataError, Result};
use crate::series::PriceSeries;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// A provider of daily closing prices.
pub trait PriceSource {
    /// Fetch daily closes for `symbol` between `start` and `end`.
    ///
    /// An `Ok` series may still be empty; callers decide whether that counts
    /// as a failure.
    fn fetch_prices(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> impl Future<Output = Result<PriceSeries>>;
}

/// Delay growth between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Backoff {
    /// Same delay before every retry.
    Fixed,
    /// Delay doubles after every failed attempt.
    Exponential,
}

/// Bounded retry configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts, including the first (default: 3)
    pub max_attempts: u32,
    /// Base delay between attempts in milliseconds (default: 1000)
    pub delay_ms: u64,
    /// Delay growth (default: fixed)
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay_ms: 1000,
            backoff: Backoff::Fixed,
        }
    }
}

impl RetryPolicy {
    /// Policy that tries once and never sleeps.
    pub const fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            delay_ms: 0,
            backoff: Backoff::Fixed,
        }
    }

    /// Delay to wait after failed attempt number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let base = Duration::from_millis(self.delay_ms);
        match self.backoff {
            Backoff::Fixed => base,
            Backoff::Exponential => base.saturating_mul(2_u32.saturating_pow(attempt.saturating_sub(1))),
        }
    }
}

/// Wraps a source with a [`RetryPolicy`]. Empty results are retried too.
#[derive(Debug, Clone)]
pub struct RetryingSource<S> {
    inner: S,
    policy: RetryPolicy,
}

impl<S: PriceSource> RetryingSource<S> {
    /// Wrap `inner` with `policy`.
    pub const fn new(inner: S, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    /// The wrapped source.
    pub const fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: PriceSource> PriceSource for RetryingSource<S> {
    async fn fetch_prices(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<PriceSeries> {
        let attempts = self.policy.max_attempts.max(1);
        let mut last_error = None;

        for attempt in 1..=attempts {
            match self.inner.fetch_prices(symbol, start, end).await {
                Ok(series) if !series.is_empty() => return Ok(series),
                Ok(_) => {
                    debug!(symbol, attempt, "empty price history");
                    last_error = Some(DataError::MissingData {
                        symbol: symbol.to_string(),
                        reason: "empty price history".to_string(),
                    });
                }
                Err(e) => {
                    warn!(symbol, attempt, error = %e, "price retrieval failed");
                    last_error = Some(e);
                }
            }

            if attempt < attempts {
                sleep(self.policy.delay_for(attempt)).await;
            }
        }

        Err(last_error.unwrap_or_else(|| DataError::MissingData {
            symbol: symbol.to_string(),
            reason: format!("no data after {attempts} attempts"),
        }))
    }
}

/// Source backed by preloaded series, keyed by symbol.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    series: HashMap<String, PriceSeries>,
}

impl InMemorySource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the series for its symbol.
    pub fn insert(&mut self, series: PriceSeries) {
        self.series.insert(series.symbol().to_string(), series);
    }

    /// Builder-style [`Self::insert`].
    pub fn with(mut self, series: PriceSeries) -> Self {
        self.insert(series);
        self
    }
}

impl FromIterator<PriceSeries> for InMemorySource {
    fn from_iter<I: IntoIterator<Item = PriceSeries>>(iter: I) -> Self {
        let mut source = Self::new();
        for series in iter {
            source.insert(series);
        }
        source
    }
}

impl PriceSource for InMemorySource {
    async fn fetch_prices(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<PriceSeries> {
        let series = self
            .series
            .get(symbol)
            .ok_or_else(|| DataError::MissingData {
                symbol: symbol.to_string(),
                reason: "symbol not loaded".to_string(),
            })?;

        let (start, end) = (start.date_naive(), end.date_naive());
        let window = series
            .points()
            .iter()
            .filter(|p| p.date >= start && p.date <= end)
            .map(|p| (p.date, p.price));
        Ok(PriceSeries::new(symbol, series.currency(), window))
    }
}
