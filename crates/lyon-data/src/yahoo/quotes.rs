//! Daily close retrieval from Yahoo Finance.

use crate::error::{DataError, Result};
use crate::series::PriceSeries;
use crate::source::PriceSource;
use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;
use yahoo_finance_api as yahoo;

/// Yahoo Finance quote provider with request pacing.
pub struct YahooQuoteProvider {
    provider: yahoo::YahooConnector,
    rate_limit_delay: Duration,
}

/// Placeholder currency for series whose quote currency is not yet resolved.
pub const LOCAL_CURRENCY: &str = "LOCAL";

impl std::fmt::Debug for YahooQuoteProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YahooQuoteProvider")
            .field("rate_limit_delay", &self.rate_limit_delay)
            .finish_non_exhaustive()
    }
}

impl YahooQuoteProvider {
    /// Create a provider pausing 250ms after every request.
    pub fn new() -> Result<Self> {
        Self::with_rate_limit(Duration::from_millis(250))
    }

    /// Create a provider with custom pacing.
    pub fn with_rate_limit(rate_limit_delay: Duration) -> Result<Self> {
        Ok(Self {
            provider: yahoo::YahooConnector::new()?,
            rate_limit_delay,
        })
    }

    /// Fetch adjusted daily closes for a single symbol.
    ///
    /// # Arguments
    /// * `symbol` - The ticker symbol (e.g., "AIR.PA")
    /// * `start` - Start date for the data
    /// * `end` - End date for the data
    ///
    /// # Returns
    /// The closes keyed by exchange-local trading date. The series currency is
    /// left as [`LOCAL_CURRENCY`]; the assembler resolves it from the exchange suffix.
    pub async fn fetch_closes(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<PriceSeries> {
        // Validate date range
        if start > end {
            return Err(DataError::InvalidDateRange {
                start: start.to_rfc3339(),
                end: end.to_rfc3339(),
            });
        }

        // Validate symbol
        if symbol.is_empty() {
            return Err(DataError::InvalidSymbol("Empty symbol".to_string()));
        }

        // Convert chrono DateTime to time::OffsetDateTime
        let start_time = time::OffsetDateTime::from_unix_timestamp(start.timestamp())
            .map_err(|e| DataError::TimeConversion(e.to_string()))?;
        let end_time = time::OffsetDateTime::from_unix_timestamp(end.timestamp())
            .map_err(|e| DataError::TimeConversion(e.to_string()))?;

        let response = self
            .provider
            .get_quote_history(symbol, start_time, end_time)
            .await?;

        let quotes = response
            .quotes()
            .map_err(|e| DataError::YahooApi(e.to_string()))?;

        // Apply rate limiting
        sleep(self.rate_limit_delay).await;

        if quotes.is_empty() {
            return Err(DataError::MissingData {
                symbol: symbol.to_string(),
                reason: "No data returned from Yahoo Finance".to_string(),
            });
        }

        let mut observations = Vec::with_capacity(quotes.len());
        for quote in &quotes {
            let timestamp = DateTime::from_timestamp(quote.timestamp, 0).ok_or_else(|| {
                DataError::TimeConversion(format!("invalid timestamp {}", quote.timestamp))
            })?;
            observations.push((timestamp.date_naive(), quote.adjclose));
        }
        debug!(symbol, observations = observations.len(), "fetched quotes");

        Ok(PriceSeries::new(symbol, LOCAL_CURRENCY, observations))
    }
}

impl PriceSource for YahooQuoteProvider {
    async fn fetch_prices(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<PriceSeries> {
        self.fetch_closes(symbol, start, end).await
    }
}
