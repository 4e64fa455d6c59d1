//! Run settings.
//!
//! Every field has a compiled-in default, so a settings file only needs the
//! keys it overrides:
//!
//! ```json
//! {
//!   "benchmark": { "primary_symbol": "^STOXX50E" },
//!   "analytics": { "min_observations": 60 }
//! }
//! ```

use crate::error::Result;
use crate::universe::{SectorUniverse, european_basket};
use lyon_data::dataset::DEFAULT_CONCURRENCY;
use lyon_data::{BenchmarkConfig, ExchangeSuffixTable, FxTable, RetryPolicy};
use lyon_risk::AnalyticsConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Settings for a fetch or analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Companies, symbols and sectors (default: the European basket)
    pub universe: SectorUniverse,
    /// Currency to EUR rates
    pub fx_rates: FxTable,
    /// Exchange suffix to currency
    pub exchange_currencies: ExchangeSuffixTable,
    /// Benchmark fallback chain
    pub benchmark: BenchmarkConfig,
    /// Metric computation
    pub analytics: AnalyticsConfig,
    /// Retry policy for price downloads
    pub retry: RetryPolicy,
    /// Concurrent price downloads (default: 4)
    pub concurrency: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            universe: european_basket(),
            fx_rates: FxTable::default(),
            exchange_currencies: ExchangeSuffixTable::default(),
            benchmark: BenchmarkConfig::default(),
            analytics: AnalyticsConfig::default(),
            retry: RetryPolicy::default(),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl Settings {
    /// Parse settings from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read settings from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading settings");
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Settings from `path` when given, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::from_file)
    }

    /// Universe symbols in analysis order.
    pub fn symbols(&self) -> Vec<String> {
        self.universe.symbols().map(str::to_string).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LyonError;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.symbols().len(), 18);
        assert_eq!(settings.benchmark.primary_symbol, "^STOXX");
        assert_eq!(settings.analytics.min_observations, 30);
        assert_eq!(settings.fx_rates.rate("GBP"), 1.15);
        assert_eq!(settings.concurrency, 4);
    }

    #[test]
    fn test_partial_override() {
        let settings = Settings::from_json(
            r#"{
                "benchmark": { "primary_symbol": "^STOXX50E", "basket_size": 5 },
                "fx_rates": { "GBP": 1.2 },
                "universe": {
                    "companies": [{ "name": "SANOFI", "symbol": "SAN.PA" }],
                    "sectors": [{ "name": "Health Care", "companies": ["SANOFI"] }]
                }
            }"#,
        )
        .unwrap();

        assert_eq!(settings.benchmark.primary_symbol, "^STOXX50E");
        assert_eq!(settings.benchmark.alternate_symbol, "SX5E.PA");
        assert_eq!(settings.benchmark.basket_size, 5);
        assert_eq!(settings.fx_rates.rate("GBP"), 1.2);
        assert_eq!(settings.fx_rates.rate("CHF"), 1.0);
        assert_eq!(settings.symbols(), vec!["SAN.PA"]);
        assert_eq!(settings.universe.sector_of("SAN.PA"), "Health Care");
        assert_eq!(settings.analytics, AnalyticsConfig::default());
    }

    #[test]
    fn test_round_trip() {
        let settings = Settings::default();
        let json = serde_json::to_string_pretty(&settings).unwrap();
        assert_eq!(Settings::from_json(&json).unwrap(), settings);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            Settings::from_json("{ not json"),
            Err(LyonError::Config(_))
        ));
    }

    #[test]
    fn test_load_without_path() {
        assert_eq!(Settings::load(None).unwrap(), Settings::default());
    }
}
