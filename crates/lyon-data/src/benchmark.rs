//! Benchmark construction with a three-stage fallback.
//!
//! 1. the canonical index symbol,
//! 2. an alternate index symbol,
//! 3. a synthetic equal-weight index built from the head of the universe.
//!
//! The first stage yielding at least one observation wins. If the synthetic
//! stage has no usable constituent either, construction fails and no dataset
//! can be assembled.

use crate::dataset::DatedTable;
use crate::error::{DataError, Result};
use crate::series::{EUR, PriceSeries};
use crate::source::PriceSource;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Configuration for the benchmark fallback chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkConfig {
    /// Canonical index symbol (default: "^STOXX")
    pub primary_symbol: String,
    /// Index tried when the primary is unavailable (default: "SX5E.PA")
    pub alternate_symbol: String,
    /// Display name of the benchmark in reports (default: "Eurostoxx")
    pub label: String,
    /// Symbol given to the synthetic index (default: "SYNTHETIC_INDEX")
    pub synthetic_symbol: String,
    /// Number of leading universe symbols used for the synthetic index (default: 10)
    pub basket_size: usize,
    /// Minimum observation count relative to the longest constituent (default: 0.7)
    pub min_coverage: f64,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            primary_symbol: "^STOXX".to_string(),
            alternate_symbol: "SX5E.PA".to_string(),
            label: "Eurostoxx".to_string(),
            synthetic_symbol: "SYNTHETIC_INDEX".to_string(),
            basket_size: 10,
            min_coverage: 0.7,
        }
    }
}

/// Which stage of the fallback chain produced the benchmark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BenchmarkKind {
    /// The canonical index.
    Primary,
    /// The alternate index.
    Alternate,
    /// Equal-weight average of normalized constituents.
    Synthetic {
        /// Constituents that passed the coverage filter.
        constituents: Vec<String>,
    },
}

/// The reference series every asset is regressed against.
#[derive(Debug, Clone, PartialEq)]
pub struct Benchmark {
    kind: BenchmarkKind,
    series: PriceSeries,
}

impl Benchmark {
    /// Wrap an already-built series.
    pub const fn new(kind: BenchmarkKind, series: PriceSeries) -> Self {
        Self { kind, series }
    }

    /// Benchmark symbol (the index ticker or the synthetic symbol).
    pub fn symbol(&self) -> &str {
        self.series.symbol()
    }

    /// How the benchmark was obtained.
    pub const fn kind(&self) -> &BenchmarkKind {
        &self.kind
    }

    /// Benchmark levels.
    pub const fn series(&self) -> &PriceSeries {
        &self.series
    }

}

/// Runs the fallback chain against a [`PriceSource`].
#[derive(Debug, Clone, Default)]
pub struct BenchmarkBuilder {
    config: BenchmarkConfig,
}

impl BenchmarkBuilder {
    /// Create a builder.
    pub const fn new(config: BenchmarkConfig) -> Self {
        Self { config }
    }

    /// Build the benchmark for `universe` (ordered symbols) over `[start, end]`.
    pub async fn build<S: PriceSource>(
        &self,
        source: &S,
        universe: &[String],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Benchmark> {
        let cfg = &self.config;

        for (kind, symbol) in [
            (BenchmarkKind::Primary, &cfg.primary_symbol),
            (BenchmarkKind::Alternate, &cfg.alternate_symbol),
        ] {
            match source.fetch_prices(symbol, start, end).await {
                Ok(series) if !series.is_empty() => {
                    info!(symbol = %symbol, observations = series.len(), "benchmark retrieved");
                    return Ok(Benchmark::new(kind, series));
                }
                Ok(_) => warn!(symbol = %symbol, "benchmark returned no data"),
                Err(e) => warn!(symbol = %symbol, error = %e, "benchmark unavailable"),
            }
        }

        warn!(
            basket = cfg.basket_size,
            "no benchmark index available, building a synthetic index"
        );
        let mut constituents = Vec::new();
        for symbol in universe.iter().take(cfg.basket_size) {
            match source.fetch_prices(symbol, start, end).await {
                Ok(series) if !series.is_empty() => constituents.push(series),
                Ok(_) => warn!(symbol = %symbol, "synthetic constituent returned no data"),
                Err(e) => warn!(symbol = %symbol, error = %e, "synthetic constituent unavailable"),
            }
        }

        match synthetic_index(&constituents, cfg.min_coverage, &cfg.synthetic_symbol)? {
            Some((series, used)) => {
                info!(constituents = used.len(), "synthetic index built");
                Ok(Benchmark::new(
                    BenchmarkKind::Synthetic { constituents: used },
                    series,
                ))
            }
            None => Err(DataError::BenchmarkUnavailable {
                tried: vec![
                    cfg.primary_symbol.clone(),
                    cfg.alternate_symbol.clone(),
                    cfg.synthetic_symbol.clone(),
                ],
            }),
        }
    }
}

/// Equal-weight index of constituents normalized to 100 at their first value.
///
/// A constituent is kept only if its observation count reaches `min_coverage`
/// of the longest constituent's count. The index value on a date is the mean
/// of the normalized constituents observed that day.
///
/// Returns the index series and the symbols used, or `None` when no
/// constituent survives.
pub fn synthetic_index(
    constituents: &[PriceSeries],
    min_coverage: f64,
    symbol: &str,
) -> Result<Option<(PriceSeries, Vec<String>)>> {
    let longest = constituents.iter().map(PriceSeries::len).max().unwrap_or(0);
    let threshold = min_coverage * longest as f64;

    let mut normalized = Vec::with_capacity(constituents.len());
    for series in constituents {
        if (series.len() as f64) < threshold {
            warn!(
                symbol = series.symbol(),
                observations = series.len(),
                longest,
                "constituent dropped for insufficient coverage"
            );
            continue;
        }
        let Some(base) = series.first().map(|p| p.price).filter(|p| *p != 0.0) else {
            continue;
        };
        normalized.push(series.map_prices(EUR, |p| p / base * 100.0));
    }

    if normalized.is_empty() {
        return Ok(None);
    }

    let used = normalized.iter().map(|s| s.symbol().to_string()).collect();
    let index = DatedTable::from_series(&normalized)?.row_mean(symbol)?;
    Ok(Some((index, used)))
}
