//! Analysis of an assembled dataset.
//!
//! The benchmark is measured against itself, then every universe symbol
//! present in the dataset is measured against the benchmark on the rayon pool.
//! Results are gathered by symbol and laid out in universe order.

use crate::error::{LyonError, Result};
use crate::universe::SectorUniverse;
use lyon_data::Dataset;
use lyon_risk::table::INDEX_SECTOR;
use lyon_risk::{AnalyticsConfig, AnalyticsTable, Metrics, MetricsEngine, MetricsRecord};
use rayon::prelude::*;
use std::collections::HashMap;
use tracing::{info, warn};

/// Runs the metrics engine over a dataset.
#[derive(Debug, Clone)]
pub struct Analyzer {
    engine: MetricsEngine,
    benchmark_label: String,
}

impl Analyzer {
    /// Analyzer labelling the benchmark row `benchmark_label`.
    pub fn new(config: AnalyticsConfig, benchmark_label: impl Into<String>) -> Self {
        Self {
            engine: MetricsEngine::new(config),
            benchmark_label: benchmark_label.into(),
        }
    }

    /// Build the analytics table for `universe` from `dataset`.
    ///
    /// Symbols missing from the dataset, or with too little history, are
    /// logged and left out. The benchmark is the first dataset column.
    pub fn analyze(&self, dataset: &Dataset, universe: &SectorUniverse) -> Result<AnalyticsTable> {
        let prices = dataset.prices();
        let returns = dataset.returns();
        if returns.height() == 0 {
            return Err(LyonError::EmptyDataset);
        }

        let benchmark = dataset.benchmark_symbol().ok_or(LyonError::EmptyDataset)?;
        let benchmark_returns = returns
            .return_series(benchmark)
            .ok_or_else(|| LyonError::MissingBenchmark(benchmark.to_string()))?;
        let benchmark_prices = prices.price_series(benchmark);
        info!(benchmark, observations = benchmark_returns.len(), "analysing benchmark");

        let benchmark_row = match self
            .engine
            .benchmark_metrics(&benchmark_returns, benchmark_prices.as_ref())
        {
            Some(m) => Some(MetricsRecord::new(
                INDEX_SECTOR,
                self.benchmark_label.as_str(),
                benchmark,
                &m,
            )),
            None => {
                warn!(benchmark, "not enough benchmark history, no index row");
                None
            }
        };

        let symbols: Vec<&str> = universe
            .symbols()
            .filter(|s| *s != benchmark)
            .filter(|s| {
                let present = returns.contains(s);
                if !present {
                    warn!(symbol = s, "not in dataset, skipping");
                }
                present
            })
            .collect();

        let mut computed: HashMap<&str, Metrics> = symbols
            .par_iter()
            .filter_map(|&symbol| {
                let asset_returns = returns.return_series(symbol)?;
                let asset_prices = prices.price_series(symbol);
                self.engine
                    .compute_metrics(&asset_returns, &benchmark_returns, asset_prices.as_ref())
                    .map(|m| (symbol, m))
            })
            .collect();

        let mut rows = Vec::with_capacity(computed.len());
        for symbol in symbols {
            match computed.remove(symbol) {
                Some(m) => rows.push(MetricsRecord::new(
                    universe.sector_of(symbol),
                    universe.company_name(symbol),
                    symbol,
                    &m,
                )),
                None => warn!(symbol, "insufficient data for metrics, skipping"),
            }
        }
        info!(assets = rows.len(), "analysis complete");

        Ok(AnalyticsTable::new(benchmark_row, rows))
    }
}
