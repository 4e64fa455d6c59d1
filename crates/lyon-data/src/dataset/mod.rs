//! Aligned price and return matrices for a universe plus its benchmark.
//!
//! Assembly fetches every symbol concurrently, converts prices to EUR,
//! merges them on the union of trading dates and derives daily returns.
//! Symbols that fail to download are logged and left out.

pub mod io;
pub mod table;

pub use io::{read_dataset, write_dataset};
pub use table::{DATE_COLUMN, DatedTable};

use crate::benchmark::Benchmark;
use crate::error::Result;
use crate::fx::{ExchangeSuffixTable, FxTable, convert};
use crate::series::PriceSeries;
use crate::source::PriceSource;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use tracing::{info, warn};

/// Forward-filled prices and their daily returns.
///
/// The benchmark is always the first column of both tables.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    prices: DatedTable,
    returns: DatedTable,
}

impl Dataset {
    /// Derive a dataset from raw, gap-bearing prices.
    ///
    /// Prices are forward-filled, returns are the percentage change of the
    /// filled prices, and rows missing in every column are dropped from each
    /// table independently.
    pub fn from_prices(prices: DatedTable) -> Result<Self> {
        let prices = prices.forward_filled()?;
        let returns = prices.pct_change()?.without_empty_rows()?;
        let prices = prices.without_empty_rows()?;
        Ok(Self { prices, returns })
    }

    /// Pair two already-derived tables, as read back from disk.
    pub const fn from_parts(prices: DatedTable, returns: DatedTable) -> Self {
        Self { prices, returns }
    }

    /// Forward-filled EUR prices.
    pub const fn prices(&self) -> &DatedTable {
        &self.prices
    }

    /// Daily simple returns.
    pub const fn returns(&self) -> &DatedTable {
        &self.returns
    }

    /// Symbol of the first column.
    pub fn benchmark_symbol(&self) -> Option<&str> {
        self.prices.symbols().next()
    }

    /// Non-benchmark symbols in column order.
    pub fn asset_symbols(&self) -> impl Iterator<Item = &str> + '_ {
        self.prices.symbols().skip(1)
    }
}

/// Default number of in-flight downloads.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Builds a [`Dataset`] from a [`PriceSource`].
#[derive(Debug, Clone, Default)]
pub struct DatasetAssembler {
    fx: FxTable,
    suffixes: ExchangeSuffixTable,
    concurrency: Option<usize>,
}

impl DatasetAssembler {
    /// Assembler converting with the given tables.
    pub const fn new(fx: FxTable, suffixes: ExchangeSuffixTable) -> Self {
        Self {
            fx,
            suffixes,
            concurrency: None,
        }
    }

    /// Limit concurrent downloads (at least one).
    pub const fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = Some(concurrency);
        self
    }

    /// Assemble without progress reporting.
    pub async fn assemble<S: PriceSource>(
        &self,
        source: &S,
        benchmark: &Benchmark,
        symbols: &[String],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Dataset> {
        self.assemble_with_progress(source, benchmark, symbols, start, end, |_, _| {})
            .await
    }

    /// Assemble, calling `progress(symbol, fetched)` as each download settles.
    ///
    /// The benchmark series is inserted first and unconverted; the remaining
    /// columns follow `symbols` order. A symbol equal to the benchmark symbol
    /// is not fetched twice.
    pub async fn assemble_with_progress<S, F>(
        &self,
        source: &S,
        benchmark: &Benchmark,
        symbols: &[String],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        progress: F,
    ) -> Result<Dataset>
    where
        S: PriceSource,
        F: Fn(&str, bool),
    {
        let wanted: Vec<&String> = symbols
            .iter()
            .filter(|s| s.as_str() != benchmark.symbol())
            .collect();
        let concurrency = self.concurrency.unwrap_or(DEFAULT_CONCURRENCY).max(1);
        info!(symbols = wanted.len(), concurrency, "downloading prices");

        let results: Vec<(&String, Result<PriceSeries>)> = stream::iter(wanted)
            .map(|symbol| async move { (symbol, source.fetch_prices(symbol, start, end).await) })
            .buffer_unordered(concurrency)
            .collect()
            .await;

        let mut fetched: HashMap<&str, PriceSeries> = HashMap::with_capacity(results.len());
        for (symbol, result) in results {
            match result {
                Ok(series) if !series.is_empty() => {
                    progress(symbol, true);
                    fetched.insert(symbol.as_str(), series);
                }
                Ok(_) => {
                    warn!(symbol = %symbol, "no prices returned, skipping");
                    progress(symbol, false);
                }
                Err(e) => {
                    warn!(symbol = %symbol, error = %e, "download failed, skipping");
                    progress(symbol, false);
                }
            }
        }

        let mut columns = Vec::with_capacity(fetched.len() + 1);
        columns.push(benchmark.series().clone());
        for symbol in symbols {
            if let Some(series) = fetched.remove(symbol.as_str()) {
                let currency = self.suffixes.currency_for(symbol);
                columns.push(convert(&series, currency, &self.fx));
            }
        }
        info!(
            columns = columns.len(),
            benchmark = benchmark.symbol(),
            "assembled price matrix"
        );

        Dataset::from_prices(DatedTable::from_series(&columns)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::benchmark::BenchmarkKind;
    use crate::series::EUR;
    use crate::source::InMemorySource;
    use approx::assert_relative_eq;
    use chrono::{NaiveDate, TimeZone};
    use std::cell::RefCell;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, day).unwrap()
    }

    fn window() -> (DateTime<Utc>, DateTime<Utc>) {
        (
            Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 4, 30, 0, 0, 0).unwrap(),
        )
    }

    fn benchmark() -> Benchmark {
        Benchmark::new(
            BenchmarkKind::Primary,
            PriceSeries::new("^STOXX", EUR, vec![(d(1), 100.0), (d(2), 101.0), (d(3), 102.0)]),
        )
    }

    fn source() -> InMemorySource {
        InMemorySource::new()
            .with(PriceSeries::new("AIR.PA", EUR, vec![(d(1), 50.0), (d(3), 55.0)]))
            .with(PriceSeries::new("LGEN.L", "LOCAL", vec![(d(2), 2.0), (d(3), 2.2)]))
    }

    fn symbols() -> Vec<String> {
        ["LGEN.L", "MISSING.DE", "AIR.PA"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_assemble_orders_and_converts() {
        let (start, end) = window();
        let dataset = DatasetAssembler::default()
            .assemble(&source(), &benchmark(), &symbols(), start, end)
            .await
            .unwrap();

        let prices = dataset.prices();
        assert_eq!(
            prices.symbols().collect::<Vec<_>>(),
            vec!["^STOXX", "LGEN.L", "AIR.PA"]
        );
        assert_eq!(dataset.benchmark_symbol(), Some("^STOXX"));
        assert_eq!(prices.dates(), vec![d(1), d(2), d(3)]);

        let lgen = prices.column("LGEN.L").unwrap();
        assert_eq!(lgen[0], None);
        assert_relative_eq!(lgen[1].unwrap(), 2.0 * 1.15, epsilon = 1e-12);

        // Forward-filled gap yields a zero return.
        let air = prices.column("AIR.PA").unwrap();
        assert_eq!(air[1], Some(50.0));
        assert_eq!(dataset.returns().column("AIR.PA").unwrap()[0], Some(0.0));
    }

    #[tokio::test]
    async fn test_returns_drop_leading_row() {
        let (start, end) = window();
        let dataset = DatasetAssembler::default()
            .with_concurrency(1)
            .assemble(&source(), &benchmark(), &symbols(), start, end)
            .await
            .unwrap();

        assert_eq!(dataset.returns().dates(), vec![d(2), d(3)]);
        let bench = dataset.returns().column("^STOXX").unwrap();
        assert_relative_eq!(bench[0].unwrap(), 0.01, epsilon = 1e-12);
    }

    #[tokio::test]
    async fn test_progress_reports_every_symbol() {
        let (start, end) = window();
        let seen = RefCell::new(Vec::new());
        DatasetAssembler::default()
            .assemble_with_progress(&source(), &benchmark(), &symbols(), start, end, |s, ok| {
                seen.borrow_mut().push((s.to_string(), ok));
            })
            .await
            .unwrap();

        let mut seen = seen.into_inner();
        seen.sort();
        assert_eq!(
            seen,
            vec![
                ("AIR.PA".to_string(), true),
                ("LGEN.L".to_string(), true),
                ("MISSING.DE".to_string(), false),
            ]
        );
    }

    #[tokio::test]
    async fn test_benchmark_symbol_not_duplicated() {
        let (start, end) = window();
        let symbols = vec!["^STOXX".to_string(), "AIR.PA".to_string()];
        let dataset = DatasetAssembler::default()
            .assemble(&source(), &benchmark(), &symbols, start, end)
            .await
            .unwrap();
        assert_eq!(dataset.prices().width(), 2);
    }
}
