//! The finalized analytics table.

use crate::sector::{MetricsRecord, sector_averages};
use serde::{Deserialize, Serialize};

/// Sector label of the benchmark row.
pub const INDEX_SECTOR: &str = "Index";
/// Decimal places kept when the table is finalized.
pub const REPORT_DECIMALS: i32 = 4;

/// Benchmark row, asset rows and sector averages, in that order.
///
/// Averages are computed from unrounded asset metrics; every numeric field is
/// rounded to [`REPORT_DECIMALS`] once, when the table is built.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalyticsTable {
    benchmark: Option<MetricsRecord>,
    assets: Vec<MetricsRecord>,
    averages: Vec<MetricsRecord>,
}

impl AnalyticsTable {
    /// Finalize a table from the benchmark record and asset records in
    /// universe order.
    pub fn new(benchmark: Option<MetricsRecord>, assets: Vec<MetricsRecord>) -> Self {
        let averages = sector_averages(&assets);
        let round = |r: &MetricsRecord| r.rounded(REPORT_DECIMALS);
        Self {
            benchmark: benchmark.as_ref().map(round),
            assets: assets.iter().map(round).collect(),
            averages: averages.iter().map(round).collect(),
        }
    }

    /// The benchmark row, when the benchmark had enough history.
    pub const fn benchmark(&self) -> Option<&MetricsRecord> {
        self.benchmark.as_ref()
    }

    /// Asset rows in universe order.
    pub fn assets(&self) -> &[MetricsRecord] {
        &self.assets
    }

    /// Sector-average rows in first-appearance order.
    pub fn averages(&self) -> &[MetricsRecord] {
        &self.averages
    }

    /// Every row in report order.
    pub fn rows(&self) -> impl Iterator<Item = &MetricsRecord> + '_ {
        self.benchmark
            .iter()
            .chain(self.assets.iter())
            .chain(self.averages.iter())
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        usize::from(self.benchmark.is_some()) + self.assets.len() + self.averages.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Asset sectors in first-appearance order.
    pub fn sectors(&self) -> impl Iterator<Item = &str> + '_ {
        self.averages.iter().map(|r| r.sector.as_str())
    }

    /// Asset rows of one sector.
    pub fn sector_rows<'a>(&'a self, sector: &'a str) -> impl Iterator<Item = &'a MetricsRecord> + 'a {
        self.assets.iter().filter(move |r| r.sector == sector)
    }

    /// Condensed per-symbol view of every row.
    pub fn reduced(&self) -> Vec<ReducedRecord> {
        self.rows().map(ReducedRecord::from).collect()
    }
}

/// Condensed row: the headline figures keyed by symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReducedRecord {
    /// Ticker symbol, `-` for averages
    #[serde(rename = "Symbol")]
    pub symbol: String,
    /// Annualized alpha
    #[serde(rename = "Alpha")]
    pub alpha: f64,
    /// Beta
    #[serde(rename = "Beta")]
    pub beta: f64,
    /// R²
    #[serde(rename = "R-squared")]
    pub r_squared: f64,
    /// Annualized geometric return
    #[serde(rename = "AnnualizedGeometricReturn")]
    pub geometric_return: f64,
    /// Annualized total volatility
    #[serde(rename = "TotalVolatility")]
    pub total_volatility: f64,
}

impl From<&MetricsRecord> for ReducedRecord {
    fn from(record: &MetricsRecord) -> Self {
        Self {
            symbol: record.symbol.clone(),
            alpha: record.alpha,
            beta: record.beta,
            r_squared: record.r_squared,
            geometric_return: record.geometric_return,
            total_volatility: record.total_volatility,
        }
    }
}
