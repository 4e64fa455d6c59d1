//! Labelled metric records and per-sector averages.

use crate::metrics::Metrics;
use serde::{Deserialize, Serialize};

/// Company label of a sector-average row.
pub const AVERAGE_COMPANY: &str = "AVERAGE";
/// Symbol placeholder of a sector-average row.
pub const AVERAGE_SYMBOL: &str = "-";

/// One row of the analytics table.
///
/// Field order and names match the exported column layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    /// Sector label
    #[serde(rename = "Sector")]
    pub sector: String,
    /// Company display name
    #[serde(rename = "Company")]
    pub company: String,
    /// Ticker symbol
    #[serde(rename = "Symbol")]
    pub symbol: String,
    /// Annualized alpha
    #[serde(rename = "Alpha")]
    pub alpha: f64,
    /// Beta against the benchmark
    #[serde(rename = "Beta")]
    pub beta: f64,
    /// R² of the market regression
    #[serde(rename = "R-squared")]
    pub r_squared: f64,
    /// Correlation with the benchmark
    #[serde(rename = "Correlation")]
    pub correlation: f64,
    /// Annualized geometric return
    #[serde(rename = "AnnualizedGeometricReturn")]
    pub geometric_return: f64,
    /// Annualized total volatility
    #[serde(rename = "TotalVolatility")]
    pub total_volatility: f64,
    /// Annualized systematic volatility
    #[serde(rename = "SystematicVolatility")]
    pub systematic_volatility: f64,
    /// Annualized residual volatility
    #[serde(rename = "ResidualVolatility")]
    pub residual_volatility: f64,
}

impl MetricsRecord {
    /// Label a set of metrics.
    pub fn new(
        sector: impl Into<String>,
        company: impl Into<String>,
        symbol: impl Into<String>,
        metrics: &Metrics,
    ) -> Self {
        Self {
            sector: sector.into(),
            company: company.into(),
            symbol: symbol.into(),
            alpha: metrics.alpha,
            beta: metrics.beta,
            r_squared: metrics.r_squared,
            correlation: metrics.correlation,
            geometric_return: metrics.geometric_return,
            total_volatility: metrics.total_volatility,
            systematic_volatility: metrics.systematic_volatility,
            residual_volatility: metrics.residual_volatility,
        }
    }

    /// The numeric fields.
    pub const fn metrics(&self) -> Metrics {
        Metrics {
            alpha: self.alpha,
            beta: self.beta,
            r_squared: self.r_squared,
            correlation: self.correlation,
            geometric_return: self.geometric_return,
            total_volatility: self.total_volatility,
            systematic_volatility: self.systematic_volatility,
            residual_volatility: self.residual_volatility,
        }
    }

    /// Copy with numeric fields rounded to `decimals` places.
    pub fn rounded(&self, decimals: i32) -> Self {
        Self::new(
            self.sector.clone(),
            self.company.clone(),
            self.symbol.clone(),
            &self.metrics().rounded(decimals),
        )
    }
}

/// Unweighted mean of every numeric field, per sector.
///
/// Sectors appear in the order they are first met in `records`. NaN fields
/// propagate into their sector's mean.
pub fn sector_averages(records: &[MetricsRecord]) -> Vec<MetricsRecord> {
    let mut groups: Vec<(&str, Vec<Metrics>)> = Vec::new();
    for record in records {
        match groups.iter_mut().find(|(sector, _)| *sector == record.sector) {
            Some((_, members)) => members.push(record.metrics()),
            None => groups.push((record.sector.as_str(), vec![record.metrics()])),
        }
    }

    groups
        .into_iter()
        .map(|(sector, members)| {
            MetricsRecord::new(sector, AVERAGE_COMPANY, AVERAGE_SYMBOL, &mean_of(&members))
        })
        .collect()
}

fn mean_of(members: &[Metrics]) -> Metrics {
    let n = members.len() as f64;
    let avg = |f: fn(&Metrics) -> f64| members.iter().map(f).sum::<f64>() / n;
    Metrics {
        alpha: avg(|m| m.alpha),
        beta: avg(|m| m.beta),
        r_squared: avg(|m| m.r_squared),
        correlation: avg(|m| m.correlation),
        geometric_return: avg(|m| m.geometric_return),
        total_volatility: avg(|m| m.total_volatility),
        systematic_volatility: avg(|m| m.systematic_volatility),
        residual_volatility: avg(|m| m.residual_volatility),
    }
}
