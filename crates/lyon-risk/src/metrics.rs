//! Per-asset CAPM metrics and volatility decomposition.
//!
//! With `x` the benchmark's daily returns and `y` the asset's, aligned on the
//! dates both exist:
//!
//! ```text
//! total       = std(y) * sqrt(T)
//! beta, alpha = OLS of y on x (alpha annualized as a * T)
//! systematic  = beta * std(x) * sqrt(T)
//! residual    = sqrt(max(0, total^2 - systematic^2))
//! ```
//!
//! where `T` is the number of trading days per year.

use crate::stats::{ols, pearson, sample_std};
use lyon_data::{PriceSeries, ReturnSeries};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Configuration for metric computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Minimum observations, both raw and after alignment (default: 30)
    pub min_observations: usize,
    /// Trading days per year used for annualization (default: 252)
    pub trading_days: f64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            min_observations: 30,
            trading_days: 252.0,
        }
    }
}

/// Risk/return metrics of one series against the benchmark.
///
/// All rates and volatilities are annualized decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// Annualized OLS intercept
    pub alpha: f64,
    /// OLS slope
    pub beta: f64,
    /// Coefficient of determination
    pub r_squared: f64,
    /// Pearson correlation with the benchmark
    pub correlation: f64,
    /// Annualized geometric return of the price series, NaN when unknown
    pub geometric_return: f64,
    /// Annualized volatility of the asset returns
    pub total_volatility: f64,
    /// Volatility explained by the benchmark
    pub systematic_volatility: f64,
    /// Volatility not explained by the benchmark
    pub residual_volatility: f64,
}

impl Metrics {
    /// Copy with every field rounded to `decimals` places.
    pub fn rounded(&self, decimals: i32) -> Self {
        let r = |v: f64| round_to(v, decimals);
        Self {
            alpha: r(self.alpha),
            beta: r(self.beta),
            r_squared: r(self.r_squared),
            correlation: r(self.correlation),
            geometric_return: r(self.geometric_return),
            total_volatility: r(self.total_volatility),
            systematic_volatility: r(self.systematic_volatility),
            residual_volatility: r(self.residual_volatility),
        }
    }
}

/// Round half away from zero to `decimals` places. NaN stays NaN.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10_f64.powi(decimals);
    (value * scale).round() / scale
}

/// Annualized geometric return of a price series.
///
/// `(last / first)^(T / n) - 1` for `n` prices; NaN with fewer than two.
pub fn geometric_return(prices: Option<&PriceSeries>, trading_days: f64) -> f64 {
    let Some(prices) = prices else {
        return f64::NAN;
    };
    let (Some(first), Some(last)) = (prices.first(), prices.last()) else {
        return f64::NAN;
    };
    let n = prices.len();
    if n < 2 {
        return f64::NAN;
    }
    let years = n as f64 / trading_days;
    let total = last.price / first.price - 1.0;
    (1.0 + total).powf(1.0 / years) - 1.0
}

/// Share of total variance below which the unexplained part is round-off.
const RESIDUAL_TOLERANCE: f64 = 1e-12;

/// `sqrt(total² - systematic²)`, exactly zero once systematic reaches total.
fn residual_volatility(total: f64, systematic: f64) -> f64 {
    let total_variance = total.powi(2);
    let residual_variance = total_variance - systematic.powi(2);
    if residual_variance <= total_variance * RESIDUAL_TOLERANCE {
        0.0
    } else {
        residual_variance.sqrt()
    }
}

/// Computes [`Metrics`] from aligned return series.
#[derive(Debug, Clone, Default)]
pub struct MetricsEngine {
    config: AnalyticsConfig,
}

impl MetricsEngine {
    /// Create an engine.
    pub const fn new(config: AnalyticsConfig) -> Self {
        Self { config }
    }

    /// Metrics of `asset` against `benchmark`.
    ///
    /// `None` when either series, or their date intersection, has fewer than
    /// `min_observations` values, or when the benchmark returns are constant.
    pub fn compute_metrics(
        &self,
        asset: &ReturnSeries,
        benchmark: &ReturnSeries,
        prices: Option<&PriceSeries>,
    ) -> Option<Metrics> {
        let min = self.config.min_observations;
        if asset.len() < min || benchmark.len() < min {
            debug!(
                symbol = asset.symbol(),
                asset = asset.len(),
                benchmark = benchmark.len(),
                "too few observations"
            );
            return None;
        }

        let pairs = asset.align(benchmark);
        if pairs.len() < min {
            debug!(symbol = asset.symbol(), aligned = pairs.len(), "too few aligned observations");
            return None;
        }
        let y: Array1<f64> = pairs.iter().map(|(a, _)| *a).collect();
        let x: Array1<f64> = pairs.iter().map(|(_, b)| *b).collect();

        let annualizer = self.config.trading_days.sqrt();
        let total_volatility = sample_std(y.view())? * annualizer;
        let benchmark_volatility = sample_std(x.view())? * annualizer;
        let fit = ols(y.view(), x.view())?;
        let correlation = pearson(y.view(), x.view()).unwrap_or(f64::NAN);

        let systematic_volatility = fit.beta * benchmark_volatility;
        let residual_volatility = residual_volatility(total_volatility, systematic_volatility);

        Some(Metrics {
            alpha: fit.alpha * self.config.trading_days,
            beta: fit.beta,
            r_squared: fit.r_squared,
            correlation,
            geometric_return: geometric_return(prices, self.config.trading_days),
            total_volatility,
            systematic_volatility,
            residual_volatility,
        })
    }

    /// Metrics of the benchmark against itself.
    ///
    /// Regression outputs take their definitional values instead of being
    /// estimated, so they are exact.
    pub fn benchmark_metrics(
        &self,
        benchmark: &ReturnSeries,
        prices: Option<&PriceSeries>,
    ) -> Option<Metrics> {
        if benchmark.len() < self.config.min_observations {
            return None;
        }
        let x: Array1<f64> = benchmark.values().collect();
        let total_volatility = sample_std(x.view())? * self.config.trading_days.sqrt();

        Some(Metrics {
            alpha: 0.0,
            beta: 1.0,
            r_squared: 1.0,
            correlation: 1.0,
            geometric_return: geometric_return(prices, self.config.trading_days),
            total_volatility,
            systematic_volatility: total_volatility,
            residual_volatility: 0.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Duration, NaiveDate};
    use lyon_data::EUR;
    use rand::{Rng, SeedableRng, rngs::StdRng};
    use rstest::rstest;

    fn dates(n: usize) -> Vec<NaiveDate> {
        let start = NaiveDate::from_ymd_opt(2022, 1, 3).unwrap();
        (0..n).map(|i| start + Duration::days(i as i64)).collect()
    }

    fn returns(symbol: &str, values: &[f64]) -> ReturnSeries {
        ReturnSeries::new(symbol, dates(values.len()).into_iter().zip(values.iter().copied()))
    }

    fn random_path(seed: u64, n: usize) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n).map(|_| rng.gen_range(-0.03..0.03)).collect()
    }

    #[test]
    fn test_config_defaults() {
        let config = AnalyticsConfig::default();
        assert_eq!(config.min_observations, 30);
        assert_eq!(config.trading_days, 252.0);
    }

    #[test]
    fn test_decomposition_identity() {
        let engine = MetricsEngine::default();
        for seed in 0..20 {
            let x = random_path(seed, 300);
            let mut rng = StdRng::seed_from_u64(seed + 1000);
            let beta = rng.gen_range(-1.5..2.5);
            let y: Vec<f64> = x
                .iter()
                .map(|v| 0.0002 + beta * v + rng.gen_range(-0.02..0.02))
                .collect();

            let m = engine
                .compute_metrics(&returns("A", &y), &returns("B", &x), None)
                .unwrap();
            assert_relative_eq!(
                m.systematic_volatility.powi(2) + m.residual_volatility.powi(2),
                m.total_volatility.powi(2),
                epsilon = 1e-10
            );
            assert!(m.residual_volatility >= 0.0);
            assert_relative_eq!(m.r_squared, m.correlation.powi(2), epsilon = 1e-10);
        }
    }

    #[test]
    fn test_identical_series() {
        let x = random_path(42, 120);
        let m = MetricsEngine::default()
            .compute_metrics(&returns("A", &x), &returns("B", &x), None)
            .unwrap();
        assert_relative_eq!(m.beta, 1.0, epsilon = 1e-10);
        assert_relative_eq!(m.correlation, 1.0, epsilon = 1e-10);
        assert_relative_eq!(m.r_squared, 1.0, epsilon = 1e-10);
        assert_relative_eq!(m.alpha, 0.0, epsilon = 1e-10);
        assert_eq!(m.residual_volatility, 0.0);
    }

    #[rstest]
    #[case(2.0)]
    #[case(0.7)]
    #[case(1.3)]
    #[case(-1.1)]
    fn test_scaled_asset(#[case] k: f64) {
        let x = random_path(3, 200);
        let y: Vec<f64> = x.iter().map(|v| k * v).collect();
        let m = MetricsEngine::default()
            .compute_metrics(&returns("A", &y), &returns("B", &x), None)
            .unwrap();
        assert_relative_eq!(m.beta, k, epsilon = 1e-10);
        assert_relative_eq!(m.systematic_volatility.abs(), m.total_volatility, epsilon = 1e-10);
        assert_eq!(m.residual_volatility, 0.0);
    }

    #[test]
    fn test_residual_clamped_when_systematic_exceeds_total() {
        assert_eq!(residual_volatility(0.2, 0.2 * (1.0 + 1e-15)), 0.0);
        assert_eq!(residual_volatility(0.2, 0.25), 0.0);
        assert_eq!(residual_volatility(0.2, -0.25), 0.0);
        assert_eq!(residual_volatility(0.0, 0.0), 0.0);
        assert_relative_eq!(residual_volatility(0.5, 0.3), 0.4, epsilon = 1e-12);
    }

    #[test]
    fn test_constant_asset_has_undefined_fit() {
        let x = random_path(11, 60);
        let y = vec![0.0; 60];
        let m = MetricsEngine::default()
            .compute_metrics(&returns("A", &y), &returns("B", &x), None)
            .unwrap();
        assert_eq!(m.beta, 0.0);
        assert!(m.r_squared.is_nan());
        assert!(m.correlation.is_nan());
        assert_eq!(m.total_volatility, 0.0);
        assert_eq!(m.residual_volatility, 0.0);
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(29)]
    fn test_insufficient_observations(#[case] n: usize) {
        let x = random_path(5, n);
        let engine = MetricsEngine::default();
        assert!(
            engine
                .compute_metrics(&returns("A", &x), &returns("B", &x), None)
                .is_none()
        );
        assert!(engine.benchmark_metrics(&returns("B", &x), None).is_none());
    }

    #[test]
    fn test_insufficient_overlap() {
        // 40 observations each but only 20 shared dates.
        let all = dates(60);
        let x = random_path(8, 60);
        let asset = ReturnSeries::new("A", all[..40].iter().copied().zip(x.iter().copied()));
        let bench = ReturnSeries::new("B", all[20..].iter().copied().zip(x.iter().copied()));
        assert!(
            MetricsEngine::default()
                .compute_metrics(&asset, &bench, None)
                .is_none()
        );
    }

    #[test]
    fn test_constant_benchmark_is_none() {
        let x = vec![0.001; 50];
        let y = random_path(9, 50);
        assert!(
            MetricsEngine::default()
                .compute_metrics(&returns("A", &y), &returns("B", &x), None)
                .is_none()
        );
    }

    #[rstest]
    #[case(1.0)]
    #[case(1000.0)]
    fn test_benchmark_against_itself(#[case] scale: f64) {
        let x: Vec<f64> = random_path(11, 64).iter().map(|v| v * scale / 1000.0).collect();
        let m = MetricsEngine::default()
            .benchmark_metrics(&returns("B", &x), None)
            .unwrap();
        assert_eq!(m.alpha, 0.0);
        assert_eq!(m.beta, 1.0);
        assert_eq!(m.r_squared, 1.0);
        assert_eq!(m.correlation, 1.0);
        assert_eq!(m.residual_volatility, 0.0);
        assert_eq!(m.systematic_volatility, m.total_volatility);
        assert!(m.geometric_return.is_nan());
    }

    #[test]
    fn test_geometric_return_doubling_over_two_years() {
        let n = 504;
        let series = PriceSeries::new(
            "A",
            EUR,
            dates(n)
                .into_iter()
                .enumerate()
                .map(|(i, d)| (d, 1.0 + i as f64 / (n - 1) as f64)),
        );
        assert_relative_eq!(
            geometric_return(Some(&series), 252.0),
            2_f64.sqrt() - 1.0,
            epsilon = 1e-12
        );
        assert_relative_eq!(round_to(geometric_return(Some(&series), 252.0), 4), 0.4142);
    }

    #[test]
    fn test_geometric_return_undefined() {
        let one = PriceSeries::new("A", EUR, vec![(dates(1)[0], 10.0)]);
        assert!(geometric_return(Some(&one), 252.0).is_nan());
        assert!(geometric_return(None, 252.0).is_nan());
    }

    #[test]
    fn test_rounding() {
        assert_eq!(round_to(0.123_456, 4), 0.1235);
        assert_eq!(round_to(-0.000_04, 4), -0.0);
        assert!(round_to(f64::NAN, 4).is_nan());
    }
}
