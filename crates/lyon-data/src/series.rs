//! Dated price and return series.
//!
//! A [`PriceSeries`] is the unit exchanged between the price sources, the FX
//! converter and the dataset assembler. Dates are strictly increasing with no
//! duplicates; construction enforces this.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Currency code every series is normalized to.
pub const EUR: &str = "EUR";

/// A single dated closing price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Trading date.
    pub date: NaiveDate,
    /// Closing price.
    pub price: f64,
}

/// Ordered closing prices for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    symbol: String,
    currency: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Create a series from unordered observations.
    ///
    /// Observations are sorted by date, non-finite prices are dropped and,
    /// when a date appears more than once, the last observation wins.
    pub fn new(
        symbol: impl Into<String>,
        currency: impl Into<String>,
        observations: impl IntoIterator<Item = (NaiveDate, f64)>,
    ) -> Self {
        let mut sorted: Vec<PricePoint> = observations
            .into_iter()
            .filter(|(_, price)| price.is_finite())
            .map(|(date, price)| PricePoint { date, price })
            .collect();
        sorted.sort_by_key(|p| p.date);

        let mut points: Vec<PricePoint> = Vec::with_capacity(sorted.len());
        for point in sorted {
            match points.last_mut() {
                Some(last) if last.date == point.date => *last = point,
                _ => points.push(point),
            }
        }

        Self {
            symbol: symbol.into(),
            currency: currency.into(),
            points,
        }
    }

    /// Ticker symbol.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Currency the prices are quoted in.
    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Observations in date order.
    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// Number of observations.
    pub const fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the series has no observations.
    pub const fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// First observation.
    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    /// Last observation.
    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// Price on `date`, if observed.
    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.points
            .binary_search_by_key(&date, |p| p.date)
            .ok()
            .map(|i| self.points[i].price)
    }

    /// Iterator over the observation dates.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.points.iter().map(|p| p.date)
    }

    /// Iterator over the prices.
    pub fn prices(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.price)
    }

    /// Same dates, prices transformed by `f`, quoted in `currency`.
    pub fn map_prices(&self, currency: impl Into<String>, f: impl Fn(f64) -> f64) -> Self {
        Self {
            symbol: self.symbol.clone(),
            currency: currency.into(),
            points: self
                .points
                .iter()
                .map(|p| PricePoint {
                    date: p.date,
                    price: f(p.price),
                })
                .collect(),
        }
    }

    /// Rename the series.
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = symbol.into();
        self
    }

    /// Simple daily returns derived from consecutive observations.
    pub fn returns(&self) -> ReturnSeries {
        ReturnSeries::from_prices(self)
    }
}

/// A single dated return.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnPoint {
    /// Trading date.
    pub date: NaiveDate,
    /// Simple return versus the previous observation.
    pub value: f64,
}

/// Defined daily returns for one symbol.
///
/// Dates without a return (the first observation of a price series, or a day
/// whose neighbour is missing) are simply absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnSeries {
    symbol: String,
    points: Vec<ReturnPoint>,
}

impl ReturnSeries {
    /// Create a return series from dated values, dropping non-finite entries.
    ///
    /// As with [`PriceSeries::new`], the last value for a repeated date wins.
    pub fn new(
        symbol: impl Into<String>,
        observations: impl IntoIterator<Item = (NaiveDate, f64)>,
    ) -> Self {
        let mut sorted: Vec<ReturnPoint> = observations
            .into_iter()
            .filter(|(_, value)| value.is_finite())
            .map(|(date, value)| ReturnPoint { date, value })
            .collect();
        sorted.sort_by_key(|p| p.date);

        let mut points: Vec<ReturnPoint> = Vec::with_capacity(sorted.len());
        for point in sorted {
            match points.last_mut() {
                Some(last) if last.date == point.date => *last = point,
                _ => points.push(point),
            }
        }

        Self {
            symbol: symbol.into(),
            points,
        }
    }

    /// Derive `price(t) / price(t-1) - 1` for every observation after the first.
    pub fn from_prices(prices: &PriceSeries) -> Self {
        let points = prices
            .points()
            .windows(2)
            .filter(|w| w[0].price != 0.0)
            .map(|w| ReturnPoint {
                date: w[1].date,
                value: w[1].price / w[0].price - 1.0,
            })
            .collect();

        Self {
            symbol: prices.symbol().to_string(),
            points,
        }
    }

    /// Ticker symbol.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Returns in date order.
    pub fn points(&self) -> &[ReturnPoint] {
        &self.points
    }

    /// Number of defined returns.
    pub const fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether no return is defined.
    pub const fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Return on `date`, if defined.
    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.points
            .binary_search_by_key(&date, |p| p.date)
            .ok()
            .map(|i| self.points[i].value)
    }

    /// Iterator over the return values.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.value)
    }

    /// Pairs of `(self, other)` values on the dates where both are defined.
    pub fn align(&self, other: &Self) -> Vec<(f64, f64)> {
        let mut pairs = Vec::with_capacity(self.len().min(other.len()));
        let (mut i, mut j) = (0, 0);
        while i < self.points.len() && j < other.points.len() {
            let (a, b) = (&self.points[i], &other.points[j]);
            match a.date.cmp(&b.date) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    pairs.push((a.value, b.value));
                    i += 1;
                    j += 1;
                }
            }
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn test_new_sorts_and_deduplicates() {
        let series = PriceSeries::new(
            "AIR.PA",
            EUR,
            vec![(d(3), 12.0), (d(1), 10.0), (d(2), 11.0), (d(2), 11.5)],
        );
        let dates: Vec<_> = series.dates().collect();
        assert_eq!(dates, vec![d(1), d(2), d(3)]);
        assert_eq!(series.get(d(2)), Some(11.5));
    }

    #[test]
    fn test_new_drops_non_finite_prices() {
        let series = PriceSeries::new("X", EUR, vec![(d(1), f64::NAN), (d(2), 5.0)]);
        assert_eq!(series.len(), 1);
        assert_eq!(series.first().unwrap().date, d(2));
    }

    #[test]
    fn test_returns_skip_first_observation() {
        let series = PriceSeries::new("X", EUR, vec![(d(1), 100.0), (d(2), 110.0), (d(3), 99.0)]);
        let returns = series.returns();
        assert_eq!(returns.len(), 2);
        assert_eq!(returns.get(d(1)), None);
        assert_relative_eq!(returns.get(d(2)).unwrap(), 0.10, epsilon = 1e-12);
        assert_relative_eq!(returns.get(d(3)).unwrap(), -0.10, epsilon = 1e-12);
    }

    #[test]
    fn test_align_keeps_common_dates() {
        let a = ReturnSeries::new("A", vec![(d(2), 0.01), (d(3), 0.02), (d(5), 0.03)]);
        let b = ReturnSeries::new("B", vec![(d(1), 0.1), (d(3), 0.2), (d(5), 0.3)]);
        assert_eq!(a.align(&b), vec![(0.02, 0.2), (0.03, 0.3)]);
    }

    #[test]
    fn test_repeated_date_keeps_last_value() {
        let prices = PriceSeries::new("X", EUR, vec![(d(2), 1.0), (d(2), 2.0)]);
        let returns = ReturnSeries::new("X", vec![(d(2), 0.01), (d(1), 0.5), (d(2), 0.02)]);
        assert_eq!(prices.get(d(2)), Some(2.0));
        assert_eq!(returns.len(), 2);
        assert_eq!(returns.get(d(2)), Some(0.02));
    }
}
