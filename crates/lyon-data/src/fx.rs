//! Fixed-rate currency normalization.
//!
//! Prices are brought to EUR with a static rate table. The currency of a
//! symbol is inferred from its exchange suffix (`LGEN.L` trades in GBP).
//! Neither table is an error source: an unknown suffix is EUR and an unknown
//! currency converts at 1.0.

use crate::series::{EUR, PriceSeries};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Currency code to EUR conversion factor (1 unit = `rate` EUR).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FxTable {
    rates: BTreeMap<String, f64>,
}

impl FxTable {
    /// Build a table from `(currency, rate)` pairs. EUR is always 1.0.
    pub fn new(rates: impl IntoIterator<Item = (String, f64)>) -> Self {
        let mut rates: BTreeMap<String, f64> = rates.into_iter().collect();
        rates.insert(EUR.to_string(), 1.0);
        Self { rates }
    }

    /// EUR rate for `currency`; 1.0 when the currency is unknown.
    pub fn rate(&self, currency: &str) -> f64 {
        self.rates.get(currency).copied().unwrap_or(1.0)
    }

    /// All configured rates.
    pub const fn rates(&self) -> &BTreeMap<String, f64> {
        &self.rates
    }
}

impl Default for FxTable {
    fn default() -> Self {
        Self::new(
            [
                ("GBP", 1.15),
                ("CHF", 0.95),
                ("SEK", 0.086),
                ("DKK", 0.134),
                ("NOK", 0.086),
                ("USD", 0.85),
            ]
            .into_iter()
            .map(|(code, rate)| (code.to_string(), rate)),
        )
    }
}

/// Exchange suffix (`.L`, `.SW`, ...) to currency code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExchangeSuffixTable {
    currencies: BTreeMap<String, String>,
}

impl ExchangeSuffixTable {
    /// Build a table from `(suffix, currency)` pairs. Suffixes include the dot.
    pub fn new(currencies: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            currencies: currencies.into_iter().collect(),
        }
    }

    /// Currency for `symbol`, EUR when the suffix is absent or unknown.
    pub fn currency_for(&self, symbol: &str) -> &str {
        symbol
            .rfind('.')
            .and_then(|i| self.currencies.get(&symbol[i..]))
            .map_or(EUR, String::as_str)
    }

    /// All configured suffixes.
    pub const fn currencies(&self) -> &BTreeMap<String, String> {
        &self.currencies
    }
}

impl Default for ExchangeSuffixTable {
    fn default() -> Self {
        Self::new(
            [
                (".L", "GBP"),
                (".SW", "CHF"),
                (".BR", "EUR"),
                (".PA", "EUR"),
                (".AS", "EUR"),
                (".DE", "EUR"),
                (".MC", "EUR"),
                (".ST", "SEK"),
                (".MI", "EUR"),
                (".CO", "DKK"),
                (".OL", "NOK"),
                (".VI", "EUR"),
                (".LS", "EUR"),
                (".HE", "EUR"),
                (".I", "EUR"),
            ]
            .into_iter()
            .map(|(suffix, code)| (suffix.to_string(), code.to_string())),
        )
    }
}

/// Convert `series`, quoted in `currency`, to EUR.
///
/// An EUR series is returned unchanged; otherwise every price is scaled by the
/// table rate.
pub fn convert(series: &PriceSeries, currency: &str, fx: &FxTable) -> PriceSeries {
    if currency == EUR {
        return series.clone();
    }
    let rate = fx.rate(currency);
    series.map_prices(EUR, |price| price * rate)
}
