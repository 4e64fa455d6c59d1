//! Date-indexed matrix with one nullable column per symbol.
//!
//! A [`DatedTable`] wraps a polars [`DataFrame`] whose first column is
//! [`DATE_COLUMN`] (`Date` dtype, ascending) followed by one `f64` column per
//! symbol in insertion order. Nulls are missing observations.

use crate::error::{DataError, Result};
use crate::series::{EUR, PriceSeries, ReturnSeries};
use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::HashSet;

/// Name of the date column.
pub const DATE_COLUMN: &str = "Date";

/// Ascending dates × symbols, column order preserved.
#[derive(Debug, Clone)]
pub struct DatedTable {
    frame: DataFrame,
}

impl Default for DatedTable {
    fn default() -> Self {
        Self {
            frame: DataFrame::empty(),
        }
    }
}

impl PartialEq for DatedTable {
    fn eq(&self, other: &Self) -> bool {
        self.frame.equals_missing(&other.frame)
    }
}

fn series_frame(series: &PriceSeries) -> PolarsResult<LazyFrame> {
    let dates: Vec<NaiveDate> = series.dates().collect();
    let prices: Vec<f64> = series.prices().collect();
    let frame = DataFrame::new(vec![
        Column::new(DATE_COLUMN.into(), dates),
        Column::new(series.symbol().into(), prices),
    ])?;
    Ok(frame.lazy())
}

impl DatedTable {
    /// Full-join series on their dates.
    ///
    /// Column order follows the input; a repeated symbol is ignored.
    pub fn from_series<'a>(series: impl IntoIterator<Item = &'a PriceSeries>) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut merged: Option<LazyFrame> = None;

        for s in series {
            if s.symbol() == DATE_COLUMN || !seen.insert(s.symbol()) {
                continue;
            }
            let next = series_frame(s)?;
            merged = Some(match merged {
                None => next,
                Some(left) => left.join(
                    next,
                    [col(DATE_COLUMN)],
                    [col(DATE_COLUMN)],
                    JoinArgs::new(JoinType::Full).with_coalesce(JoinCoalesce::CoalesceColumns),
                ),
            });
        }

        let Some(merged) = merged else {
            return Ok(Self::default());
        };
        let frame = merged
            .sort([DATE_COLUMN], SortMultipleOptions::default())
            .collect()?;
        Ok(Self { frame })
    }

    /// Adopt a frame carrying string date labels, as read from CSV.
    ///
    /// Labels are parsed with the first matching format; every other column
    /// is cast to `f64` and rows are sorted by date.
    pub fn from_labelled_frame(mut frame: DataFrame, date_formats: &[&str]) -> Result<Self> {
        let labels = frame
            .column(DATE_COLUMN)?
            .cast(&DataType::String)?
            .as_materialized_series()
            .str()?
            .clone();
        let mut dates = Vec::with_capacity(labels.len());
        for label in labels.into_iter() {
            let label = label.ok_or_else(|| DataError::Parse("missing date label".to_string()))?;
            dates.push(parse_date(label.trim(), date_formats)?);
        }
        frame.with_column(Column::new(DATE_COLUMN.into(), dates))?;

        let mut select = vec![col(DATE_COLUMN)];
        select.extend(
            frame
                .get_columns()
                .iter()
                .map(|c| c.name().as_str())
                .filter(|name| *name != DATE_COLUMN)
                .map(|name| col(name).cast(DataType::Float64)),
        );
        let frame = frame
            .lazy()
            .select(select)
            .sort([DATE_COLUMN], SortMultipleOptions::default())
            .collect()?;
        Ok(Self { frame })
    }

    /// Underlying frame.
    pub const fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// Row dates, ascending.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.frame
            .column(DATE_COLUMN)
            .ok()
            .and_then(|c| c.as_materialized_series().date().ok())
            .map(|dates| dates.as_date_iter().flatten().collect())
            .unwrap_or_default()
    }

    /// Column symbols in insertion order.
    pub fn symbols(&self) -> impl Iterator<Item = &str> + '_ {
        self.frame
            .get_columns()
            .iter()
            .map(|c| c.name().as_str())
            .filter(|name| *name != DATE_COLUMN)
    }

    /// Values for `symbol`, aligned on [`Self::dates`].
    pub fn column(&self, symbol: &str) -> Option<Vec<Option<f64>>> {
        if symbol == DATE_COLUMN {
            return None;
        }
        let values = self.frame.column(symbol).ok()?;
        let values = values.as_materialized_series().f64().ok()?;
        Some(values.into_iter().collect())
    }

    /// Whether `symbol` has a column.
    pub fn contains(&self, symbol: &str) -> bool {
        symbol != DATE_COLUMN && self.frame.get_column_index(symbol).is_some()
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// Number of symbol columns.
    pub fn width(&self) -> usize {
        self.symbols().count()
    }

    /// Replace every gap with the last known value of its column.
    /// Leading gaps stay missing.
    pub fn forward_filled(&self) -> Result<Self> {
        Ok(Self {
            frame: self.frame.fill_null(FillNullStrategy::Forward(None))?,
        })
    }

    /// Per-column `x(t) / x(t-1) - 1` against the preceding row.
    ///
    /// Missing when either side is missing or the previous value is zero; the
    /// first row is always missing.
    pub fn pct_change(&self) -> Result<Self> {
        if self.width() == 0 {
            return Ok(self.clone());
        }
        let mut select = vec![col(DATE_COLUMN)];
        select.extend(self.symbols().map(|s| {
            let previous = col(s).shift(lit(1));
            when(previous.clone().neq(lit(0.0)))
                .then(col(s) / previous - lit(1.0))
                .otherwise(Expr::Literal(LiteralValue::Null).cast(DataType::Float64))
                .alias(s)
        }));
        let frame = self.frame.clone().lazy().select(select).collect()?;
        Ok(Self { frame })
    }

    /// Remove rows where every column is missing.
    pub fn without_empty_rows(&self) -> Result<Self> {
        let present: Vec<Expr> = self.symbols().map(|s| col(s).is_not_null()).collect();
        if present.is_empty() {
            return Ok(Self::default());
        }
        let frame = self
            .frame
            .clone()
            .lazy()
            .filter(any_horizontal(present)?)
            .collect()?;
        Ok(Self { frame })
    }

    /// Per-date mean of the values present, as a EUR series named `symbol`.
    ///
    /// Dates where no column has a value are left out.
    pub fn row_mean(&self, symbol: &str) -> Result<PriceSeries> {
        let columns: Vec<Expr> = self.symbols().map(col).collect();
        if columns.is_empty() {
            return Ok(PriceSeries::new(symbol, EUR, Vec::new()));
        }
        let frame = self
            .frame
            .clone()
            .lazy()
            .select([col(DATE_COLUMN), mean_horizontal(columns, true)?.alias(symbol)])
            .collect()?;
        Ok(Self { frame }
            .price_series(symbol)
            .unwrap_or_else(|| PriceSeries::new(symbol, EUR, Vec::new())))
    }

    /// Defined values of `symbol` as a EUR price series.
    pub fn price_series(&self, symbol: &str) -> Option<PriceSeries> {
        self.column(symbol)
            .map(|values| PriceSeries::new(symbol, EUR, self.defined(values)))
    }

    /// Defined values of `symbol` as a return series.
    pub fn return_series(&self, symbol: &str) -> Option<ReturnSeries> {
        self.column(symbol)
            .map(|values| ReturnSeries::new(symbol, self.defined(values)))
    }

    fn defined(&self, values: Vec<Option<f64>>) -> Vec<(NaiveDate, f64)> {
        self.dates()
            .into_iter()
            .zip(values)
            .filter_map(|(date, value)| value.map(|v| (date, v)))
            .collect()
    }
}

fn parse_date(label: &str, formats: &[&str]) -> Result<NaiveDate> {
    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(label, fmt).ok())
        .ok_or_else(|| DataError::Parse(format!("unrecognized date {label:?}")))
}
