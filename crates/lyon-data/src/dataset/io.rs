//! CSV persistence for [`Dataset`].
//!
//! A dataset directory holds `prices.csv` and `returns.csv`. The first column
//! is `Date` in `dd/mm/yyyy`, followed by one column per symbol with empty
//! cells for missing values.

use super::{DATE_COLUMN, Dataset, DatedTable};
use crate::error::{DataError, Result};
use polars::prelude::*;
use std::fs::{self, File};
use std::path::Path;
use tracing::debug;

/// Prices file name inside a dataset directory.
pub const PRICES_FILE: &str = "prices.csv";
/// Returns file name inside a dataset directory.
pub const RETURNS_FILE: &str = "returns.csv";
/// Format of the date labels written to disk.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

const READ_FORMATS: [&str; 2] = [DATE_FORMAT, "%Y-%m-%d"];

/// Write both tables under `dir`, creating it if needed.
pub fn write_dataset(dataset: &Dataset, dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)?;
    write_table(dataset.prices(), &dir.join(PRICES_FILE))?;
    write_table(dataset.returns(), &dir.join(RETURNS_FILE))?;
    Ok(())
}

/// Read a dataset previously written by [`write_dataset`].
///
/// ISO dates are accepted as well as `dd/mm/yyyy`.
pub fn read_dataset(dir: &Path) -> Result<Dataset> {
    let prices = read_table(&dir.join(PRICES_FILE))?;
    let returns = read_table(&dir.join(RETURNS_FILE))?;
    Ok(Dataset::from_parts(prices, returns))
}

fn write_table(table: &DatedTable, path: &Path) -> Result<()> {
    let mut df = table.frame().clone();
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_date_format(Some(DATE_FORMAT.to_string()))
        .finish(&mut df)?;
    debug!(path = %path.display(), rows = table.height(), columns = table.width(), "wrote table");
    Ok(())
}

fn read_table(path: &Path) -> Result<DatedTable> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    debug!(path = %path.display(), rows = df.height(), "read table");
    if df.get_column_index(DATE_COLUMN).is_none() {
        return Err(DataError::Parse(format!(
            "{} has no {DATE_COLUMN} column",
            path.display()
        )));
    }
    DatedTable::from_labelled_frame(df, &READ_FORMATS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::{EUR, PriceSeries};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn dataset() -> Dataset {
        let d = |day| NaiveDate::from_ymd_opt(2024, 5, day).unwrap();
        let bench = PriceSeries::new("^STOXX", EUR, vec![(d(2), 100.0), (d(3), 100.5), (d(6), 99.25)]);
        let asset = PriceSeries::new("ASML.AS", EUR, vec![(d(3), 800.0), (d(6), 812.5)]);
        Dataset::from_prices(DatedTable::from_series([&bench, &asset]).unwrap()).unwrap()
    }

    #[test]
    fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let original = dataset();
        write_dataset(&original, dir.path()).unwrap();

        let restored = read_dataset(dir.path()).unwrap();
        assert_eq!(restored.prices().dates(), original.prices().dates());
        assert_eq!(
            restored.prices().symbols().collect::<Vec<_>>(),
            vec!["^STOXX", "ASML.AS"]
        );
        assert_eq!(restored.prices().column("ASML.AS").unwrap()[0], None);
        assert_eq!(restored.prices().column("ASML.AS").unwrap()[2], Some(812.5));
        assert_eq!(restored.returns().height(), original.returns().height());
    }

    #[test]
    fn test_dates_written_day_first() {
        let dir = TempDir::new().unwrap();
        write_dataset(&dataset(), dir.path()).unwrap();
        let text = fs::read_to_string(dir.path().join(PRICES_FILE)).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Date,^STOXX,ASML.AS"));
        assert!(lines.next().unwrap().starts_with("02/05/2024,"));
    }

    #[test]
    fn test_read_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        assert!(read_dataset(&dir.path().join("absent")).is_err());
    }
}
