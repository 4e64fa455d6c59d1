//! CSV and JSON export of analytics tables.

use lyon_risk::{AnalyticsTable, MetricsRecord, ReducedRecord};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid format error.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// Comma-separated values format.
    #[default]
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "pretty-json" | "pretty_json" | "prettyjson" => Ok(Self::PrettyJson),
            other => Err(ExportError::InvalidFormat(other.to_string())),
        }
    }
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

/// Serialize `records` as one table: a header row then one line per record.
pub(crate) fn render_records<T: Serialize>(
    records: &[T],
    format: ExportFormat,
) -> Result<String, ExportError> {
    match format {
        ExportFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(vec![]);
            for record in records {
                wtr.serialize(record)?;
            }
            let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
            String::from_utf8(bytes).map_err(|e| ExportError::InvalidFormat(e.to_string()))
        }
        ExportFormat::Json => Ok(serde_json::to_string(records)?),
        ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(records)?),
    }
}

impl Exporter for AnalyticsTable {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        let rows: Vec<&MetricsRecord> = self.rows().collect();
        render_records(&rows, format)
    }
}

impl Exporter for [MetricsRecord] {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        render_records(self, format)
    }
}

impl Exporter for [ReducedRecord] {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        render_records(self, format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lyon_risk::Metrics;
    use rstest::rstest;

    fn table() -> AnalyticsTable {
        let m = Metrics {
            alpha: 0.0123,
            beta: 1.1,
            r_squared: 0.64,
            correlation: 0.8,
            geometric_return: f64::NAN,
            total_volatility: 0.25,
            systematic_volatility: 0.2,
            residual_volatility: 0.15,
        };
        AnalyticsTable::new(
            Some(MetricsRecord::new("Index", "Eurostoxx", "^STOXX", &m)),
            vec![MetricsRecord::new("Health Care", "SANOFI", "SAN.PA", &m)],
        )
    }

    #[test]
    fn test_table_csv_layout() {
        let csv = table().export_to_string(ExportFormat::Csv).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some(
                "Sector,Company,Symbol,Alpha,Beta,R-squared,Correlation,\
                 AnnualizedGeometricReturn,TotalVolatility,SystematicVolatility,ResidualVolatility"
            )
        );
        assert!(lines.next().unwrap().starts_with("Index,Eurostoxx,^STOXX,0.0123,1.1,"));
        assert!(lines.next().unwrap().starts_with("Health Care,SANOFI,SAN.PA,"));
        assert!(lines.next().unwrap().starts_with("Health Care,AVERAGE,-,"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_table_json() {
        let json = table().export_to_string(ExportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let rows = value.as_array().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1]["Symbol"], "SAN.PA");
        assert!(rows[1]["AnnualizedGeometricReturn"].is_null());
    }

    #[test]
    fn test_reduced_csv() {
        let reduced = table().reduced();
        let csv = reduced.export_to_string(ExportFormat::Csv).unwrap();
        assert!(csv.starts_with(
            "Symbol,Alpha,Beta,R-squared,AnnualizedGeometricReturn,TotalVolatility\n"
        ));
        assert_eq!(csv.lines().count(), 4);
    }

    #[test]
    fn test_pretty_json_is_indented() {
        let json = table().export_to_string(ExportFormat::PrettyJson).unwrap();
        assert!(json.contains("\n  "));
    }

    #[rstest]
    #[case("csv", ExportFormat::Csv)]
    #[case("JSON", ExportFormat::Json)]
    #[case("pretty-json", ExportFormat::PrettyJson)]
    fn test_parse_format(#[case] input: &str, #[case] expected: ExportFormat) {
        assert_eq!(input.parse::<ExportFormat>().unwrap(), expected);
    }

    #[test]
    fn test_parse_unknown_format() {
        assert!(matches!(
            "xlsx".parse::<ExportFormat>(),
            Err(ExportError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_export_format_extension() {
        assert_eq!(ExportFormat::Csv.extension(), "csv");
        assert_eq!(ExportFormat::Json.extension(), "json");
        assert_eq!(ExportFormat::PrettyJson.extension(), "json");
    }
}
