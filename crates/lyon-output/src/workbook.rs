//! Multi-sheet export of an analytics table.
//!
//! A workbook is a directory with one file per sheet:
//!
//! - `Full Analysis`: every row in report order
//! - one sheet per sector: the sector's assets followed by its average
//! - `Sector Averages`
//! - `Index`: the benchmark row
//!
//! The reduced table is written next to the workbook as `reduced_metrics`.
//! When the workbook cannot be written, the full table is written flat as
//! `sector_analysis` instead.

use crate::export::{ExportError, ExportFormat, Exporter, render_records};
use lyon_risk::{AnalyticsTable, MetricsRecord};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Longest sheet name kept.
pub const MAX_SHEET_NAME: usize = 31;
/// Name of the workbook directory and of the flat fallback file.
pub const WORKBOOK_NAME: &str = "sector_analysis";
/// Name of the reduced table file.
pub const REDUCED_NAME: &str = "reduced_metrics";
/// Sheet with every row.
pub const FULL_SHEET: &str = "Full Analysis";
/// Sheet with the sector averages.
pub const AVERAGES_SHEET: &str = "Sector Averages";
/// Sheet with the benchmark row.
pub const INDEX_SHEET: &str = "Index";

/// Where the analytics ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkbookOutcome {
    /// Workbook directory and its sheet files.
    Structured {
        /// Workbook directory
        dir: PathBuf,
        /// Sheet files in write order
        sheets: Vec<PathBuf>,
    },
    /// Single flat file written after the workbook failed.
    Flat(PathBuf),
}

/// Export of a table as a workbook plus reduced metrics.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkbookExporter {
    format: ExportFormat,
}

impl WorkbookExporter {
    /// Exporter writing every sheet in `format`.
    pub const fn new(format: ExportFormat) -> Self {
        Self { format }
    }

    /// Write `table` under `out_dir`.
    ///
    /// A failed workbook degrades to the flat file; only a failure of the
    /// flat file or of the reduced table is an error.
    pub fn export(
        &self,
        table: &AnalyticsTable,
        out_dir: &Path,
    ) -> Result<WorkbookOutcome, ExportError> {
        fs::create_dir_all(out_dir)?;

        let reduced = out_dir.join(self.file_name(REDUCED_NAME));
        table.reduced().export_to_file(&reduced, self.format)?;

        let dir = out_dir.join(WORKBOOK_NAME);
        match self.write_sheets(table, &dir) {
            Ok(sheets) => {
                info!(dir = %dir.display(), sheets = sheets.len(), "workbook written");
                Ok(WorkbookOutcome::Structured { dir, sheets })
            }
            Err(e) => {
                warn!(error = %e, "workbook export failed, writing flat file");
                let flat = out_dir.join(self.file_name(WORKBOOK_NAME));
                table.export_to_file(&flat, self.format)?;
                Ok(WorkbookOutcome::Flat(flat))
            }
        }
    }

    fn write_sheets(&self, table: &AnalyticsTable, dir: &Path) -> Result<Vec<PathBuf>, ExportError> {
        fs::create_dir_all(dir)?;
        let mut sheets = Vec::new();

        let full: Vec<&MetricsRecord> = table.rows().collect();
        sheets.push(self.write_sheet(dir, FULL_SHEET, &full)?);

        for average in table.averages() {
            let rows: Vec<&MetricsRecord> = table
                .sector_rows(&average.sector)
                .chain(std::iter::once(average))
                .collect();
            sheets.push(self.write_sheet(dir, &average.sector, &rows)?);
        }

        let averages: Vec<&MetricsRecord> = table.averages().iter().collect();
        sheets.push(self.write_sheet(dir, AVERAGES_SHEET, &averages)?);

        if let Some(benchmark) = table.benchmark() {
            sheets.push(self.write_sheet(dir, INDEX_SHEET, &[benchmark])?);
        }

        Ok(sheets)
    }

    fn write_sheet(
        &self,
        dir: &Path,
        name: &str,
        rows: &[&MetricsRecord],
    ) -> Result<PathBuf, ExportError> {
        let path = dir.join(self.file_name(&sheet_name(name)));
        fs::write(&path, render_records(rows, self.format)?)?;
        Ok(path)
    }

    fn file_name(&self, stem: &str) -> String {
        format!("{stem}.{}", self.format.extension())
    }
}

/// Sheet name for a label: path-hostile characters replaced by `_`, then cut
/// to [`MAX_SHEET_NAME`] characters.
pub fn sheet_name(label: &str) -> String {
    label
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '[' | ']' => '_',
            c => c,
        })
        .take(MAX_SHEET_NAME)
        .collect()
}
