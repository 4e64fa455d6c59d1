#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/lyon/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod export;
pub mod render;
pub mod workbook;

pub use export::{ExportError, ExportFormat, Exporter};
pub use render::to_ascii_table;
pub use workbook::{WorkbookExporter, WorkbookOutcome, sheet_name};
