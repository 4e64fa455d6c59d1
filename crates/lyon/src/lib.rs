#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/lyon/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod analysis;
pub mod config;
pub mod error;
pub mod universe;

// Re-export main types from sub-crates
pub use lyon_data as data;
pub use lyon_output as output;
pub use lyon_risk as risk;

pub use analysis::Analyzer;
pub use config::Settings;
pub use error::{LyonError, Result};
pub use universe::{SectorUniverse, Universe, european_basket};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
