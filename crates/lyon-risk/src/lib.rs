#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/lyon/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod metrics;
pub mod sector;
pub mod stats;
pub mod table;

// Re-export main types
pub use metrics::{AnalyticsConfig, Metrics, MetricsEngine, geometric_return};
pub use sector::{MetricsRecord, sector_averages};
pub use table::{AnalyticsTable, ReducedRecord};
