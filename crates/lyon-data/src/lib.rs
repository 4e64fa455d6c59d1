#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/lyon/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod benchmark;
pub mod dataset;
pub mod error;
pub mod fx;
pub mod series;
pub mod source;
pub mod yahoo;

pub use benchmark::{Benchmark, BenchmarkBuilder, BenchmarkConfig, BenchmarkKind};
pub use dataset::{Dataset, DatasetAssembler, DatedTable};
pub use error::{DataError, Result};
pub use fx::{ExchangeSuffixTable, FxTable};
pub use series::{EUR, PriceSeries, ReturnSeries};
pub use source::{InMemorySource, PriceSource, RetryPolicy, RetryingSource};
pub use yahoo::YahooQuoteProvider;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
