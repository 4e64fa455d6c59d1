//! Error types for analysis runs.

use lyon_data::DataError;
use lyon_output::ExportError;
use thiserror::Error;

/// Result type for analysis runs.
pub type Result<T> = std::result::Result<T, LyonError>;

/// Errors that can occur while configuring or running an analysis.
#[derive(Debug, Error)]
pub enum LyonError {
    /// Data retrieval or persistence error
    #[error(transparent)]
    Data(#[from] DataError),

    /// Settings file could not be parsed
    #[error("Invalid settings: {0}")]
    Config(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Export error
    #[error(transparent)]
    Export(#[from] ExportError),

    /// The dataset has no rows or no columns
    #[error("Dataset is empty")]
    EmptyDataset,

    /// The benchmark column is absent from the dataset
    #[error("Benchmark {0} is missing from the dataset")]
    MissingBenchmark(String),
}
