//! Error types for the forecast_pipeline crate

use polars::prelude::PolarsError;
use thiserror::Error;

/// Custom error types for the forecast_pipeline crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// A file the pipeline reads from does not exist
    #[error("missing input: {0}")]
    MissingInput(String),

    /// Expected column absent or data shape unusable
    #[error("schema error: {0}")]
    Schema(String),

    /// Model estimation failed or was handed unusable data
    #[error("model fitting error: {0}")]
    Fitting(String),

    /// Error from invalid parameters or malformed results
    #[error("validation error: {0}")]
    Validation(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from CSV reading or writing
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error from JSON serialization
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    Polars(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::Polars(err.to_string())
    }
}

impl From<serde_json::Error> for ForecastError {
    fn from(err: serde_json::Error) -> Self {
        ForecastError::Serialization(err.to_string())
    }
}
