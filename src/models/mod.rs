//! Forecasting models for time series data

use crate::error::{ForecastError, Result};
use serde::Serialize;
use std::fmt;

pub mod arima;
pub mod garch;

/// A fitted model whose diagnostics the pipeline persists.
///
/// The `Display` implementation renders the human-readable summary;
/// `summary` is what gets written to disk.
pub trait FittedModel: fmt::Display {
    /// Name of the fitted specification, e.g. `ARIMA(2,0,3)`.
    fn name(&self) -> &str;

    /// Human-readable summary of the fitted model.
    fn summary(&self) -> String {
        self.to_string()
    }
}

/// Point forecast over a fixed horizon.
///
/// Values are contiguous future steps starting immediately after the last
/// observation of the fitted series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forecast {
    values: Vec<f64>,
}

impl Forecast {
    /// Create a new forecast, checking the value count against the horizon.
    pub fn new(values: Vec<f64>, horizon: usize) -> Result<Self> {
        if values.len() != horizon {
            return Err(ForecastError::Validation(format!(
                "forecast length ({}) doesn't match horizon ({})",
                values.len(),
                horizon
            )));
        }

        Ok(Self { values })
    }

    /// The forecasted values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of future steps covered.
    pub fn horizon(&self) -> usize {
        self.values.len()
    }

    /// Check if the forecast is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Serialize the forecast values to a JSON array.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.values)?)
    }
}
