//! # Forecast Pipeline
//!
//! A batch pipeline for financial time series forecasting: load and clean a
//! raw price series, fit an ARIMA mean model and a GARCH volatility model on
//! its residuals, forecast a fixed horizon, and persist every artifact for a
//! downstream visualization step.
//!
//! ## Features
//!
//! - CSV loading with numeric coercion and missing-value cleanup
//! - ARIMA mean model (conditional-sum-of-squares estimation)
//! - GARCH volatility model over the mean model's residuals
//!   (Gaussian maximum likelihood)
//! - Flat-file artifacts: cleaned series, model summaries, forecast values
//!
//! Everything is synchronous and single-pass; every failure is fatal for the
//! run. Artifacts are overwritten with last-writer-wins semantics and no
//! locking, so running two pipelines against the same output directories
//! concurrently is unsafe.
//!
//! ## Quick Start
//!
//! ```no_run
//! use forecast_pipeline::data::SeriesLoader;
//! use forecast_pipeline::pipeline::{self, PipelineConfig};
//!
//! fn main() -> forecast_pipeline::Result<()> {
//!     // Load and clean the raw dataset
//!     let series = SeriesLoader::load("data/gld_price_data.csv", "GLD", "shared/processed")?;
//!
//!     // Fit both models, forecast, and persist all artifacts
//!     let outcome = pipeline::run(&series, &PipelineConfig::default())?;
//!     println!("first forecast value: {:?}", outcome.forecast.values().first());
//!     Ok(())
//! }
//! ```

pub mod data;
pub mod error;
pub mod models;
pub mod optimize;
pub mod pipeline;

// Re-export commonly used types
pub use crate::data::{SeriesLoader, TimeSeries};
pub use crate::error::{ForecastError, Result};
pub use crate::models::arima::{ArimaModel, ArimaOrder};
pub use crate::models::garch::{GarchModel, GarchOrder};
pub use crate::models::{FittedModel, Forecast};
pub use crate::pipeline::{PipelineConfig, PipelineOutcome};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
