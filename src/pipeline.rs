//! Combined ARIMA + GARCH forecast orchestration
//!
//! Sequences the two fitters over one cleaned series, produces the point
//! forecast, and persists every artifact. Each step is fatal on failure
//! and nothing already written is rolled back.

use crate::data::TimeSeries;
use crate::error::{ForecastError, Result};
use crate::models::arima::{ArimaModel, ArimaOrder, FittedArima};
use crate::models::garch::{FittedGarch, GarchModel, GarchOrder};
use crate::models::{FittedModel, Forecast};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File name of the mean model summary artifact.
pub const ARIMA_SUMMARY_FILE: &str = "arima_summary.txt";
/// File name of the volatility model summary artifact.
pub const GARCH_SUMMARY_FILE: &str = "garch_summary.txt";
/// File name of the forecast artifact.
pub const FORECAST_FILE: &str = "forecast.csv";

/// Parameters for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Mean model order.
    pub arima_order: ArimaOrder,
    /// Volatility model order.
    pub garch_order: GarchOrder,
    /// Number of future steps to forecast.
    pub horizon: usize,
    /// Directory receiving the model summaries.
    pub model_dir: PathBuf,
    /// Directory receiving the forecast values.
    pub output_dir: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            arima_order: ArimaOrder::default(),
            garch_order: GarchOrder::default(),
            horizon: 20,
            model_dir: PathBuf::from("shared/models"),
            output_dir: PathBuf::from("shared/outputs"),
        }
    }
}

/// Everything one pipeline run produces. The fitted models are owned for
/// the duration of the run only; artifacts on disk are the durable output.
#[derive(Debug)]
pub struct PipelineOutcome {
    /// Point forecast from the mean model.
    pub forecast: Forecast,
    /// Fitted mean model.
    pub arima: FittedArima,
    /// Fitted volatility model, trained on the mean model's residuals.
    pub garch: FittedGarch,
}

/// Execute the full fit-forecast-persist sequence.
///
/// The point forecast comes from the mean model alone; the volatility fit
/// is persisted as a diagnostic summary and never blended into the
/// forecast values.
pub fn run(series: &TimeSeries, config: &PipelineConfig) -> Result<PipelineOutcome> {
    info!("starting combined ARIMA + GARCH forecasting");

    if config.horizon == 0 {
        return Err(ForecastError::Validation(
            "forecast horizon must be at least 1".to_string(),
        ));
    }

    fs::create_dir_all(&config.model_dir)?;
    fs::create_dir_all(&config.output_dir)?;

    let arima = ArimaModel::new(config.arima_order).fit(series)?;
    let garch = GarchModel::new(config.garch_order).fit(arima.residuals())?;

    let forecast = arima.forecast(config.horizon)?;
    debug!(horizon = config.horizon, values = ?forecast.values(), "generated forecast");

    write_summary(&config.model_dir.join(ARIMA_SUMMARY_FILE), &arima)?;
    write_summary(&config.model_dir.join(GARCH_SUMMARY_FILE), &garch)?;
    write_forecast(&config.output_dir.join(FORECAST_FILE), &forecast)?;

    info!("combined forecast completed successfully");
    Ok(PipelineOutcome {
        forecast,
        arima,
        garch,
    })
}

/// Overwrite `path` with the model's text summary.
fn write_summary(path: &Path, model: &dyn FittedModel) -> Result<()> {
    fs::write(path, model.summary())?;
    info!(path = %path.display(), model = model.name(), "model summary saved");
    Ok(())
}

/// Overwrite `path` with the forecast values as a single `forecast` column,
/// no index.
fn write_forecast(path: &Path, forecast: &Forecast) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["forecast"])?;
    for value in forecast.values() {
        writer.write_record([value.to_string()])?;
    }
    writer.flush()?;
    info!(path = %path.display(), rows = forecast.horizon(), "forecast values saved");
    Ok(())
}
