//! Training entry point: fit both models on the cleaned series and persist
//! forecasts and summaries.
//!
//! Argument-free batch job intended for independent container execution;
//! reads the series the preprocessing step wrote to the shared volume.

use forecast_pipeline::data::SeriesLoader;
use forecast_pipeline::pipeline::{self, PipelineConfig};
use tracing::{error, info};

const CLEANED_SERIES: &str = "shared/processed/cleaned_series.csv";

fn main() {
    init_logging();

    info!("starting training step");
    if let Err(err) = run() {
        error!(%err, "training failed");
        std::process::exit(1);
    }
    info!("training step completed successfully");
}

fn run() -> forecast_pipeline::Result<()> {
    let series = SeriesLoader::load_cleaned(CLEANED_SERIES)?;
    info!(points = series.len(), "training ARIMA + GARCH models");
    pipeline::run(&series, &PipelineConfig::default())?;
    Ok(())
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}
