//! Preprocessing entry point: load, clean, and persist the default dataset.
//!
//! Argument-free batch job intended for independent container execution;
//! progress goes to standard output and any failure exits non-zero.

use forecast_pipeline::data::SeriesLoader;
use tracing::{error, info};

const RAW_DATASET: &str = "data/gld_price_data.csv";
const TARGET_COLUMN: &str = "GLD";
const PROCESSED_DIR: &str = "shared/processed";

fn main() {
    init_logging();

    info!("starting preprocessing step");
    if let Err(err) = SeriesLoader::load(RAW_DATASET, TARGET_COLUMN, PROCESSED_DIR) {
        error!(%err, "preprocessing failed");
        std::process::exit(1);
    }
    info!("preprocessing completed successfully");
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}
