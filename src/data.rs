//! Time series loading and cleaning

use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use polars::prelude::*;
use std::fs::{self, File};
use std::path::Path;
use tracing::{debug, error, info, warn};

/// Name of the date column expected in raw datasets and written to the
/// cleaned artifact.
pub const DATE_COLUMN: &str = "Date";

/// Name of the file the loader writes the cleaned series to.
pub const CLEANED_SERIES_FILE: &str = "cleaned_series.csv";

/// A cleaned, date-indexed time series with a single value column.
///
/// Dates are unique and strictly increasing; values contain no missing
/// entries. Construction enforces both.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    name: String,
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl TimeSeries {
    /// Create a new time series from parallel date and value vectors.
    pub fn new(name: impl Into<String>, dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(ForecastError::Validation(format!(
                "dates ({}) and values ({}) must have the same length",
                dates.len(),
                values.len()
            )));
        }
        if dates.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ForecastError::Validation(
                "dates must be unique and strictly increasing".to_string(),
            ));
        }

        Ok(Self {
            name: name.into(),
            dates,
            values,
        })
    }

    /// Name of the value column.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The date index.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// The observed values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Date of the last observation, if any.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the series is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Loader for raw datasets and previously cleaned series
#[derive(Debug)]
pub struct SeriesLoader;

impl SeriesLoader {
    /// Load and clean a financial time series from a raw CSV dataset.
    ///
    /// Reads the file at `path`, extracts `column` indexed by the `Date`
    /// column, coerces the values to numeric (non-numeric entries become
    /// missing), drops every row missing a date or a value, and writes the
    /// cleaned two-column series to `<output_dir>/cleaned_series.csv`,
    /// creating the directory if needed.
    pub fn load(
        path: impl AsRef<Path>,
        column: &str,
        output_dir: impl AsRef<Path>,
    ) -> Result<TimeSeries> {
        let path = path.as_ref();
        let output_dir = output_dir.as_ref();

        info!(path = %path.display(), "loading dataset");
        if !path.exists() {
            let err = ForecastError::MissingInput(path.display().to_string());
            error!(%err, "dataset not found");
            return Err(err);
        }

        let file = File::open(path)?;
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()?;
        debug!(rows = df.height(), "raw dataframe loaded");

        let dates = extract_dates(&df)?;
        let raw = df.column(column).map_err(|_| {
            ForecastError::Schema(format!("column '{column}' not found in dataset"))
        })?;
        let coerced = raw.cast(&DataType::Float64)?;
        let values: Vec<Option<f64>> = coerced.f64()?.into_iter().collect();

        let mut kept_dates = Vec::with_capacity(values.len());
        let mut kept_values = Vec::with_capacity(values.len());
        for (date, value) in dates.into_iter().zip(values) {
            if let (Some(date), Some(value)) = (date, value) {
                kept_dates.push(date);
                kept_values.push(value);
            }
        }

        let dropped = df.height() - kept_values.len();
        if dropped > 0 {
            warn!(dropped, column, "rows with missing values removed");
        }

        let series = TimeSeries::new(column, kept_dates, kept_values)?;

        fs::create_dir_all(output_dir)?;
        let cleaned_path = output_dir.join(CLEANED_SERIES_FILE);
        let mut writer = csv::Writer::from_path(&cleaned_path)?;
        writer.write_record([DATE_COLUMN, series.name()])?;
        for (date, value) in series.dates().iter().zip(series.values()) {
            writer.write_record([date.format("%Y-%m-%d").to_string(), value.to_string()])?;
        }
        writer.flush()?;
        info!(path = %cleaned_path.display(), "cleaned series saved");
        info!(rows = series.len(), "dataset loaded successfully");

        Ok(series)
    }

    /// Read back a series previously written by [`SeriesLoader::load`].
    ///
    /// The first column is parsed as dates, the second as values; the value
    /// column's header becomes the series name.
    pub fn load_cleaned(path: impl AsRef<Path>) -> Result<TimeSeries> {
        let path = path.as_ref();

        info!(path = %path.display(), "loading cleaned series");
        if !path.exists() {
            let err = ForecastError::MissingInput(path.display().to_string());
            error!(%err, "cleaned series not found");
            return Err(err);
        }

        let mut reader = csv::Reader::from_path(path)?;
        let headers = reader.headers()?.clone();
        let name = headers
            .get(1)
            .ok_or_else(|| {
                ForecastError::Schema(
                    "cleaned series file must have a date and a value column".to_string(),
                )
            })?
            .to_string();

        let mut dates = Vec::new();
        let mut values = Vec::new();
        for record in reader.records() {
            let record = record?;
            let raw_date = record.get(0).ok_or_else(|| {
                ForecastError::Schema("cleaned series row is missing its date".to_string())
            })?;
            let date = parse_date(raw_date).ok_or_else(|| {
                ForecastError::Schema(format!("unparseable date '{raw_date}' in cleaned series"))
            })?;
            let raw_value = record.get(1).ok_or_else(|| {
                ForecastError::Schema("cleaned series row is missing its value".to_string())
            })?;
            let value: f64 = raw_value.parse().map_err(|_| {
                ForecastError::Schema(format!("unparseable value '{raw_value}' in cleaned series"))
            })?;
            dates.push(date);
            values.push(value);
        }

        let series = TimeSeries::new(name, dates, values)?;
        info!(rows = series.len(), "cleaned series loaded");
        Ok(series)
    }
}

/// Parse a date string in ISO (`2008-01-02`) or month-first (`1/2/2008`)
/// form. Day-first formats are deliberately not accepted.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%m/%d/%Y"))
        .ok()
}

/// Extract the `Date` column as `NaiveDate`s, one entry per row.
/// Unparseable entries come back as `None` and are dropped by the caller.
fn extract_dates(df: &DataFrame) -> Result<Vec<Option<NaiveDate>>> {
    let col = df.column(DATE_COLUMN).map_err(|_| {
        ForecastError::Schema(format!("column '{DATE_COLUMN}' not found in dataset"))
    })?;

    match col.dtype() {
        DataType::Utf8 => Ok(col
            .utf8()?
            .into_iter()
            .map(|opt| opt.and_then(parse_date))
            .collect()),
        DataType::Date => Ok(col
            .date()?
            .into_iter()
            .map(|opt| {
                opt.and_then(|days| {
                    if days < 0 {
                        return None;
                    }
                    NaiveDate::from_ymd_opt(1970, 1, 1)
                        .and_then(|epoch| epoch.checked_add_days(chrono::Days::new(days as u64)))
                })
            })
            .collect()),
        other => Err(ForecastError::Schema(format!(
            "column '{DATE_COLUMN}' has unsupported type {other}"
        ))),
    }
}
