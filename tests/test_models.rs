use approx::assert_relative_eq;
use chrono::{Duration, NaiveDate};
use forecast_pipeline::models::arima::{ArimaModel, ArimaOrder};
use forecast_pipeline::models::garch::{GarchModel, GarchOrder};
use forecast_pipeline::models::{FittedModel, Forecast};
use forecast_pipeline::{ForecastError, TimeSeries};

fn sample_series(n: usize) -> TimeSeries {
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    let dates = (0..n).map(|i| start + Duration::days(i as i64)).collect();
    let values = (0..n)
        .map(|i| {
            let t = i as f64;
            100.0 + 5.0 * (t * 0.7).sin() + 3.0 * (t * 1.3).cos() + 0.5 * (t * 5.1).sin()
        })
        .collect();
    TimeSeries::new("GLD", dates, values).unwrap()
}

#[test]
fn arima_fits_nine_observations() {
    let series = sample_series(9);
    let model = ArimaModel::new(ArimaOrder::new(1, 0, 1));

    let fitted = model.fit(&series).unwrap();

    // no differencing, so residuals cover the whole series
    assert_eq!(fitted.residuals().len(), 9);
    assert_eq!(fitted.ar_coefficients().len(), 1);
    assert_eq!(fitted.ma_coefficients().len(), 1);
}

#[test]
fn arima_residual_length_tracks_differencing() {
    let series = sample_series(30);
    let model = ArimaModel::new(ArimaOrder::new(1, 1, 1));

    let fitted = model.fit(&series).unwrap();

    assert_eq!(fitted.residuals().len(), 29);
}

#[test]
fn arima_rejects_short_series() {
    let series = sample_series(4);
    let model = ArimaModel::new(ArimaOrder::new(2, 0, 3));

    let result = model.fit(&series);

    assert!(matches!(result, Err(ForecastError::Fitting(_))));
}

#[test]
fn arima_mean_only_model_recovers_the_mean() {
    let series = sample_series(40);
    let mean = series.values().iter().sum::<f64>() / series.len() as f64;
    let model = ArimaModel::new(ArimaOrder::new(0, 0, 0));

    let fitted = model.fit(&series).unwrap();

    assert_relative_eq!(fitted.intercept(), mean, epsilon = 1e-10);
}

#[test]
fn arima_recovers_an_autoregressive_signal() {
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    let dates = (0..80).map(|i| start + Duration::days(i)).collect();
    let mut values = vec![10.0];
    for t in 1..80usize {
        let previous = values[t - 1];
        values.push(5.0 + 0.7 * (previous - 5.0) + 0.3 * (t as f64 * 2.7).sin());
    }
    let series = TimeSeries::new("GLD", dates, values).unwrap();

    let fitted = ArimaModel::new(ArimaOrder::new(1, 0, 0)).fit(&series).unwrap();

    let ar = fitted.ar_coefficients()[0];
    assert!(ar > 0.2 && ar < 0.99, "estimated AR coefficient {ar}");
}

#[test]
fn arima_forecast_has_the_requested_length() {
    let series = sample_series(30);
    let fitted = ArimaModel::new(ArimaOrder::default()).fit(&series).unwrap();

    let forecast = fitted.forecast(5).unwrap();

    assert_eq!(forecast.horizon(), 5);
    assert!(forecast.values().iter().all(|v| v.is_finite()));
}

#[test]
fn arima_differenced_forecast_follows_the_trend() {
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    let dates = (0..50).map(|i| start + Duration::days(i)).collect();
    let values: Vec<f64> = (0..50)
        .map(|i| 10.0 + 2.0 * i as f64 + (i as f64 * 0.9).sin())
        .collect();
    let last = *values.last().unwrap();
    let series = TimeSeries::new("GLD", dates, values).unwrap();

    let fitted = ArimaModel::new(ArimaOrder::new(1, 1, 0)).fit(&series).unwrap();
    let forecast = fitted.forecast(5).unwrap();

    assert!(forecast.values()[0] > last - 5.0);
}

#[test]
fn arima_rejects_zero_horizon() {
    let series = sample_series(20);
    let fitted = ArimaModel::new(ArimaOrder::new(1, 0, 1)).fit(&series).unwrap();

    let result = fitted.forecast(0);

    assert!(matches!(result, Err(ForecastError::Validation(_))));
}

#[test]
fn arima_fit_is_deterministic() {
    let series = sample_series(40);
    let model = ArimaModel::new(ArimaOrder::default());

    let first = model.fit(&series).unwrap();
    let second = model.fit(&series).unwrap();

    assert_eq!(first.ar_coefficients(), second.ar_coefficients());
    assert_eq!(first.ma_coefficients(), second.ma_coefficients());
    assert_eq!(first.forecast(10).unwrap(), second.forecast(10).unwrap());
}

#[test]
fn arima_summary_names_the_specification() {
    let series = sample_series(20);
    let fitted = ArimaModel::new(ArimaOrder::new(1, 0, 1)).fit(&series).unwrap();

    let summary = fitted.summary();

    assert!(!summary.is_empty());
    assert!(summary.contains("ARIMA(1,0,1)"));
    assert!(summary.contains("ar.L1"));
    assert!(summary.contains("ma.L1"));
}

fn sample_residuals(n: usize) -> Vec<f64> {
    (0..n)
        .map(|t| {
            let t = t as f64;
            0.5 * (t * 1.9).sin() + 0.2 * (t * 4.3).cos()
        })
        .collect()
}

#[test]
fn garch_fits_a_short_residual_sequence() {
    let residuals = [0.1, -0.2, 0.05, -0.1, 0.2];
    let model = GarchModel::new(GarchOrder::new(1, 1));

    let fitted = model.fit(&residuals).unwrap();

    assert_eq!(fitted.alpha().len(), 1);
    assert_eq!(fitted.beta().len(), 1);
    assert_eq!(fitted.conditional_variance().len(), 5);
    assert_eq!(fitted.observations(), 5);
}

#[test]
fn garch_estimates_satisfy_the_constraints() {
    let residuals = sample_residuals(40);
    let fitted = GarchModel::new(GarchOrder::default()).fit(&residuals).unwrap();

    assert!(fitted.omega() > 0.0);
    assert!(fitted.alpha().iter().all(|a| *a >= 0.0));
    assert!(fitted.beta().iter().all(|b| *b >= 0.0));
    assert!(fitted.is_stationary());
    assert!(fitted.conditional_variance().iter().all(|v| *v > 0.0));
}

#[test]
fn garch_rejects_too_few_residuals() {
    let result = GarchModel::new(GarchOrder::new(1, 1)).fit(&[0.1, -0.2]);

    assert!(matches!(result, Err(ForecastError::Fitting(_))));
}

#[test]
fn garch_rejects_degenerate_residuals() {
    let result = GarchModel::new(GarchOrder::new(1, 1)).fit(&vec![0.0; 12]);

    assert!(matches!(result, Err(ForecastError::Fitting(_))));
}

#[test]
fn garch_variance_forecast_is_positive() {
    let residuals = sample_residuals(30);
    let fitted = GarchModel::new(GarchOrder::default()).fit(&residuals).unwrap();

    let variances = fitted.forecast_variance(5);

    assert_eq!(variances.len(), 5);
    assert!(variances.iter().all(|v| v.is_finite() && *v > 0.0));
}

#[test]
fn garch_summary_names_the_coefficients() {
    let residuals = sample_residuals(30);
    let fitted = GarchModel::new(GarchOrder::default()).fit(&residuals).unwrap();

    let summary = fitted.summary();

    assert!(!summary.is_empty());
    assert!(summary.contains("GARCH(1,1)"));
    assert!(summary.contains("omega"));
    assert!(summary.contains("alpha[1]"));
    assert!(summary.contains("beta[1]"));
}

#[test]
fn forecast_length_must_match_horizon() {
    let result = Forecast::new(vec![1.0, 2.0], 3);

    assert!(matches!(result, Err(ForecastError::Validation(_))));
}

#[test]
fn forecast_serializes_to_json() {
    let forecast = Forecast::new(vec![1.5, 2.5], 2).unwrap();

    let json = forecast.to_json().unwrap();

    assert_eq!(json, "[1.5,2.5]");
}
