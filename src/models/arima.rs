//! ARIMA mean model fitting and forecasting

use crate::data::TimeSeries;
use crate::error::{ForecastError, Result};
use crate::models::{FittedModel, Forecast};
use crate::optimize::{minimize, MinimizeConfig};
use serde::{Deserialize, Serialize};
use statrs::distribution::{Continuous, Normal};
use std::fmt;
use tracing::{debug, error, info};

/// ARIMA(p, d, q) order specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArimaOrder {
    /// Autoregressive lag count.
    pub p: usize,
    /// Differencing order.
    pub d: usize,
    /// Moving-average lag count.
    pub q: usize,
}

impl ArimaOrder {
    /// Create a new order specification.
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }

    /// Number of estimated parameters (AR + MA + intercept).
    pub fn num_params(&self) -> usize {
        self.p + self.q + 1
    }

    /// Shortest series the specification can be fitted to.
    pub fn min_observations(&self) -> usize {
        self.p + self.d + self.q + 1
    }
}

impl Default for ArimaOrder {
    fn default() -> Self {
        Self::new(2, 0, 3)
    }
}

impl fmt::Display for ArimaOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ARIMA({},{},{})", self.p, self.d, self.q)
    }
}

/// ARIMA model (AutoRegressive Integrated Moving Average).
///
/// Estimation minimizes the conditional sum of squares of the one-step
/// prediction errors on the differenced scale.
#[derive(Debug, Clone)]
pub struct ArimaModel {
    order: ArimaOrder,
}

impl ArimaModel {
    /// Create a new ARIMA model with the given order.
    pub fn new(order: ArimaOrder) -> Self {
        Self { order }
    }

    /// The order specification.
    pub fn order(&self) -> ArimaOrder {
        self.order
    }

    /// Fit the model to a cleaned time series.
    pub fn fit(&self, series: &TimeSeries) -> Result<FittedArima> {
        info!(order = %self.order, "training ARIMA model");

        let values = series.values();
        let needed = self.order.min_observations();
        if values.len() < needed {
            let err = ForecastError::Fitting(format!(
                "insufficient data for {}: need at least {} observations, got {}",
                self.order,
                needed,
                values.len()
            ));
            error!(%err, "ARIMA training failed");
            return Err(err);
        }

        let differenced = difference(values, self.order.d);
        let (intercept, ar, ma) = estimate(&differenced, self.order.p, self.order.q);
        let residuals = one_step_residuals(&differenced, intercept, &ar, &ma);

        let warmup = self.order.p.max(self.order.q);
        let tail = &residuals[warmup..];
        let residual_variance = tail.iter().map(|r| r * r).sum::<f64>() / tail.len() as f64;
        if !residual_variance.is_finite() || residual_variance <= 0.0 {
            let err = ForecastError::Fitting(format!(
                "degenerate residuals while fitting {}",
                self.order
            ));
            error!(%err, "ARIMA training failed");
            return Err(err);
        }

        let noise = Normal::new(0.0, residual_variance.sqrt())
            .map_err(|e| ForecastError::Fitting(format!("residual distribution: {e}")))?;
        let log_likelihood: f64 = tail.iter().map(|r| noise.ln_pdf(*r)).sum();
        let k = self.order.num_params() as f64;
        let n_eff = tail.len() as f64;
        let aic = -2.0 * log_likelihood + 2.0 * k;
        let bic = -2.0 * log_likelihood + k * n_eff.ln();

        debug!(intercept, ar = ?ar, ma = ?ma, "ARIMA fitted parameters");

        Ok(FittedArima {
            name: self.order.to_string(),
            order: self.order,
            intercept,
            ar,
            ma,
            residuals,
            residual_variance,
            log_likelihood,
            aic,
            bic,
            original: values.to_vec(),
            differenced,
        })
    }
}

/// A fitted ARIMA model. Immutable once produced.
#[derive(Debug, Clone)]
pub struct FittedArima {
    name: String,
    order: ArimaOrder,
    intercept: f64,
    ar: Vec<f64>,
    ma: Vec<f64>,
    residuals: Vec<f64>,
    residual_variance: f64,
    log_likelihood: f64,
    aic: f64,
    bic: f64,
    original: Vec<f64>,
    differenced: Vec<f64>,
}

impl FittedArima {
    /// The order specification.
    pub fn order(&self) -> ArimaOrder {
        self.order
    }

    /// Estimated intercept on the differenced scale.
    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Estimated AR coefficients (lag 1 first).
    pub fn ar_coefficients(&self) -> &[f64] {
        &self.ar
    }

    /// Estimated MA coefficients (lag 1 first).
    pub fn ma_coefficients(&self) -> &[f64] {
        &self.ma
    }

    /// In-sample one-step residuals, same length as the differenced series.
    pub fn residuals(&self) -> &[f64] {
        &self.residuals
    }

    /// Variance of the residuals past the warmup window.
    pub fn residual_variance(&self) -> f64 {
        self.residual_variance
    }

    /// Gaussian log-likelihood of the residuals.
    pub fn log_likelihood(&self) -> f64 {
        self.log_likelihood
    }

    /// Akaike information criterion.
    pub fn aic(&self) -> f64 {
        self.aic
    }

    /// Bayesian information criterion.
    pub fn bic(&self) -> f64 {
        self.bic
    }

    /// Produce a point forecast for the next `horizon` steps.
    ///
    /// The recursion runs on the differenced scale with future shocks at
    /// zero, then integrates back through the tail of the original series.
    pub fn forecast(&self, horizon: usize) -> Result<Forecast> {
        if horizon == 0 {
            return Err(ForecastError::Validation(
                "forecast horizon must be at least 1".to_string(),
            ));
        }

        let mut history = self.differenced.clone();
        let mut shocks = self.residuals.clone();
        let observed = history.len();

        for _ in 0..horizon {
            let t = history.len();
            let mut next = self.intercept;
            for (lag, coefficient) in self.ar.iter().enumerate() {
                if t > lag {
                    next += coefficient * (history[t - 1 - lag] - self.intercept);
                }
            }
            for (lag, coefficient) in self.ma.iter().enumerate() {
                if t > lag {
                    next += coefficient * shocks[t - 1 - lag];
                }
            }
            history.push(next);
            shocks.push(0.0);
        }

        let ahead = history[observed..].to_vec();
        let values = if self.order.d > 0 {
            integrate(&ahead, &self.original, self.order.d)
        } else {
            ahead
        };

        Forecast::new(values, horizon)
    }
}

impl fmt::Display for FittedArima {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:^62}", format!("{} Model Results", self.name))?;
        writeln!(f, "{}", "=".repeat(62))?;
        writeln!(f, "No. Observations:       {}", self.original.len())?;
        writeln!(f, "Log Likelihood:         {:.3}", self.log_likelihood)?;
        writeln!(f, "AIC:                    {:.3}", self.aic)?;
        writeln!(f, "BIC:                    {:.3}", self.bic)?;
        writeln!(f, "Residual Variance:      {:.6}", self.residual_variance)?;
        writeln!(f, "{}", "-".repeat(62))?;
        writeln!(f, "{:<16}{:>14}", "Coefficient", "Estimate")?;
        writeln!(f, "{:<16}{:>14.6}", "const", self.intercept)?;
        for (i, coefficient) in self.ar.iter().enumerate() {
            writeln!(f, "{:<16}{:>14.6}", format!("ar.L{}", i + 1), coefficient)?;
        }
        for (i, coefficient) in self.ma.iter().enumerate() {
            writeln!(f, "{:<16}{:>14.6}", format!("ma.L{}", i + 1), coefficient)?;
        }
        write!(f, "{}", "=".repeat(62))
    }
}

impl FittedModel for FittedArima {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Estimate intercept plus AR and MA coefficients by minimizing the
/// conditional sum of squares.
fn estimate(differenced: &[f64], p: usize, q: usize) -> (f64, Vec<f64>, Vec<f64>) {
    let mean = differenced.iter().sum::<f64>() / differenced.len() as f64;
    if p == 0 && q == 0 {
        return (mean, vec![], vec![]);
    }

    let mut initial = vec![0.0; p + q + 1];
    initial[0] = mean;
    for i in 0..p {
        initial[1 + i] = 0.1 / (i + 1) as f64;
    }
    for i in 0..q {
        initial[1 + p + i] = 0.1 / (i + 1) as f64;
    }

    // Coefficients are kept inside the unit circle for stationarity and
    // invertibility; the intercept is free.
    let mut bounds = vec![(f64::NEG_INFINITY, f64::INFINITY)];
    bounds.extend(std::iter::repeat((-0.99, 0.99)).take(p + q));

    let best = minimize(
        |params| {
            let residuals = one_step_residuals(
                differenced,
                params[0],
                &params[1..1 + p],
                &params[1 + p..],
            );
            residuals[p.max(q)..].iter().map(|r| r * r).sum()
        },
        &initial,
        &bounds,
        &MinimizeConfig::default(),
    );

    let intercept = best.point[0];
    let ar = best.point[1..1 + p].to_vec();
    let ma = best.point[1 + p..].to_vec();
    (intercept, ar, ma)
}

/// One-step prediction errors over the whole differenced series.
/// Entries inside the warmup window are zero.
fn one_step_residuals(series: &[f64], intercept: f64, ar: &[f64], ma: &[f64]) -> Vec<f64> {
    let warmup = ar.len().max(ma.len());
    let mut residuals = vec![0.0; series.len()];

    for t in warmup..series.len() {
        let mut predicted = intercept;
        for (lag, coefficient) in ar.iter().enumerate() {
            predicted += coefficient * (series[t - 1 - lag] - intercept);
        }
        for (lag, coefficient) in ma.iter().enumerate() {
            predicted += coefficient * residuals[t - 1 - lag];
        }
        residuals[t] = series[t] - predicted;
    }

    residuals
}

/// Apply `d` rounds of first differencing.
fn difference(values: &[f64], d: usize) -> Vec<f64> {
    let mut out = values.to_vec();
    for _ in 0..d {
        out = out.windows(2).map(|w| w[1] - w[0]).collect();
    }
    out
}

/// Invert `d` rounds of differencing for a forecast, using the tail of the
/// original series at each differencing level.
fn integrate(ahead: &[f64], original: &[f64], d: usize) -> Vec<f64> {
    let mut tails = Vec::with_capacity(d);
    let mut level = original.to_vec();
    for _ in 0..d {
        match level.last() {
            Some(&tail) => tails.push(tail),
            None => break,
        }
        level = level.windows(2).map(|w| w[1] - w[0]).collect();
    }

    let mut out = ahead.to_vec();
    for &tail in tails.iter().rev() {
        let mut running = tail;
        for value in out.iter_mut() {
            running += *value;
            *value = running;
        }
    }
    out
}
