//! GARCH volatility model fitting
//!
//! Conditional variance equation:
//! sigma2(t) = omega + sum(alpha_i * e2(t-i)) + sum(beta_j * sigma2(t-j))
//!
//! Parameters are estimated by Gaussian maximum likelihood with a
//! Nelder-Mead search restarted from several seeds; the best likelihood
//! wins. No convergence chatter is printed, only debug-level parameter
//! lines.

use crate::error::{ForecastError, Result};
use crate::models::FittedModel;
use crate::optimize::{minimize, MinimizeConfig};
use serde::{Deserialize, Serialize};
use statrs::distribution::{Continuous, Normal};
use std::fmt;
use tracing::{debug, error, info};

/// GARCH(p, q) order specification.
///
/// `p` counts the lagged squared residual terms (alpha), `q` the lagged
/// variance terms (beta), matching the usual ARCH-package convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GarchOrder {
    /// Lagged squared residual count.
    pub p: usize,
    /// Lagged variance count.
    pub q: usize,
}

impl GarchOrder {
    /// Create a new order specification.
    pub fn new(p: usize, q: usize) -> Self {
        Self { p, q }
    }

    /// Number of estimated parameters (alpha + beta + omega).
    pub fn num_params(&self) -> usize {
        self.p + self.q + 1
    }
}

impl Default for GarchOrder {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

impl fmt::Display for GarchOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GARCH({},{})", self.p, self.q)
    }
}

/// GARCH model over a residual sequence.
#[derive(Debug, Clone)]
pub struct GarchModel {
    order: GarchOrder,
}

impl GarchModel {
    /// Create a new GARCH model with the given order.
    pub fn new(order: GarchOrder) -> Self {
        Self { order }
    }

    /// The order specification.
    pub fn order(&self) -> GarchOrder {
        self.order
    }

    /// Fit the model to a residual sequence.
    pub fn fit(&self, residuals: &[f64]) -> Result<FittedGarch> {
        info!(order = %self.order, "training GARCH model");

        let n = residuals.len();
        let p = self.order.p;
        let q = self.order.q;
        let needed = p + q + 1;
        if n < needed {
            let err = ForecastError::Fitting(format!(
                "insufficient data for {}: need at least {needed} observations, got {n}",
                self.order
            ));
            error!(%err, "GARCH training failed");
            return Err(err);
        }

        let sample_variance = residuals.iter().map(|r| r * r).sum::<f64>() / n as f64;
        if !sample_variance.is_finite() || sample_variance <= 0.0 {
            let err = ForecastError::Fitting(format!(
                "degenerate residuals while fitting {}",
                self.order
            ));
            error!(%err, "GARCH training failed");
            return Err(err);
        }

        let mut bounds = vec![(1e-12, (10.0 * sample_variance).max(1.0))];
        bounds.extend(std::iter::repeat((0.0, 0.999)).take(p + q));

        let objective = |params: &[f64]| -> f64 {
            let omega = params[0];
            let alpha = &params[1..1 + p];
            let beta = &params[1 + p..];
            let persistence: f64 = alpha.iter().sum::<f64>() + beta.iter().sum::<f64>();
            if persistence >= 0.999 {
                return f64::MAX;
            }
            let sigma2 = variance_filter(residuals, omega, alpha, beta, sample_variance);
            negative_log_likelihood(residuals, &sigma2, p.max(q))
        };

        // Deterministic restarts spanning low and high persistence regimes;
        // the omega seed keeps the implied long-run variance near the sample
        // variance.
        let seeds = [(0.10, 0.80), (0.05, 0.90), (0.20, 0.60), (0.30, 0.30)];
        let config = MinimizeConfig {
            max_iter: 1000,
            tolerance: 1e-10,
            ..Default::default()
        };

        let mut best_value = f64::MAX;
        let mut best_point = vec![0.0; self.order.num_params()];
        for (alpha_total, beta_total) in seeds {
            let mut initial = vec![sample_variance * (1.0 - alpha_total - beta_total)];
            initial.extend(std::iter::repeat(alpha_total / p as f64).take(p));
            initial.extend(std::iter::repeat(beta_total / q as f64).take(q));

            let result = minimize(&objective, &initial, &bounds, &config);
            if result.value < best_value {
                best_value = result.value;
                best_point = result.point;
            }
        }

        if !best_value.is_finite() || best_value == f64::MAX {
            let err = ForecastError::Fitting(format!(
                "{} likelihood did not produce a finite value",
                self.order
            ));
            error!(%err, "GARCH training failed");
            return Err(err);
        }

        let omega = best_point[0];
        let alpha = best_point[1..1 + p].to_vec();
        let beta = best_point[1 + p..].to_vec();
        let conditional_variance = variance_filter(residuals, omega, &alpha, &beta, sample_variance);
        let persistence: f64 = alpha.iter().sum::<f64>() + beta.iter().sum::<f64>();
        let unconditional_variance = if persistence < 1.0 {
            omega / (1.0 - persistence)
        } else {
            sample_variance
        };
        let tail: Vec<f64> = residuals[n - p.min(n)..].to_vec();

        debug!(omega, alpha = ?alpha, beta = ?beta, "GARCH fitted parameters");

        Ok(FittedGarch {
            name: self.order.to_string(),
            order: self.order,
            omega,
            alpha,
            beta,
            tail,
            conditional_variance,
            unconditional_variance,
            log_likelihood: -best_value,
            n_obs: n,
        })
    }
}

/// A fitted GARCH model. Never outlives a single pipeline run.
#[derive(Debug, Clone)]
pub struct FittedGarch {
    name: String,
    order: GarchOrder,
    omega: f64,
    alpha: Vec<f64>,
    beta: Vec<f64>,
    tail: Vec<f64>,
    conditional_variance: Vec<f64>,
    unconditional_variance: f64,
    log_likelihood: f64,
    n_obs: usize,
}

impl FittedGarch {
    /// The order specification.
    pub fn order(&self) -> GarchOrder {
        self.order
    }

    /// Estimated constant term.
    pub fn omega(&self) -> f64 {
        self.omega
    }

    /// Estimated squared-residual coefficients (lag 1 first).
    pub fn alpha(&self) -> &[f64] {
        &self.alpha
    }

    /// Estimated lagged-variance coefficients (lag 1 first).
    pub fn beta(&self) -> &[f64] {
        &self.beta
    }

    /// In-sample conditional variance, same length as the residual input.
    pub fn conditional_variance(&self) -> &[f64] {
        &self.conditional_variance
    }

    /// Long-run variance implied by the estimates.
    pub fn unconditional_variance(&self) -> f64 {
        self.unconditional_variance
    }

    /// Gaussian log-likelihood at the estimates.
    pub fn log_likelihood(&self) -> f64 {
        self.log_likelihood
    }

    /// Number of residual observations the model was fitted to.
    pub fn observations(&self) -> usize {
        self.n_obs
    }

    /// Sum of the alpha and beta coefficients.
    pub fn persistence(&self) -> f64 {
        self.alpha.iter().sum::<f64>() + self.beta.iter().sum::<f64>()
    }

    /// Check the stationarity condition (persistence below one).
    pub fn is_stationary(&self) -> bool {
        self.persistence() < 1.0
    }

    /// Analytic variance forecast for the next `horizon` steps.
    ///
    /// Diagnostic only; expected future squared shocks are replaced by
    /// their own variance forecasts.
    pub fn forecast_variance(&self, horizon: usize) -> Vec<f64> {
        let mut out: Vec<f64> = Vec::with_capacity(horizon);
        for step in 1..=horizon as i64 {
            let mut sigma2 = self.omega;
            for (lag, coefficient) in self.alpha.iter().enumerate() {
                let offset = step - 1 - lag as i64;
                let shock2 = if offset <= 0 {
                    let idx = self.tail.len() as i64 - 1 + offset;
                    if idx >= 0 {
                        self.tail[idx as usize].powi(2)
                    } else {
                        self.unconditional_variance
                    }
                } else {
                    out[(offset - 1) as usize]
                };
                sigma2 += coefficient * shock2;
            }
            for (lag, coefficient) in self.beta.iter().enumerate() {
                let offset = step - 1 - lag as i64;
                let lagged = if offset <= 0 {
                    let idx = self.conditional_variance.len() as i64 - 1 + offset;
                    if idx >= 0 {
                        self.conditional_variance[idx as usize]
                    } else {
                        self.unconditional_variance
                    }
                } else {
                    out[(offset - 1) as usize]
                };
                sigma2 += coefficient * lagged;
            }
            out.push(sigma2);
        }
        out
    }
}

impl fmt::Display for FittedGarch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:^62}", format!("{} Model Results", self.name))?;
        writeln!(f, "{}", "=".repeat(62))?;
        writeln!(f, "No. Observations:       {}", self.n_obs)?;
        writeln!(f, "Log Likelihood:         {:.3}", self.log_likelihood)?;
        writeln!(f, "Persistence:            {:.6}", self.persistence())?;
        writeln!(f, "Unconditional Variance: {:.6}", self.unconditional_variance)?;
        writeln!(f, "{}", "-".repeat(62))?;
        writeln!(f, "{:<16}{:>14}", "Coefficient", "Estimate")?;
        writeln!(f, "{:<16}{:>14.6}", "omega", self.omega)?;
        for (i, coefficient) in self.alpha.iter().enumerate() {
            writeln!(f, "{:<16}{:>14.6}", format!("alpha[{}]", i + 1), coefficient)?;
        }
        for (i, coefficient) in self.beta.iter().enumerate() {
            writeln!(f, "{:<16}{:>14.6}", format!("beta[{}]", i + 1), coefficient)?;
        }
        write!(f, "{}", "=".repeat(62))
    }
}

impl FittedModel for FittedGarch {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Run the conditional variance recursion. Entries inside the warmup
/// window stay at the sample variance.
fn variance_filter(
    residuals: &[f64],
    omega: f64,
    alpha: &[f64],
    beta: &[f64],
    sample_variance: f64,
) -> Vec<f64> {
    let warmup = alpha.len().max(beta.len());
    let mut sigma2 = vec![sample_variance; residuals.len()];

    for t in warmup..residuals.len() {
        let mut value = omega;
        for (lag, coefficient) in alpha.iter().enumerate() {
            value += coefficient * residuals[t - 1 - lag].powi(2);
        }
        for (lag, coefficient) in beta.iter().enumerate() {
            value += coefficient * sigma2[t - 1 - lag];
        }
        sigma2[t] = value;
    }

    sigma2
}

/// Negative Gaussian log-likelihood of the residuals under the filtered
/// variances, skipping the warmup window.
fn negative_log_likelihood(residuals: &[f64], sigma2: &[f64], warmup: usize) -> f64 {
    let mut total = 0.0;
    for t in warmup..residuals.len() {
        let variance = sigma2[t];
        if !variance.is_finite() || variance <= 0.0 {
            return f64::MAX;
        }
        match Normal::new(0.0, variance.sqrt()) {
            Ok(noise) => total -= noise.ln_pdf(residuals[t]),
            Err(_) => return f64::MAX,
        }
    }
    if total.is_finite() {
        total
    } else {
        f64::MAX
    }
}
