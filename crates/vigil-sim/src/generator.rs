//! Synthetic series generators
//!
//! Every generator draws from a caller-supplied random source so runs are
//! reproducible from a seed and independent of the order generators are
//! called in:
//!
//! | Generator         | Shape                                            |
//! |-------------------|--------------------------------------------------|
//! | `random_walk`     | cumulative Normal(drift, volatility) increments  |
//! | `brownian_motion` | same recurrence, separately named                |
//! | `seasonal_data`   | `10·sin(2πt/period)` + Normal noise              |
//! | `poisson_process` | i.i.d. Poisson counts                            |
//! | `arima_data`      | ARMA recurrence, burn-in, integrated `d` times   |
//! | `garch_data`      | GARCH(1,1) returns                               |
//! | `data_stream`     | seasonal + noise + sparse +50 spikes             |

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal, Poisson};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::debug;
use vigil_core::algo::stats;
use vigil_core::{DetectionError, Result};

/// Samples discarded before an ARIMA series is recorded
pub const ARIMA_BURN_IN: usize = 100;

const SEASONAL_AMPLITUDE: f64 = 10.0;
const STREAM_PERIOD: usize = 100;
const STREAM_SPIKE: f64 = 50.0;
const STREAM_SPIKE_PROBABILITY: f64 = 0.02;

/// Deterministic random source for a seed
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

fn check_steps(steps: usize) -> Result<()> {
    if steps == 0 {
        return Err(DetectionError::invalid("steps must be positive"));
    }
    Ok(())
}

fn normal(mean: f64, std_dev: f64) -> Result<Normal<f64>> {
    if !mean.is_finite() {
        return Err(DetectionError::invalid(format!(
            "mean must be finite, got {}",
            mean
        )));
    }
    Normal::new(mean, std_dev).map_err(|e| {
        DetectionError::invalid(format!("invalid std dev {}: {}", std_dev, e))
    })
}

// ============================================================================
// WALKS
// ============================================================================

/// Cumulative sum of Normal(drift, volatility) increments.
///
/// The first element is the first increment, not zero.
pub fn random_walk<R: Rng + ?Sized>(
    steps: usize,
    drift: f64,
    volatility: f64,
    rng: &mut R,
) -> Result<Vec<f64>> {
    check_steps(steps)?;
    let increments = normal(drift, volatility)?;

    let mut level = 0.0;
    let series = (0..steps)
        .map(|_| {
            level += increments.sample(rng);
            level
        })
        .collect();
    Ok(series)
}

/// Discretised Brownian motion with drift.
pub fn brownian_motion<R: Rng + ?Sized>(
    steps: usize,
    drift: f64,
    volatility: f64,
    rng: &mut R,
) -> Result<Vec<f64>> {
    random_walk(steps, drift, volatility, rng)
}

// ============================================================================
// SEASONAL AND COUNTS
// ============================================================================

/// Sinusoid of amplitude 10 with additive Normal(0, noise_std) noise.
pub fn seasonal_data<R: Rng + ?Sized>(
    steps: usize,
    period: usize,
    noise_std: f64,
    rng: &mut R,
) -> Result<Vec<f64>> {
    check_steps(steps)?;
    if period == 0 {
        return Err(DetectionError::invalid("period must be positive"));
    }
    let noise = normal(0.0, noise_std)?;

    Ok((0..steps)
        .map(|t| {
            let phase = 2.0 * PI * t as f64 / period as f64;
            SEASONAL_AMPLITUDE * phase.sin() + noise.sample(rng)
        })
        .collect())
}

/// I.i.d. Poisson(lambda) counts.
pub fn poisson_process<R: Rng + ?Sized>(
    lambda: f64,
    steps: usize,
    rng: &mut R,
) -> Result<Vec<f64>> {
    check_steps(steps)?;
    if !(lambda > 0.0) || !lambda.is_finite() {
        return Err(DetectionError::invalid(format!(
            "lambda must be positive and finite, got {}",
            lambda
        )));
    }
    let counts = Poisson::new(lambda)
        .map_err(|e| DetectionError::invalid(format!("invalid lambda {}: {}", lambda, e)))?;

    Ok((0..steps).map(|_| counts.sample(rng)).collect())
}

// ============================================================================
// ARIMA
// ============================================================================

/// ARIMA(p, d, q) simulation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArimaParams {
    /// AR coefficients φ_1..φ_p
    pub ar: Vec<f64>,
    /// Differencing order undone by integration
    pub d: usize,
    /// MA coefficients θ_1..θ_q
    pub ma: Vec<f64>,
    pub constant: f64,
    pub noise_std: f64,
}

impl Default for ArimaParams {
    fn default() -> Self {
        Self {
            ar: vec![0.5],
            d: 1,
            ma: vec![0.3],
            constant: 0.0,
            noise_std: 1.0,
        }
    }
}

impl ArimaParams {
    pub fn validate(&self) -> Result<()> {
        if self.ar.iter().chain(&self.ma).any(|c| !c.is_finite()) || !self.constant.is_finite() {
            return Err(DetectionError::invalid("ARIMA coefficients must be finite"));
        }
        Ok(())
    }
}

/// Simulated ARIMA series of length `steps`.
///
/// The ARMA part runs for [`ARIMA_BURN_IN`] extra samples that are dropped,
/// then the remainder is cumulatively summed `d` times.
pub fn arima_data<R: Rng + ?Sized>(
    steps: usize,
    params: &ArimaParams,
    rng: &mut R,
) -> Result<Vec<f64>> {
    check_steps(steps)?;
    params.validate()?;
    let innovations = normal(0.0, params.noise_std)?;

    let total = steps + ARIMA_BURN_IN;
    let mut y: Vec<f64> = Vec::with_capacity(total);
    let mut eps: Vec<f64> = Vec::with_capacity(total);

    for t in 0..total {
        let e = innovations.sample(rng);
        let ar: f64 = params
            .ar
            .iter()
            .enumerate()
            .filter(|(i, _)| *i < t)
            .map(|(i, phi)| phi * y[t - 1 - i])
            .sum();
        let ma: f64 = params
            .ma
            .iter()
            .enumerate()
            .filter(|(j, _)| *j < t)
            .map(|(j, theta)| theta * eps[t - 1 - j])
            .sum();
        y.push(params.constant + ar + e + ma);
        eps.push(e);
    }

    let mut series = y.split_off(ARIMA_BURN_IN);
    for _ in 0..params.d {
        let mut acc = 0.0;
        for x in series.iter_mut() {
            acc += *x;
            *x = acc;
        }
    }

    if series.iter().any(|x| !x.is_finite()) {
        return Err(DetectionError::invalid(
            "ARIMA recurrence diverged; check the AR coefficients",
        ));
    }
    debug!(steps, p = params.ar.len(), d = params.d, q = params.ma.len(), "arima generated");
    Ok(series)
}

// ============================================================================
// GARCH
// ============================================================================

/// GARCH(1,1) parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GarchParams {
    pub omega: f64,
    pub alpha: f64,
    pub beta: f64,
}

impl Default for GarchParams {
    fn default() -> Self {
        Self {
            omega: 0.1,
            alpha: 0.1,
            beta: 0.85,
        }
    }
}

impl GarchParams {
    pub fn validate(&self) -> Result<()> {
        let GarchParams { omega, alpha, beta } = *self;
        if !(omega > 0.0) || !omega.is_finite() {
            return Err(DetectionError::invalid(format!(
                "omega must be positive, got {}",
                omega
            )));
        }
        if !(alpha >= 0.0 && beta >= 0.0) {
            return Err(DetectionError::invalid("alpha and beta must be non-negative"));
        }
        if !(alpha + beta < 1.0) {
            return Err(DetectionError::invalid(format!(
                "alpha + beta must be below 1, got {}",
                alpha + beta
            )));
        }
        Ok(())
    }

    /// Long-run variance ω / (1 - α - β)
    pub fn unconditional_variance(&self) -> f64 {
        self.omega / (1.0 - self.alpha - self.beta)
    }
}

/// GARCH(1,1) returns started at the unconditional variance.
pub fn garch_data<R: Rng + ?Sized>(
    steps: usize,
    params: &GarchParams,
    rng: &mut R,
) -> Result<Vec<f64>> {
    check_steps(steps)?;
    params.validate()?;
    let shocks = normal(0.0, 1.0)?;

    let mut variance = params.unconditional_variance();
    let mut prev = 0.0;
    let mut series = Vec::with_capacity(steps);
    for t in 0..steps {
        if t > 0 {
            variance = params.omega + params.alpha * prev * prev + params.beta * variance;
        }
        let e = variance.sqrt() * shocks.sample(rng);
        series.push(e);
        prev = e;
    }
    Ok(series)
}

// ============================================================================
// DEMO STREAM AND INJECTION
// ============================================================================

/// Seasonal demo stream with sparse +50 spikes.
pub fn data_stream<R: Rng + ?Sized>(steps: usize, rng: &mut R) -> Result<Vec<f64>> {
    let mut series = seasonal_data(steps, STREAM_PERIOD, 1.0, rng)?;
    for x in series.iter_mut() {
        if rng.random_bool(STREAM_SPIKE_PROBABILITY) {
            *x += STREAM_SPIKE;
        }
    }
    Ok(series)
}

/// Perturb `num_anomalies` distinct points by `±anomaly_factor · std(series)`.
///
/// Returns the new series and the perturbed indices in ascending order.
pub fn add_anomalies<R: Rng + ?Sized>(
    series: &[f64],
    num_anomalies: usize,
    anomaly_factor: f64,
    rng: &mut R,
) -> Result<(Vec<f64>, Vec<usize>)> {
    if series.is_empty() {
        return Err(DetectionError::invalid("cannot inject anomalies into an empty series"));
    }
    if num_anomalies == 0 {
        return Err(DetectionError::invalid("num_anomalies must be positive"));
    }
    if num_anomalies > series.len() {
        return Err(DetectionError::invalid(format!(
            "num_anomalies {} exceeds series length {}",
            num_anomalies,
            series.len()
        )));
    }
    if !(anomaly_factor > 0.0) || !anomaly_factor.is_finite() {
        return Err(DetectionError::invalid(format!(
            "anomaly_factor must be positive and finite, got {}",
            anomaly_factor
        )));
    }
    let spread = stats::std_dev(series);
    if stats::is_negligible(spread, stats::max_abs(series)) {
        return Err(DetectionError::invalid(
            "series has no spread; injected anomalies would vanish",
        ));
    }

    let magnitude = anomaly_factor * spread;
    let mut indices = rand::seq::index::sample(rng, series.len(), num_anomalies).into_vec();
    indices.sort_unstable();

    let mut out = series.to_vec();
    for &idx in &indices {
        if rng.random_bool(0.5) {
            out[idx] += magnitude;
        } else {
            out[idx] -= magnitude;
        }
    }

    debug!(count = num_anomalies, magnitude, "anomalies injected");
    Ok((out, indices))
}
