//! Additive seasonal decomposition: Y = T + S + R
//!
//! - Trend: centered moving average over one period (half-weight end taps
//!   for even periods), linearly extrapolated over the edge points it cannot
//!   cover using the `period` nearest defined values.
//! - Seasonal: per-phase mean of the detrended series, centered on zero.
//! - Residual: whatever is left.

use crate::error::{DetectionError, Result};
use serde::{Deserialize, Serialize};

/// Decomposed time series components
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decomposition {
    pub period: usize,
    pub trend: Vec<f64>,
    pub seasonal: Vec<f64>,
    pub residual: Vec<f64>,
}

impl Decomposition {
    /// Defined residuals paired with their original series index.
    pub fn residual_points(&self) -> Vec<(usize, f64)> {
        self.residual
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_finite())
            .map(|(i, &r)| (i, r))
            .collect()
    }
}

/// Perform additive decomposition with the given seasonal period
pub fn decompose_additive(series: &[f64], period: usize) -> Result<Decomposition> {
    if period < 2 {
        return Err(DetectionError::decomposition(format!(
            "period must be at least 2, got {period}"
        )));
    }
    let n = series.len();
    if n < 2 * period {
        return Err(DetectionError::decomposition(format!(
            "series of length {n} has fewer than two full periods of {period} (needs {})",
            2 * period
        )));
    }
    if let Some(i) = series.iter().position(|x| !x.is_finite()) {
        return Err(DetectionError::decomposition(format!(
            "series contains a non-finite value at index {i}"
        )));
    }

    let mut trend = centered_moving_average(series, period);
    extrapolate_trend(&mut trend, period);

    let detrended: Vec<f64> = series.iter().zip(trend.iter()).map(|(x, t)| x - t).collect();

    // Seasonal component (average by period position)
    let mut phase_means: Vec<f64> = (0..period)
        .map(|pos| {
            let values: Vec<f64> = detrended
                .iter()
                .skip(pos)
                .step_by(period)
                .copied()
                .filter(|v| v.is_finite())
                .collect();
            if values.is_empty() {
                f64::NAN
            } else {
                values.iter().sum::<f64>() / values.len() as f64
            }
        })
        .collect();
    let center = phase_means.iter().sum::<f64>() / period as f64;
    for m in phase_means.iter_mut() {
        *m -= center;
    }

    let seasonal: Vec<f64> = (0..n).map(|i| phase_means[i % period]).collect();
    let residual: Vec<f64> = detrended
        .iter()
        .zip(seasonal.iter())
        .map(|(d, s)| d - s)
        .collect();

    Ok(Decomposition {
        period,
        trend,
        seasonal,
        residual,
    })
}

/// Two-sided moving average; NaN where the filter does not fit.
fn centered_moving_average(series: &[f64], period: usize) -> Vec<f64> {
    let n = series.len();
    let half = period / 2;
    let even = period % 2 == 0;
    let mut trend = vec![f64::NAN; n];

    for i in half..(n - half) {
        let window = &series[i - half..=i + half];
        let sum: f64 = if even {
            let inner: f64 = window[1..window.len() - 1].iter().sum();
            inner + 0.5 * (window[0] + window[window.len() - 1])
        } else {
            window.iter().sum()
        };
        trend[i] = sum / period as f64;
    }

    trend
}

/// Fill the undefined ends of `trend` with least-squares lines fitted on up
/// to `npoints` defined values next to each end.
fn extrapolate_trend(trend: &mut [f64], npoints: usize) {
    let Some(front) = trend.iter().position(|t| t.is_finite()) else {
        return;
    };
    let Some(back) = trend.iter().rposition(|t| t.is_finite()) else {
        return;
    };

    let front_last = (front + npoints).min(back).max(front + 1);
    let (k, c) = fit_line(trend, front, front_last);
    for (i, t) in trend.iter_mut().enumerate().take(front) {
        *t = k * i as f64 + c;
    }

    let back_first = back.saturating_sub(npoints).max(front);
    let back_last = back.max(back_first + 1);
    let (k, c) = fit_line(trend, back_first, back_last);
    for (i, t) in trend.iter_mut().enumerate().skip(back + 1) {
        *t = k * i as f64 + c;
    }
}

/// Slope and intercept of the least-squares line through `values[start..end]`.
fn fit_line(values: &[f64], start: usize, end: usize) -> (f64, f64) {
    let count = (end - start) as f64;
    let x_mean = (start..end).map(|x| x as f64).sum::<f64>() / count;
    let y_mean = values[start..end].iter().sum::<f64>() / count;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (x, &y) in (start..end).zip(values[start..end].iter()) {
        let dx = x as f64 - x_mean;
        sxy += dx * (y - y_mean);
        sxx += dx * dx;
    }

    let slope = if sxx > 0.0 { sxy / sxx } else { 0.0 };
    (slope, y_mean - slope * x_mean)
}
