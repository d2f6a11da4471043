//! Rolling Z-Score Detection
//!
//! Each point is scored against the `window_size` observations that came
//! before it; the point itself joins the window only after it is scored.
//! Two implementations share the same window:
//! - `detect_zscore` recomputes mean and std dev from the window each step
//! - `detect_zscore_incremental` keeps a running sum and sum of squares,
//!   O(1) per step
//!
//! Both report the same indices for the same input.

use crate::config::check_threshold;
use crate::error::{DetectionError, Result, ensure_finite, ensure_non_empty};
use crate::signal::AnomalyRecord;
use std::collections::VecDeque;
use tracing::debug;

/// Bounded FIFO of the most recent observations
///
/// Running sums are kept relative to an anchor value and rebuilt from the
/// stored values every `capacity` pushes, so they never accumulate more
/// than one window's worth of rounding and stay accurate when the series
/// sits far from zero.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    values: VecDeque<f64>,
    capacity: usize,
    anchor: f64,
    sum: f64,
    sum_sq: f64,
    since_rebuild: usize,
    /// Length of the trailing run of identical values
    equal_run: usize,
}

impl RollingWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            values: VecDeque::with_capacity(capacity),
            capacity,
            anchor: 0.0,
            sum: 0.0,
            sum_sq: 0.0,
            since_rebuild: 0,
            equal_run: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.values.len() == self.capacity
    }

    /// True when every stored value is identical.
    pub fn is_constant(&self) -> bool {
        !self.values.is_empty() && self.equal_run >= self.values.len()
    }

    /// Append a value, evicting the oldest one once at capacity.
    pub fn push(&mut self, value: f64) {
        self.equal_run = match self.values.back() {
            Some(&last) if last == value => self.equal_run + 1,
            _ => 1,
        };
        if self.values.is_empty() {
            self.anchor = value;
        }

        if self.is_full() {
            if let Some(old) = self.values.pop_front() {
                let d = old - self.anchor;
                self.sum -= d;
                self.sum_sq -= d * d;
            }
        }
        self.values.push_back(value);
        let d = value - self.anchor;
        self.sum += d;
        self.sum_sq += d * d;

        self.since_rebuild += 1;
        if self.since_rebuild >= self.capacity {
            self.rebuild();
        }
    }

    fn rebuild(&mut self) {
        if let Some(&first) = self.values.front() {
            self.anchor = first;
        }
        self.sum = 0.0;
        self.sum_sq = 0.0;
        for &x in &self.values {
            let d = x - self.anchor;
            self.sum += d;
            self.sum_sq += d * d;
        }
        self.since_rebuild = 0;
    }

    /// (mean, variance) recomputed from the stored values
    pub fn moments_exact(&self) -> (f64, f64) {
        let n = self.values.len() as f64;
        let mean = self.values.iter().sum::<f64>() / n;
        let variance = self.values.iter().map(|&x| (x - mean).powi(2)).sum::<f64>() / n;
        (mean, variance)
    }

    /// (mean, variance) from the running sums
    pub fn moments_running(&self) -> (f64, f64) {
        let n = self.values.len() as f64;
        let shift = self.sum / n;
        let variance = (self.sum_sq / n - shift * shift).max(0.0);
        (self.anchor + shift, variance)
    }
}

/// Z-score of `value`; 0.0 when the window has no spread.
fn z_score(value: f64, mean: f64, variance: f64) -> f64 {
    if !(variance > 0.0) {
        return 0.0;
    }
    (value - mean) / variance.sqrt()
}

fn validate(series: &[f64], window_size: usize, threshold: f64) -> Result<()> {
    ensure_non_empty(series, "z-score")?;
    ensure_finite(series, "z-score")?;
    if window_size == 0 {
        return Err(DetectionError::invalid("window_size must be positive"));
    }
    check_threshold(threshold)
}

fn scan(
    series: &[f64],
    window_size: usize,
    threshold: f64,
    moments: fn(&RollingWindow) -> (f64, f64),
) -> Vec<AnomalyRecord> {
    let mut window = RollingWindow::new(window_size);
    let mut anomalies = Vec::new();

    for (i, &value) in series.iter().enumerate() {
        if window.is_full() {
            let z = if window.is_constant() {
                0.0
            } else {
                let (mean, variance) = moments(&window);
                z_score(value, mean, variance)
            };
            if z.abs() > threshold {
                anomalies.push(AnomalyRecord::new(i, value));
            }
        }
        window.push(value);
    }

    anomalies
}

/// Rolling Z-score detection, recomputing window statistics at every step.
pub fn detect_zscore(
    series: &[f64],
    window_size: usize,
    threshold: f64,
) -> Result<Vec<AnomalyRecord>> {
    validate(series, window_size, threshold)?;
    let anomalies = scan(series, window_size, threshold, RollingWindow::moments_exact);
    debug!(
        len = series.len(),
        window_size,
        threshold,
        anomalies = anomalies.len(),
        "z-score scan complete"
    );
    Ok(anomalies)
}

/// Rolling Z-score detection from running sums.
pub fn detect_zscore_incremental(
    series: &[f64],
    window_size: usize,
    threshold: f64,
) -> Result<Vec<AnomalyRecord>> {
    validate(series, window_size, threshold)?;
    let anomalies = scan(series, window_size, threshold, RollingWindow::moments_running);
    debug!(
        len = series.len(),
        window_size,
        threshold,
        anomalies = anomalies.len(),
        "incremental z-score scan complete"
    );
    Ok(anomalies)
}
