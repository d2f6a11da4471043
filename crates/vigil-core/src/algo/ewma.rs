use crate::algo::stats;
use crate::config::{check_alpha, check_threshold};
use crate::error::{Result, ensure_finite, ensure_non_empty};
use crate::signal::AnomalyRecord;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Exponential smoother: s[0] = x[0], s[t] = alpha * x[t] + (1 - alpha) * s[t-1]
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Ewma {
    alpha: f64,
    value: f64,
    initialized: bool,
}

impl Ewma {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            value: 0.0,
            initialized: false,
        }
    }

    pub fn update(&mut self, sample: f64) -> f64 {
        if !self.initialized {
            self.value = sample;
            self.initialized = true;
        } else {
            self.value = self.alpha * sample + (1.0 - self.alpha) * self.value;
        }
        self.value
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

/// Smoothed copy of `series`, same length.
pub fn ewma(series: &[f64], alpha: f64) -> Result<Vec<f64>> {
    ensure_non_empty(series, "ewma")?;
    ensure_finite(series, "ewma")?;
    check_alpha(alpha)?;
    let mut smoother = Ewma::new(alpha);
    Ok(series.iter().map(|&x| smoother.update(x)).collect())
}

/// Flags every point whose distance from the smoothed series exceeds
/// `threshold` standard deviations of the full residual vector.
pub fn detect_ewma(series: &[f64], alpha: f64, threshold: f64) -> Result<Vec<AnomalyRecord>> {
    check_threshold(threshold)?;
    let smoothed = ewma(series, alpha)?;

    let residuals: Vec<f64> = series
        .iter()
        .zip(smoothed.iter())
        .map(|(x, s)| (x - s).abs())
        .collect();
    let spread = stats::std_dev(&residuals);

    if stats::is_negligible(spread, stats::max_abs(series)) {
        debug!(len = series.len(), alpha, "ewma residuals have no spread");
        return Ok(Vec::new());
    }

    let limit = threshold * spread;
    let anomalies: Vec<AnomalyRecord> = residuals
        .iter()
        .enumerate()
        .filter(|&(_, &r)| r > limit)
        .map(|(t, _)| AnomalyRecord::at(series, t))
        .collect();

    debug!(
        len = series.len(),
        alpha,
        threshold,
        residual_std = spread,
        anomalies = anomalies.len(),
        "ewma scan complete"
    );
    Ok(anomalies)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DetectionError;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_smoothing_recurrence() {
        let smoothed = ewma(&[10.0, 20.0, 20.0], 0.5).unwrap();
        assert_eq!(smoothed, vec![10.0, 15.0, 17.5]);
    }

    #[test]
    fn test_first_value_and_length_preserved() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..20 {
            let len = rng.random_range(1..300);
            let alpha = rng.random_range(0.01..=1.0);
            let series: Vec<f64> = (0..len).map(|_| rng.random_range(-100.0..100.0)).collect();

            let smoothed = ewma(&series, alpha).unwrap();
            assert_eq!(smoothed.len(), series.len());
            assert_eq!(smoothed[0], series[0]);
        }
    }

    #[test]
    fn test_alpha_one_tracks_input() {
        let series = [3.0, -1.0, 8.0];
        assert_eq!(ewma(&series, 1.0).unwrap(), series.to_vec());
    }

    #[test]
    fn test_spike_detected() {
        let mut series: Vec<f64> = (0..200).map(|i| ((i as f64) * 0.3).sin()).collect();
        series[120] = 60.0;

        let anomalies = detect_ewma(&series, 0.3, 3.0).unwrap();
        assert!(anomalies.iter().any(|a| a.index == 120));
        for a in &anomalies {
            assert_eq!(a.value, series[a.index]);
        }
    }

    #[test]
    fn test_spike_detected_on_large_offset() {
        let mut series: Vec<f64> = (0..200).map(|i| 1e10 + ((i as f64) * 0.3).sin()).collect();
        series[120] = 1e10 + 60.0;

        let anomalies = detect_ewma(&series, 0.3, 3.0).unwrap();
        assert!(anomalies.iter().any(|a| a.index == 120), "{:?}", anomalies);
    }

    #[test]
    fn test_index_zero_never_flagged() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..20 {
            let mut series: Vec<f64> = (0..100).map(|_| rng.random_range(-1.0..1.0)).collect();
            series[0] = 1_000.0;
            let anomalies = detect_ewma(&series, 0.3, 1.0).unwrap();
            assert!(anomalies.iter().all(|a| a.index != 0));
        }
    }

    #[test]
    fn test_constant_series() {
        let series = vec![5.0; 300];
        for alpha in [0.05, 0.3, 0.7, 1.0] {
            assert!(detect_ewma(&series, alpha, 0.1).unwrap().is_empty());
        }
    }

    #[test]
    fn test_invalid_arguments() {
        assert!(matches!(ewma(&[], 0.3), Err(DetectionError::InvalidInput(_))));
        assert!(ewma(&[1.0], 0.0).is_err());
        assert!(detect_ewma(&[1.0, 2.0], 0.3, 0.0).is_err());
    }

    #[test]
    fn test_non_finite_values_rejected() {
        let mut series: Vec<f64> = (0..200).map(|i| (i % 2) as f64).collect();
        series[10] = f64::NAN;
        series[150] = 100.0;
        assert!(matches!(
            detect_ewma(&series, 0.3, 3.0),
            Err(DetectionError::InvalidInput(_))
        ));
        assert!(ewma(&[1.0, f64::INFINITY], 0.3).is_err());
    }
}
