//! Seasonal Hybrid ESD (S-H-ESD)
//!
//! 1. Remove trend and seasonality with an additive decomposition.
//! 2. Run the generalized Extreme Studentized Deviate test on the residuals:
//!    each round removes the point furthest from the mean (in sample std
//!    units) if it beats the round's critical value, and stops at the first
//!    round that does not.
//!
//! Records point back into the original series: the index is the series
//! index and the value is the series value, never the residual.

use crate::algo::decompose::decompose_additive;
use crate::algo::stats;
use crate::algo::student_t::t_inverse_survival;
use crate::config::check_open_fraction;
use crate::error::{DetectionError, Result, ensure_non_empty};
use crate::signal::AnomalyRecord;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default ESD significance level
pub const DEFAULT_SIGNIFICANCE: f64 = 0.05;

/// One accepted round of the ESD test
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EsdOutlier {
    /// Index of the point in the original series
    pub index: usize,
    /// Residual value that was removed
    pub residual: f64,
    /// |r - mean| / std for the removed point
    pub statistic: f64,
    /// Critical value the statistic exceeded
    pub critical: f64,
}

/// Critical value λ_i of round `i` when the test started with `n` points.
pub fn esd_critical_value(n: usize, i: usize, significance: f64) -> f64 {
    let remaining = (n - i) as f64;
    let df = remaining - 1.0;
    let lambda = t_inverse_survival(significance / (2.0 * remaining), df);
    lambda * remaining / ((df + lambda * lambda) * remaining).sqrt()
}

/// Generalized ESD over `(series index, residual)` pairs.
///
/// At most `floor(n * max_anomalies)` outliers are returned, in the order
/// they were removed. `scale` is the magnitude below which the residual
/// spread counts as rounding noise; the test stops there.
pub fn esd_test(
    residuals: &[(usize, f64)],
    max_anomalies: f64,
    significance: f64,
    scale: f64,
) -> Result<Vec<EsdOutlier>> {
    check_open_fraction("max_anomalies", max_anomalies)?;
    check_open_fraction("significance", significance)?;

    let n = residuals.len();
    let max_outliers = (n as f64 * max_anomalies).floor() as usize;
    let mut working: Vec<(usize, f64)> = residuals.to_vec();
    let mut outliers = Vec::with_capacity(max_outliers);

    for i in 0..max_outliers {
        let values: Vec<f64> = working.iter().map(|&(_, r)| r).collect();
        let mean = stats::mean(&values);
        let spread = stats::sample_std_dev(&values);
        if stats::is_negligible(spread, scale) {
            debug!(round = i, spread, "esd residual spread negligible, stopping");
            break;
        }

        let Some((pos, statistic)) = values
            .iter()
            .map(|r| (r - mean).abs() / spread)
            .enumerate()
            .fold(None, |best: Option<(usize, f64)>, (pos, z)| match best {
                Some((_, top)) if top >= z => best,
                _ => Some((pos, z)),
            })
        else {
            break;
        };

        let critical = esd_critical_value(n, i, significance);
        if !(statistic > critical) {
            break;
        }

        let (index, residual) = working.remove(pos);
        outliers.push(EsdOutlier {
            index,
            residual,
            statistic,
            critical,
        });
    }

    Ok(outliers)
}

/// S-H-ESD with the default significance level.
pub fn sh_esd(series: &[f64], period: usize, max_anomalies: f64) -> Result<Vec<AnomalyRecord>> {
    sh_esd_with_significance(series, period, max_anomalies, DEFAULT_SIGNIFICANCE)
}

pub fn sh_esd_with_significance(
    series: &[f64],
    period: usize,
    max_anomalies: f64,
    significance: f64,
) -> Result<Vec<AnomalyRecord>> {
    ensure_non_empty(series, "s-h-esd")?;
    if period == 0 {
        return Err(DetectionError::invalid("period must be positive"));
    }

    let decomposition = decompose_additive(series, period)?;
    let residuals = decomposition.residual_points();
    let outliers = esd_test(&residuals, max_anomalies, significance, stats::max_abs(series))?;

    debug!(
        len = series.len(),
        period,
        residuals = residuals.len(),
        max_anomalies,
        anomalies = outliers.len(),
        "s-h-esd complete"
    );

    Ok(outliers
        .iter()
        .map(|o| AnomalyRecord::at(series, o.index))
        .collect())
}
