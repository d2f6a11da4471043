//! Shared descriptive statistics.

/// Spread at or below this fraction of the data's magnitude is treated as zero.
pub const SPREAD_TOLERANCE: f64 = 1e-12;

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divides by n)
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|&x| (x - m).powi(2)).sum();
    (ss / values.len() as f64).sqrt()
}

/// Sample standard deviation (divides by n - 1)
pub fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|&x| (x - m).powi(2)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}

/// Largest absolute value, 0.0 for an empty slice
pub fn max_abs(values: &[f64]) -> f64 {
    values.iter().fold(0.0_f64, |acc, &x| acc.max(x.abs()))
}

/// True when `spread` is rounding noise relative to `scale`.
pub fn is_negligible(spread: f64, scale: f64) -> bool {
    !(spread > SPREAD_TOLERANCE * scale.abs())
}
