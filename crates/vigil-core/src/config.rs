//! Detector parameters with their documented defaults.

use crate::error::{DetectionError, Result};
use serde::{Deserialize, Serialize};

/// Rolling Z-score parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZScoreConfig {
    /// Number of prior observations each point is scored against (default: 50)
    pub window_size: usize,
    /// |z| above this is flagged (default: 3.0)
    pub threshold: f64,
    /// Use the running-sum variant (default: false)
    pub incremental: bool,
}

impl Default for ZScoreConfig {
    fn default() -> Self {
        Self {
            window_size: 50,
            threshold: 3.0,
            incremental: false,
        }
    }
}

impl ZScoreConfig {
    pub fn validate(&self) -> Result<()> {
        if self.window_size == 0 {
            return Err(DetectionError::invalid("window_size must be positive"));
        }
        check_threshold(self.threshold)
    }
}

/// EWMA residual detector parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EwmaConfig {
    /// Smoothing factor in (0, 1] (default: 0.3)
    pub alpha: f64,
    /// Residual std-devs above which a point is flagged (default: 3.0)
    pub threshold: f64,
}

impl Default for EwmaConfig {
    fn default() -> Self {
        Self {
            alpha: 0.3,
            threshold: 3.0,
        }
    }
}

impl EwmaConfig {
    pub fn validate(&self) -> Result<()> {
        check_alpha(self.alpha)?;
        check_threshold(self.threshold)
    }
}

/// S-H-ESD parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShEsdConfig {
    /// Seasonal period in samples (default: 100)
    pub period: usize,
    /// Upper bound on the flagged fraction, in (0, 1) (default: 0.05)
    pub max_anomalies: f64,
    /// ESD significance level, in (0, 1) (default: 0.05)
    pub significance: f64,
}

impl Default for ShEsdConfig {
    fn default() -> Self {
        Self {
            period: 100,
            max_anomalies: 0.05,
            significance: 0.05,
        }
    }
}

impl ShEsdConfig {
    pub fn validate(&self) -> Result<()> {
        if self.period < 2 {
            return Err(DetectionError::invalid(format!(
                "period must be at least 2, got {}",
                self.period
            )));
        }
        check_open_fraction("max_anomalies", self.max_anomalies)?;
        check_open_fraction("significance", self.significance)
    }
}

/// Detector selection plus its parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum DetectorConfig {
    #[serde(rename = "zscore")]
    ZScore(ZScoreConfig),
    Ewma(EwmaConfig),
    #[serde(rename = "shesd")]
    ShEsd(ShEsdConfig),
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self::ZScore(ZScoreConfig::default())
    }
}

impl DetectorConfig {
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::ZScore(c) => c.validate(),
            Self::Ewma(c) => c.validate(),
            Self::ShEsd(c) => c.validate(),
        }
    }

    pub fn method_name(&self) -> &'static str {
        match self {
            Self::ZScore(_) => "zscore",
            Self::Ewma(_) => "ewma",
            Self::ShEsd(_) => "shesd",
        }
    }
}

pub(crate) fn check_threshold(threshold: f64) -> Result<()> {
    if !(threshold.is_finite() && threshold > 0.0) {
        return Err(DetectionError::invalid(format!(
            "threshold must be positive and finite, got {threshold}"
        )));
    }
    Ok(())
}

pub(crate) fn check_alpha(alpha: f64) -> Result<()> {
    if !(alpha > 0.0 && alpha <= 1.0) {
        return Err(DetectionError::invalid(format!(
            "alpha must be in (0, 1], got {alpha}"
        )));
    }
    Ok(())
}

pub(crate) fn check_open_fraction(name: &str, value: f64) -> Result<()> {
    if !(value > 0.0 && value < 1.0) {
        return Err(DetectionError::invalid(format!(
            "{name} must be in (0, 1), got {value}"
        )));
    }
    Ok(())
}
