//! Detector seam
//!
//! One trait in front of the three algorithms so callers can pick a
//! detector from configuration and run it over a materialized series.

use crate::algo::{esd, ewma, zscore};
use crate::config::{DetectorConfig, EwmaConfig, ShEsdConfig, ZScoreConfig};
use crate::error::Result;
use crate::signal::{AnomalyRecord, DetectionReport};

// ============================================================================
// CORE ABSTRACTIONS
// ============================================================================

/// Trait for all batch detectors
pub trait Detector {
    fn name(&self) -> &str;
    fn detect(&self, series: &[f64]) -> Result<Vec<AnomalyRecord>>;

    /// Run `detect` and wrap the result for rendering.
    fn report(&self, series: &[f64]) -> Result<DetectionReport> {
        let anomalies = self.detect(series)?;
        Ok(DetectionReport::new(self.name(), series.len(), anomalies))
    }
}

// ============================================================================
// DETECTOR IMPLEMENTATIONS
// ============================================================================

/// Rolling-window Z-score detector
#[derive(Debug, Clone)]
pub struct ZScoreDetector {
    config: ZScoreConfig,
}

impl ZScoreDetector {
    pub fn new(config: ZScoreConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }
}

impl Detector for ZScoreDetector {
    fn name(&self) -> &str {
        if self.config.incremental {
            "Z-Score (incremental)"
        } else {
            "Z-Score"
        }
    }

    fn detect(&self, series: &[f64]) -> Result<Vec<AnomalyRecord>> {
        let ZScoreConfig {
            window_size,
            threshold,
            incremental,
        } = self.config;
        if incremental {
            zscore::detect_zscore_incremental(series, window_size, threshold)
        } else {
            zscore::detect_zscore(series, window_size, threshold)
        }
    }
}

/// EWMA residual detector
#[derive(Debug, Clone)]
pub struct EwmaDetector {
    config: EwmaConfig,
}

impl EwmaDetector {
    pub fn new(config: EwmaConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }
}

impl Detector for EwmaDetector {
    fn name(&self) -> &str {
        "EWMA"
    }

    fn detect(&self, series: &[f64]) -> Result<Vec<AnomalyRecord>> {
        ewma::detect_ewma(series, self.config.alpha, self.config.threshold)
    }
}

/// Seasonal Hybrid ESD detector
#[derive(Debug, Clone)]
pub struct ShEsdDetector {
    config: ShEsdConfig,
}

impl ShEsdDetector {
    pub fn new(config: ShEsdConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }
}

impl Detector for ShEsdDetector {
    fn name(&self) -> &str {
        "S-H-ESD"
    }

    fn detect(&self, series: &[f64]) -> Result<Vec<AnomalyRecord>> {
        esd::sh_esd_with_significance(
            series,
            self.config.period,
            self.config.max_anomalies,
            self.config.significance,
        )
    }
}

/// Validate `config` and box the matching detector.
pub fn build_detector(config: &DetectorConfig) -> Result<Box<dyn Detector>> {
    Ok(match *config {
        DetectorConfig::ZScore(c) => Box::new(ZScoreDetector::new(c)?),
        DetectorConfig::Ewma(c) => Box::new(EwmaDetector::new(c)?),
        DetectorConfig::ShEsd(c) => Box::new(ShEsdDetector::new(c)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DetectionError;

    fn all_configs() -> Vec<DetectorConfig> {
        vec![
            DetectorConfig::ZScore(ZScoreConfig::default()),
            DetectorConfig::ZScore(ZScoreConfig {
                incremental: true,
                ..Default::default()
            }),
            DetectorConfig::Ewma(EwmaConfig::default()),
            DetectorConfig::ShEsd(ShEsdConfig {
                period: 25,
                ..Default::default()
            }),
        ]
    }

    #[test]
    fn test_constant_series_yields_nothing_from_any_detector() {
        let series = vec![5.0; 400];
        for config in all_configs() {
            let detector = build_detector(&config).unwrap();
            let found = detector.detect(&series).unwrap();
            assert!(found.is_empty(), "{} flagged {:?}", detector.name(), found);
        }
    }

    #[test]
    fn test_names_and_report() {
        let names: Vec<String> = all_configs()
            .iter()
            .map(|c| build_detector(c).unwrap().name().to_string())
            .collect();
        assert_eq!(
            names,
            vec!["Z-Score", "Z-Score (incremental)", "EWMA", "S-H-ESD"]
        );

        let mut series: Vec<f64> = (0..120).map(|i| (i % 3) as f64).collect();
        series[100] = 90.0;
        let detector = build_detector(&DetectorConfig::ZScore(ZScoreConfig::default())).unwrap();
        let report = detector.report(&series).unwrap();
        assert_eq!(report.algorithm, "Z-Score");
        assert_eq!(report.series_len, 120);
        assert!(report.is_flagged(100));
    }

    #[test]
    fn test_invalid_config_rejected_at_build() {
        let config = DetectorConfig::Ewma(EwmaConfig {
            alpha: 0.0,
            threshold: 3.0,
        });
        assert!(matches!(
            build_detector(&config),
            Err(DetectionError::InvalidInput(_))
        ));
    }
}
