//! Run orchestration
//!
//! ```text
//!  SeriesSource ──► load_series ──► add_anomalies? ──► Detector ──► RunOutcome
//!  (generator|file)                 (InjectionConfig)   (DetectorConfig)
//! ```
//!
//! The orchestrator owns the random source for a run, so a seeded
//! `RunConfig` always produces the same series, injections and report.

use crate::generator::{self, ArimaParams, GarchParams};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use vigil_core::{DetectionError, DetectionReport, DetectorConfig, Result, build_detector};

fn default_steps() -> usize {
    1000
}

fn default_volatility() -> f64 {
    1.0
}

fn default_period() -> usize {
    100
}

fn default_lambda() -> f64 {
    5.0
}

// ============================================================================
// GENERATOR SELECTION
// ============================================================================

/// Which synthetic generator to run, with its parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GeneratorConfig {
    RandomWalk {
        #[serde(default = "default_steps")]
        steps: usize,
        #[serde(default)]
        drift: f64,
        #[serde(default = "default_volatility")]
        volatility: f64,
    },
    BrownianMotion {
        #[serde(default = "default_steps")]
        steps: usize,
        #[serde(default)]
        drift: f64,
        #[serde(default = "default_volatility")]
        volatility: f64,
    },
    Seasonal {
        #[serde(default = "default_steps")]
        steps: usize,
        #[serde(default = "default_period")]
        period: usize,
        #[serde(default = "default_volatility")]
        noise_std: f64,
    },
    Poisson {
        #[serde(default = "default_steps")]
        steps: usize,
        #[serde(default = "default_lambda")]
        lambda: f64,
    },
    Arima {
        #[serde(default = "default_steps")]
        steps: usize,
        #[serde(default)]
        params: ArimaParams,
    },
    Garch {
        #[serde(default = "default_steps")]
        steps: usize,
        #[serde(default)]
        params: GarchParams,
    },
    DataStream {
        #[serde(default = "default_steps")]
        steps: usize,
    },
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::DataStream {
            steps: default_steps(),
        }
    }
}

impl GeneratorConfig {
    /// Names accepted by [`GeneratorConfig::from_kind`]
    pub const KINDS: [&'static str; 7] = [
        "random_walk",
        "brownian_motion",
        "seasonal",
        "poisson",
        "arima",
        "garch",
        "data_stream",
    ];

    /// Default parameters for a generator name (`-` and `_` are interchangeable).
    pub fn from_kind(kind: &str) -> Option<Self> {
        let steps = default_steps();
        let config = match kind.replace('-', "_").as_str() {
            "random_walk" => Self::RandomWalk {
                steps,
                drift: 0.0,
                volatility: default_volatility(),
            },
            "brownian_motion" | "brownian" => Self::BrownianMotion {
                steps,
                drift: 0.0,
                volatility: default_volatility(),
            },
            "seasonal" => Self::Seasonal {
                steps,
                period: default_period(),
                noise_std: default_volatility(),
            },
            "poisson" => Self::Poisson {
                steps,
                lambda: default_lambda(),
            },
            "arima" => Self::Arima {
                steps,
                params: ArimaParams::default(),
            },
            "garch" => Self::Garch {
                steps,
                params: GarchParams::default(),
            },
            "data_stream" | "stream" => Self::DataStream { steps },
            _ => return None,
        };
        Some(config)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::RandomWalk { .. } => "random_walk",
            Self::BrownianMotion { .. } => "brownian_motion",
            Self::Seasonal { .. } => "seasonal",
            Self::Poisson { .. } => "poisson",
            Self::Arima { .. } => "arima",
            Self::Garch { .. } => "garch",
            Self::DataStream { .. } => "data_stream",
        }
    }

    pub fn steps(&self) -> usize {
        match *self {
            Self::RandomWalk { steps, .. }
            | Self::BrownianMotion { steps, .. }
            | Self::Seasonal { steps, .. }
            | Self::Poisson { steps, .. }
            | Self::Arima { steps, .. }
            | Self::Garch { steps, .. }
            | Self::DataStream { steps } => steps,
        }
    }

    pub fn with_steps(mut self, new_steps: usize) -> Self {
        match &mut self {
            Self::RandomWalk { steps, .. }
            | Self::BrownianMotion { steps, .. }
            | Self::Seasonal { steps, .. }
            | Self::Poisson { steps, .. }
            | Self::Arima { steps, .. }
            | Self::Garch { steps, .. }
            | Self::DataStream { steps } => *steps = new_steps,
        }
        self
    }

    /// Seasonal period the generated series is known to carry, if any
    pub fn period(&self) -> Option<usize> {
        match *self {
            Self::Seasonal { period, .. } => Some(period),
            Self::DataStream { .. } => Some(100),
            _ => None,
        }
    }

    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<f64>> {
        match self {
            Self::RandomWalk {
                steps,
                drift,
                volatility,
            } => generator::random_walk(*steps, *drift, *volatility, rng),
            Self::BrownianMotion {
                steps,
                drift,
                volatility,
            } => generator::brownian_motion(*steps, *drift, *volatility, rng),
            Self::Seasonal {
                steps,
                period,
                noise_std,
            } => generator::seasonal_data(*steps, *period, *noise_std, rng),
            Self::Poisson { steps, lambda } => generator::poisson_process(*lambda, *steps, rng),
            Self::Arima { steps, params } => generator::arima_data(*steps, params, rng),
            Self::Garch { steps, params } => generator::garch_data(*steps, params, rng),
            Self::DataStream { steps } => generator::data_stream(*steps, rng),
        }
    }
}

// ============================================================================
// RUN CONFIGURATION
// ============================================================================

/// Where the series comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesSource {
    Generator(GeneratorConfig),
    File(PathBuf),
}

impl Default for SeriesSource {
    fn default() -> Self {
        Self::Generator(GeneratorConfig::default())
    }
}

/// Synthetic anomaly injection applied after loading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InjectionConfig {
    /// Number of distinct points to perturb (default: 10)
    pub count: usize,
    /// Perturbation size in population std devs (default: 3.0)
    pub factor: f64,
}

impl Default for InjectionConfig {
    fn default() -> Self {
        Self {
            count: 10,
            factor: 3.0,
        }
    }
}

/// Everything needed for one detection run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub source: SeriesSource,
    pub detector: DetectorConfig,
    pub injection: Option<InjectionConfig>,
    /// Absent seed draws from OS entropy
    pub seed: Option<u64>,
}

impl RunConfig {
    pub fn from_json_str(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file_error = |reason: String| DetectionError::FileAccess {
            path: path.to_path_buf(),
            reason,
        };
        let contents = fs::read_to_string(path).map_err(|e| file_error(e.to_string()))?;
        let config = Self::from_json_str(&contents).map_err(|e| file_error(e.to_string()))?;
        config.detector.validate()?;
        Ok(config)
    }
}

// ============================================================================
// ORCHESTRATOR
// ============================================================================

/// Result of a full run
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Series the detector saw, after any injection
    pub series: Vec<f64>,
    /// Indices perturbed by injection, ascending
    pub injected: Vec<usize>,
    pub report: DetectionReport,
}

impl RunOutcome {
    /// Injected indices the detector also flagged
    pub fn recovered(&self) -> Vec<usize> {
        self.injected
            .iter()
            .copied()
            .filter(|&i| self.report.is_flagged(i))
            .collect()
    }
}

/// Drives load → inject → detect for one `RunConfig`
pub struct Orchestrator {
    config: RunConfig,
    rng: StdRng,
}

impl Orchestrator {
    pub fn new(config: RunConfig) -> Result<Self> {
        config.detector.validate()?;
        let rng = match config.seed {
            Some(seed) => generator::seeded_rng(seed),
            None => StdRng::from_os_rng(),
        };
        Ok(Self { config, rng })
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn load_series(&mut self) -> Result<Vec<f64>> {
        let series = match &self.config.source {
            SeriesSource::Generator(generator) => {
                let series = generator.generate(&mut self.rng)?;
                info!(kind = generator.kind(), len = series.len(), "series generated");
                series
            }
            SeriesSource::File(path) => {
                let series = vigil_core::load_series(path)?;
                info!(path = %path.display(), len = series.len(), "series loaded");
                series
            }
        };
        Ok(series)
    }

    /// Load the series and apply the configured injection.
    pub fn prepare(&mut self) -> Result<(Vec<f64>, Vec<usize>)> {
        let series = self.load_series()?;
        match self.config.injection {
            Some(injection) => {
                let (series, injected) = generator::add_anomalies(
                    &series,
                    injection.count,
                    injection.factor,
                    &mut self.rng,
                )?;
                info!(count = injected.len(), factor = injection.factor, "anomalies injected");
                Ok((series, injected))
            }
            None => Ok((series, Vec::new())),
        }
    }

    pub fn run(&mut self) -> Result<RunOutcome> {
        let (series, injected) = self.prepare()?;
        let report = detect(&series, &self.config.detector).inspect_err(|e| {
            warn!(method = self.config.detector.method_name(), error = %e, "detection failed");
        })?;
        Ok(RunOutcome {
            series,
            injected,
            report,
        })
    }
}

/// Run one detector over an already materialized series.
pub fn detect(series: &[f64], config: &DetectorConfig) -> Result<DetectionReport> {
    let detector = build_detector(config)?;
    let report = detector.report(series)?;
    info!(
        algorithm = detector.name(),
        len = series.len(),
        anomalies = report.anomaly_count(),
        "detection complete"
    );
    Ok(report)
}

/// Run several detectors over the same series, in order.
pub fn compare(series: &[f64], configs: &[DetectorConfig]) -> Result<Vec<DetectionReport>> {
    configs.iter().map(|c| detect(series, c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_core::{EwmaConfig, ShEsdConfig, ZScoreConfig};

    #[test]
    fn test_generator_config_json() {
        let config: GeneratorConfig =
            serde_json::from_str(r#"{"kind":"seasonal","period":24}"#).unwrap();
        assert_eq!(
            config,
            GeneratorConfig::Seasonal {
                steps: 1000,
                period: 24,
                noise_std: 1.0
            }
        );
        let config: GeneratorConfig =
            serde_json::from_str(r#"{"kind":"garch","params":{"beta":0.8}}"#).unwrap();
        match config {
            GeneratorConfig::Garch { params, .. } => {
                assert_eq!(params.beta, 0.8);
                assert_eq!(params.omega, 0.1);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_from_kind_covers_every_kind() {
        for kind in GeneratorConfig::KINDS {
            let config = GeneratorConfig::from_kind(kind).unwrap();
            assert_eq!(config.kind(), kind);
            assert_eq!(config.steps(), 1000);
        }
        assert_eq!(
            GeneratorConfig::from_kind("random-walk").map(|c| c.kind()),
            Some("random_walk")
        );
        assert!(GeneratorConfig::from_kind("lorenz").is_none());
        assert_eq!(GeneratorConfig::default().with_steps(42).steps(), 42);
    }

    #[test]
    fn test_run_config_json_defaults() {
        let config = RunConfig::from_json_str(
            r#"{
                "source": {"generator": {"kind": "random_walk", "steps": 300}},
                "detector": {"method": "ewma", "alpha": 0.5},
                "injection": {"count": 4},
                "seed": 7
            }"#,
        )
        .unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(
            config.injection,
            Some(InjectionConfig {
                count: 4,
                factor: 3.0
            })
        );
        assert_eq!(
            config.detector,
            DetectorConfig::Ewma(EwmaConfig {
                alpha: 0.5,
                threshold: 3.0
            })
        );

        let empty = RunConfig::from_json_str("{}").unwrap();
        assert_eq!(empty, RunConfig::default());
    }

    #[test]
    fn test_seeded_run_is_reproducible() {
        let config = RunConfig {
            source: SeriesSource::Generator(GeneratorConfig::default()),
            detector: DetectorConfig::ZScore(ZScoreConfig::default()),
            injection: Some(InjectionConfig::default()),
            seed: Some(99),
        };
        let a = Orchestrator::new(config.clone()).unwrap().run().unwrap();
        let b = Orchestrator::new(config).unwrap().run().unwrap();
        assert_eq!(a.series, b.series);
        assert_eq!(a.injected, b.injected);
        assert_eq!(a.report.anomalies, b.report.anomalies);
        assert_eq!(a.injected.len(), 10);
    }

    #[test]
    fn test_invalid_detector_rejected_before_running() {
        let config = RunConfig {
            detector: DetectorConfig::ShEsd(ShEsdConfig {
                period: 1,
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(Orchestrator::new(config).is_err());
    }

    #[test]
    fn test_missing_config_file() {
        let err = RunConfig::from_json_file("/no/such/run.json").unwrap_err();
        assert!(err.is_input_error());
    }

    #[test]
    fn test_compare_preserves_order() {
        let series = generator::data_stream(1000, &mut generator::seeded_rng(1)).unwrap();
        let reports = compare(
            &series,
            &[
                DetectorConfig::ZScore(ZScoreConfig::default()),
                DetectorConfig::Ewma(EwmaConfig::default()),
                DetectorConfig::ShEsd(ShEsdConfig::default()),
            ],
        )
        .unwrap();
        let names: Vec<&str> = reports.iter().map(|r| r.algorithm.as_str()).collect();
        assert_eq!(names, vec!["Z-Score", "EWMA", "S-H-ESD"]);
        assert!(reports.iter().all(|r| r.series_len == 1000));
    }
}
