//! # vigil-core
//!
//! Batch anomaly detection over a one-dimensional series.
//!
//! | Detector      | Module           | Idea                                            |
//! |---------------|------------------|-------------------------------------------------|
//! | Z-Score       | `algo::zscore`   | distance from the mean of the prior window      |
//! | EWMA          | `algo::ewma`     | distance from an exponentially smoothed series  |
//! | S-H-ESD       | `algo::esd`      | generalized ESD on seasonal-decomposition residuals |
//!
//! Every detector is a pure function of its inputs and returns
//! `AnomalyRecord`s `(index, value)`.
//!
//! ```rust
//! use vigil_core::algo::detect_zscore;
//!
//! let mut series: Vec<f64> = (0..100).map(|i| (i % 2) as f64).collect();
//! series[80] = 25.0;
//! let anomalies = detect_zscore(&series, 50, 3.0).unwrap();
//! assert_eq!(anomalies[0].index, 80);
//! ```

pub mod algo;
pub mod config;
pub mod detector;
pub mod error;
pub mod input;
pub mod signal;

pub use config::{DetectorConfig, EwmaConfig, ShEsdConfig, ZScoreConfig};
pub use detector::{Detector, EwmaDetector, ShEsdDetector, ZScoreDetector, build_detector};
pub use error::{DetectionError, Result};
pub use input::load_series;
pub use signal::{AnomalyRecord, DetectionReport};
