//! Detector Output
//!
//! Every detector reports a list of `AnomalyRecord`s: the position of a
//! flagged point and the series value observed there. `DetectionReport`
//! wraps one detection run for rendering or JSON export.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A flagged point: index into the series and the value found there
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnomalyRecord {
    pub index: usize,
    pub value: f64,
}

impl AnomalyRecord {
    pub fn new(index: usize, value: f64) -> Self {
        Self { index, value }
    }

    /// Record for `index`, taking the value from `series`.
    pub fn at(series: &[f64], index: usize) -> Self {
        Self::new(index, series[index])
    }

    pub fn as_pair(&self) -> (usize, f64) {
        (self.index, self.value)
    }
}

impl From<(usize, f64)> for AnomalyRecord {
    fn from((index, value): (usize, f64)) -> Self {
        Self::new(index, value)
    }
}

impl From<AnomalyRecord> for (usize, f64) {
    fn from(record: AnomalyRecord) -> Self {
        record.as_pair()
    }
}

/// Result of one detection run, handed to the renderer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionReport {
    pub run_id: Uuid,
    pub algorithm: String,
    pub series_len: usize,
    pub anomalies: Vec<AnomalyRecord>,
    pub generated_at: DateTime<Utc>,
}

impl DetectionReport {
    pub fn new(
        algorithm: impl Into<String>,
        series_len: usize,
        anomalies: Vec<AnomalyRecord>,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            algorithm: algorithm.into(),
            series_len,
            anomalies,
            generated_at: Utc::now(),
        }
    }

    pub fn anomaly_count(&self) -> usize {
        self.anomalies.len()
    }

    /// Fraction of the series that was flagged
    pub fn anomaly_ratio(&self) -> f64 {
        self.anomalies.len() as f64 / self.series_len.max(1) as f64
    }

    pub fn is_flagged(&self, index: usize) -> bool {
        self.anomalies.iter().any(|a| a.index == index)
    }

    /// Flagged indices in ascending order
    pub fn sorted_indices(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = self.anomalies.iter().map(|a| a.index).collect();
        indices.sort_unstable();
        indices
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
