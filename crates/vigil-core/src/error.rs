use std::path::PathBuf;

/// Errors raised by detectors, decomposition and series loading
#[derive(Debug, Clone, PartialEq)]
pub enum DetectionError {
    /// Empty series, non-positive counts, out-of-range parameters
    InvalidInput(String),
    /// The series cannot be decomposed with the requested period
    DecompositionFailure(String),
    /// Missing, unreadable or malformed input file
    FileAccess { path: PathBuf, reason: String },
}

impl DetectionError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn decomposition(msg: impl Into<String>) -> Self {
        Self::DecompositionFailure(msg.into())
    }

    /// File errors surface to callers the same way bad arguments do.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_) | Self::FileAccess { .. })
    }
}

impl std::fmt::Display for DetectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(e) => write!(f, "Invalid input: {}", e),
            Self::DecompositionFailure(e) => write!(f, "Decomposition failed: {}", e),
            Self::FileAccess { path, reason } => {
                write!(f, "Cannot read series from {}: {}", path.display(), reason)
            }
        }
    }
}

impl std::error::Error for DetectionError {}

pub type Result<T> = std::result::Result<T, DetectionError>;

/// Rejects an empty series with a message naming the caller.
pub(crate) fn ensure_non_empty(series: &[f64], what: &str) -> Result<()> {
    if series.is_empty() {
        return Err(DetectionError::invalid(format!("{what}: series is empty")));
    }
    Ok(())
}

/// Rejects NaN and infinite values, naming the first offending index.
pub(crate) fn ensure_finite(series: &[f64], what: &str) -> Result<()> {
    if let Some(i) = series.iter().position(|x| !x.is_finite()) {
        return Err(DetectionError::invalid(format!(
            "{what}: value at index {i} is not finite"
        )));
    }
    Ok(())
}
