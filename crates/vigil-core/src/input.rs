//! Flat-file series input: one header line, then one float per line.

use crate::error::{DetectionError, Result};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Load a series from `path`, skipping the header line and blank lines.
pub fn load_series(path: impl AsRef<Path>) -> Result<Vec<f64>> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| DetectionError::FileAccess {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let series = parse_series(&contents).map_err(|reason| DetectionError::FileAccess {
        path: path.to_path_buf(),
        reason,
    })?;
    debug!(path = %path.display(), len = series.len(), "series loaded");
    Ok(series)
}

/// Parse file contents; the error names the offending line (1-based).
pub fn parse_series(contents: &str) -> std::result::Result<Vec<f64>, String> {
    let mut series = Vec::new();
    for (line_no, line) in contents.lines().enumerate().skip(1) {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let value: f64 = trimmed
            .parse()
            .map_err(|_| format!("line {}: '{}' is not a number", line_no + 1, trimmed))?;
        if !value.is_finite() {
            return Err(format!("line {}: '{}' is not a finite number", line_no + 1, trimmed));
        }
        series.push(value);
    }
    if series.is_empty() {
        return Err("no values after the header line".to_string());
    }
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_skipped() {
        let series = parse_series("value\n1.5\n-2\n\n3e2\n").unwrap();
        assert_eq!(series, vec![1.5, -2.0, 300.0]);
    }

    #[test]
    fn test_bad_line_reported() {
        let err = parse_series("value\n1.0\nabc\n").unwrap_err();
        assert!(err.contains("line 3"), "{}", err);
        assert!(parse_series("only header\n").is_err());
    }

    #[test]
    fn test_non_finite_lines_rejected() {
        let err = parse_series("value\n1\nnan\n").unwrap_err();
        assert!(err.contains("line 3"), "{}", err);
        assert!(parse_series("value\ninf\n").is_err());
        assert!(parse_series("value\n2\n-infinity\n").is_err());
    }

    #[test]
    fn test_non_finite_file_is_file_access() {
        let path = std::env::temp_dir().join(format!("vigil-nan-{}.txt", std::process::id()));
        fs::write(&path, "value\n0\n1\nNaN\n0\n").unwrap();
        let err = load_series(&path).unwrap_err();
        fs::remove_file(&path).ok();
        assert!(matches!(err, DetectionError::FileAccess { .. }), "{:?}", err);
    }

    #[test]
    fn test_missing_file_is_file_access() {
        let err = load_series("/definitely/not/here/series.txt").unwrap_err();
        assert!(matches!(err, DetectionError::FileAccess { .. }));
        assert!(err.is_input_error());
    }

    #[test]
    fn test_load_from_disk() {
        let path = std::env::temp_dir().join(format!("vigil-input-{}.txt", std::process::id()));
        fs::write(&path, "series\n1\n2\n3\n").unwrap();
        let series = load_series(&path).unwrap();
        fs::remove_file(&path).ok();
        assert_eq!(series, vec![1.0, 2.0, 3.0]);
    }
}
