//! Text renderers for a `(series, DetectionReport)` pair.

use std::io::{self, Write};
use std::thread;
use std::time::Duration;
use vigil_core::DetectionReport;

/// Delay between points in real-time replay
pub const DEFAULT_FRAME_DELAY: Duration = Duration::from_millis(10);

fn write_header<W: Write + ?Sized>(
    out: &mut W,
    series: &[f64],
    report: &DetectionReport,
    mode: &str,
) -> io::Result<()> {
    writeln!(
        out,
        "=== {}anomaly detection using {} ===",
        mode, report.algorithm
    )?;
    writeln!(
        out,
        "points: {}  anomalies: {}  ({:.2}%)",
        series.len(),
        report.anomaly_count(),
        report.anomaly_ratio() * 100.0
    )
}

/// Summary header followed by one `index value` line per anomaly, in
/// detector order.
pub fn render_static<W: Write + ?Sized>(
    out: &mut W,
    series: &[f64],
    report: &DetectionReport,
) -> io::Result<()> {
    write_header(out, series, report, "")?;
    if let (Some(lo), Some(hi)) = (
        series.iter().copied().reduce(f64::min),
        series.iter().copied().reduce(f64::max),
    ) {
        writeln!(out, "range: [{:.4}, {:.4}]", lo, hi)?;
    }
    writeln!(out, "{:>8}  {:>14}", "index", "value")?;
    for a in &report.anomalies {
        writeln!(out, "{:>8}  {:>14.4}", a.index, a.value)?;
    }
    out.flush()
}

/// Replay the series one point per line, marking flagged points.
pub fn render_realtime<W: Write + ?Sized>(
    out: &mut W,
    series: &[f64],
    report: &DetectionReport,
    delay: Duration,
) -> io::Result<()> {
    write_header(out, series, report, "real-time ")?;
    let flagged = report.sorted_indices();
    for (i, value) in series.iter().enumerate() {
        let marker = if flagged.binary_search(&i).is_ok() {
            "  <-- anomaly"
        } else {
            ""
        };
        writeln!(out, "{:>8}  {:>14.4}{}", i, value, marker)?;
        out.flush()?;
        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_core::AnomalyRecord;

    fn sample() -> (Vec<f64>, DetectionReport) {
        let series = vec![1.0, 2.0, 50.0, 3.0];
        let report = DetectionReport::new("EWMA", series.len(), vec![AnomalyRecord::new(2, 50.0)]);
        (series, report)
    }

    #[test]
    fn test_static_lists_anomalies() {
        let (series, report) = sample();
        let mut out = Vec::new();
        render_static(&mut out, &series, &report).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("using EWMA"));
        assert!(text.contains("anomalies: 1"));
        assert!(text.contains("range: [1.0000, 50.0000]"));
        assert!(text.lines().last().unwrap().trim().starts_with("2 "));
    }

    #[test]
    fn test_realtime_marks_each_flagged_point() {
        let (series, report) = sample();
        let mut out = Vec::new();
        render_realtime(&mut out, &series, &report, Duration::ZERO).unwrap();
        let text = String::from_utf8(out).unwrap();

        let body: Vec<&str> = text.lines().skip(2).collect();
        assert_eq!(body.len(), 4);
        assert!(body[2].ends_with("<-- anomaly"));
        assert_eq!(body.iter().filter(|l| l.contains("anomaly")).count(), 1);
    }
}
