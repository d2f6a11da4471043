//! Numbered interactive menu
//!
//! Each round asks for a series source, optional injection, a detector and
//! a renderer, then starts over. Invalid entries re-prompt the same
//! question; a failed run is reported and the round restarts. EOF (or `q`)
//! ends the session.

use crate::engine::{GeneratorConfig, InjectionConfig, detect};
use crate::generator::{self, ArimaParams, GarchParams};
use crate::render;
use rand::rngs::StdRng;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use vigil_core::{DetectorConfig, EwmaConfig, Result, ShEsdConfig, ZScoreConfig};

const GENERATION_CHOICES: [&str; 6] = [
    "ARIMA",
    "Brownian motion",
    "GARCH",
    "Poisson process",
    "Seasonal",
    "Load from file",
];
const DETECTION_CHOICES: [&str; 3] = ["Z-Score", "EWMA", "S-H-ESD"];
const VISUALIZATION_CHOICES: [&str; 2] = ["Static", "Real-time"];

/// Period used for S-H-ESD when the source carries no known period
const FALLBACK_PERIOD: usize = 100;

enum Source {
    Generated(GeneratorConfig),
    File(PathBuf),
}

impl Source {
    fn period(&self) -> usize {
        match self {
            Source::Generated(g) => g.period().unwrap_or(FALLBACK_PERIOD),
            Source::File(_) => FALLBACK_PERIOD,
        }
    }
}

pub struct Menu<R: BufRead, W: Write> {
    input: R,
    output: W,
    rng: StdRng,
    steps: usize,
    frame_delay: Duration,
}

impl<R: BufRead, W: Write> Menu<R, W> {
    pub fn new(input: R, output: W, rng: StdRng) -> Self {
        Self {
            input,
            output,
            rng,
            steps: 1000,
            frame_delay: render::DEFAULT_FRAME_DELAY,
        }
    }

    /// Length of generated series (default: 1000)
    pub fn with_steps(mut self, steps: usize) -> Self {
        self.steps = steps;
        self
    }

    pub fn with_frame_delay(mut self, delay: Duration) -> Self {
        self.frame_delay = delay;
        self
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Run rounds until the input ends; returns the number of completed runs.
    pub fn run(&mut self) -> io::Result<usize> {
        let mut completed = 0;
        loop {
            match self.round()? {
                Some(true) => completed += 1,
                Some(false) => {}
                None => break,
            }
        }
        writeln!(self.output, "Goodbye.")?;
        info!(completed, "interactive session ended");
        Ok(completed)
    }

    /// `None` on end of input, `Some(false)` when the run failed.
    fn round(&mut self) -> io::Result<Option<bool>> {
        let Some(source) = self.choose_source()? else {
            return Ok(None);
        };
        let Some(injection) = self.choose_injection()? else {
            return Ok(None);
        };
        let Some(detection) = self.choose("Select detection method", &DETECTION_CHOICES)? else {
            return Ok(None);
        };
        let Some(visual) = self.choose("Select visualization", &VISUALIZATION_CHOICES)? else {
            return Ok(None);
        };

        let detector = match detection {
            1 => DetectorConfig::ZScore(ZScoreConfig::default()),
            2 => DetectorConfig::Ewma(EwmaConfig::default()),
            _ => DetectorConfig::ShEsd(ShEsdConfig {
                period: source.period(),
                ..Default::default()
            }),
        };

        match self.execute(&source, injection, &detector) {
            Ok((series, report)) => {
                if visual == 1 {
                    render::render_static(&mut self.output, &series, &report)?;
                } else {
                    render::render_realtime(&mut self.output, &series, &report, self.frame_delay)?;
                }
                Ok(Some(true))
            }
            Err(e) => {
                warn!(error = %e, "run failed, restarting menu");
                writeln!(self.output, "Error: {}", e)?;
                Ok(Some(false))
            }
        }
    }

    fn execute(
        &mut self,
        source: &Source,
        injection: usize,
        detector: &DetectorConfig,
    ) -> Result<(Vec<f64>, vigil_core::DetectionReport)> {
        let series = match source {
            Source::Generated(g) => g.generate(&mut self.rng)?,
            Source::File(path) => vigil_core::load_series(path)?,
        };
        let series = if injection > 0 {
            let factor = InjectionConfig::default().factor;
            generator::add_anomalies(&series, injection, factor, &mut self.rng)?.0
        } else {
            series
        };
        let report = detect(&series, detector)?;
        Ok((series, report))
    }

    fn choose_source(&mut self) -> io::Result<Option<Source>> {
        let Some(choice) = self.choose("Select data generation method", &GENERATION_CHOICES)? else {
            return Ok(None);
        };
        let steps = self.steps;
        let source = match choice {
            1 => Source::Generated(GeneratorConfig::Arima {
                steps,
                params: ArimaParams::default(),
            }),
            2 => Source::Generated(GeneratorConfig::BrownianMotion {
                steps,
                drift: 0.0,
                volatility: 1.0,
            }),
            3 => Source::Generated(GeneratorConfig::Garch {
                steps,
                params: GarchParams::default(),
            }),
            4 => Source::Generated(GeneratorConfig::Poisson { steps, lambda: 5.0 }),
            5 => Source::Generated(GeneratorConfig::Seasonal {
                steps,
                period: 100,
                noise_std: 1.0,
            }),
            _ => loop {
                let Some(line) = self.prompt("Path to series file: ")? else {
                    return Ok(None);
                };
                if !line.is_empty() {
                    break Source::File(PathBuf::from(line));
                }
            },
        };
        Ok(Some(source))
    }

    fn choose_injection(&mut self) -> io::Result<Option<usize>> {
        loop {
            let Some(line) = self.prompt("Anomalies to inject [0]: ")? else {
                return Ok(None);
            };
            if line.is_empty() {
                return Ok(Some(0));
            }
            match line.parse::<usize>() {
                Ok(n) => return Ok(Some(n)),
                Err(_) => self.reject(&line)?,
            }
        }
    }

    /// 1-based choice among `options`.
    fn choose(&mut self, title: &str, options: &[&str]) -> io::Result<Option<usize>> {
        loop {
            writeln!(self.output, "{}:", title)?;
            for (i, option) in options.iter().enumerate() {
                writeln!(self.output, "  {}. {}", i + 1, option)?;
            }
            let Some(line) = self.prompt(&format!("Enter choice (1-{}): ", options.len()))? else {
                return Ok(None);
            };
            match line.parse::<usize>() {
                Ok(n) if (1..=options.len()).contains(&n) => return Ok(Some(n)),
                _ => self.reject(&line)?,
            }
        }
    }

    fn reject(&mut self, line: &str) -> io::Result<()> {
        warn!(input = line, "invalid menu input");
        writeln!(self.output, "Invalid choice '{}', please try again.", line)
    }

    /// Trimmed next line; `None` at EOF or on `q`.
    fn prompt(&mut self, text: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", text)?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let line = line.trim();
        if line.eq_ignore_ascii_case("q") || line.eq_ignore_ascii_case("quit") {
            return Ok(None);
        }
        Ok(Some(line.to_string()))
    }
}
