//! vigil-sim - anomaly detection over synthetic or file-backed series
//!
//! Usage:
//!   vigil-sim detect --generator seasonal --method shesd --period 100 --inject 10
//!   vigil-sim detect --input series.txt --method ewma --format json
//!   vigil-sim detect --config run.json --seed 7
//!   vigil-sim compare --generator data_stream --seed 1
//!   vigil-sim generate --generator arima --steps 500 > series.txt
//!   vigil-sim interactive
//!   vigil-sim list

use clap::{Args, Parser, Subcommand, ValueEnum};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::error::Error;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing::{Level, info, warn};
use vigil_core::{DetectorConfig, EwmaConfig, ShEsdConfig, ZScoreConfig};
use vigil_sim::render::DEFAULT_FRAME_DELAY;
use vigil_sim::{
    GeneratorConfig, InjectionConfig, Menu, Orchestrator, RunConfig, SeriesSource, compare,
    render_realtime, render_static, seeded_rng,
};

type CliResult = Result<(), Box<dyn Error>>;

#[derive(Parser)]
#[command(name = "vigil-sim")]
#[command(about = "Z-score, EWMA and S-H-ESD anomaly detection over synthetic series")]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one detector over a generated or loaded series
    Detect(DetectArgs),

    /// Run all three detectors over the same series
    Compare {
        #[command(flatten)]
        source: SourceArgs,

        /// S-H-ESD seasonal period
        #[arg(long)]
        period: Option<usize>,

        #[arg(long)]
        seed: Option<u64>,
    },

    /// Print a generated series in the loadable file format
    Generate {
        #[arg(short, long, default_value = "data_stream")]
        generator: String,

        #[arg(short, long, default_value = "1000")]
        steps: usize,

        #[arg(long)]
        seed: Option<u64>,
    },

    /// Numbered menu on stdin/stdout
    Interactive {
        #[arg(long)]
        seed: Option<u64>,

        #[arg(short, long, default_value = "1000")]
        steps: usize,
    },

    /// List generators and detectors
    List,
}

#[derive(Args)]
struct SourceArgs {
    /// Generator kind (see `list`)
    #[arg(short, long, conflicts_with = "input")]
    generator: Option<String>,

    /// Series file: header line, then one value per line
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Length of the generated series
    #[arg(long)]
    steps: Option<usize>,
}

#[derive(Args)]
struct DetectArgs {
    /// JSON run configuration; flags below override its fields
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    source: SourceArgs,

    #[arg(short, long)]
    method: Option<Method>,

    /// S-H-ESD seasonal period
    #[arg(long)]
    period: Option<usize>,

    /// Z-score window size
    #[arg(long)]
    window: Option<usize>,

    /// Z-score / EWMA threshold in std devs
    #[arg(long)]
    threshold: Option<f64>,

    /// EWMA smoothing factor
    #[arg(long)]
    alpha: Option<f64>,

    /// S-H-ESD upper bound on the flagged fraction
    #[arg(long)]
    max_anomalies: Option<f64>,

    /// Number of anomalies to inject (0 disables)
    #[arg(long)]
    inject: Option<usize>,

    /// Injected anomaly size in std devs
    #[arg(long)]
    factor: Option<f64>,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(short, long, default_value = "pretty")]
    format: OutputFormat,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Method {
    Zscore,
    ZscoreIncremental,
    Ewma,
    Shesd,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum OutputFormat {
    Pretty,
    Json,
    Realtime,
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    let result = match cli.command {
        Commands::Detect(args) => run_detect(args),
        Commands::Compare {
            source,
            period,
            seed,
        } => run_compare(source, period, seed),
        Commands::Generate {
            generator,
            steps,
            seed,
        } => run_generate(&generator, steps, seed),
        Commands::Interactive { seed, steps } => run_interactive(seed, steps),
        Commands::List => run_list(),
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn parse_generator(kind: &str) -> Result<GeneratorConfig, Box<dyn Error>> {
    GeneratorConfig::from_kind(kind).ok_or_else(|| {
        format!(
            "unknown generator '{}', expected one of: {}",
            kind,
            GeneratorConfig::KINDS.join(", ")
        )
        .into()
    })
}

/// Apply `--generator/--input/--steps` on top of `current`.
fn resolve_source(
    args: &SourceArgs,
    current: SeriesSource,
) -> Result<SeriesSource, Box<dyn Error>> {
    let source = match (&args.input, &args.generator) {
        (Some(path), _) => SeriesSource::File(path.clone()),
        (None, Some(kind)) => SeriesSource::Generator(parse_generator(kind)?),
        (None, None) => current,
    };
    Ok(match (source, args.steps) {
        (SeriesSource::Generator(g), Some(steps)) => SeriesSource::Generator(g.with_steps(steps)),
        (source, _) => source,
    })
}

fn source_period(source: &SeriesSource) -> Option<usize> {
    match source {
        SeriesSource::Generator(g) => g.period(),
        SeriesSource::File(_) => None,
    }
}

/// Detector flags that were given but have no meaning for `detector`.
fn ignored_flags(args: &DetectArgs, detector: &DetectorConfig) -> Vec<&'static str> {
    let given = [
        ("--window", args.window.is_some()),
        ("--threshold", args.threshold.is_some()),
        ("--alpha", args.alpha.is_some()),
        ("--period", args.period.is_some()),
        ("--max-anomalies", args.max_anomalies.is_some()),
    ];
    let applies: &[&str] = match detector {
        DetectorConfig::ZScore(_) => &["--window", "--threshold"],
        DetectorConfig::Ewma(_) => &["--alpha", "--threshold"],
        DetectorConfig::ShEsd(_) => &["--period", "--max-anomalies"],
    };
    given
        .into_iter()
        .filter(|&(flag, set)| set && !applies.contains(&flag))
        .map(|(flag, _)| flag)
        .collect()
}

fn resolve_detector(
    args: &DetectArgs,
    current: DetectorConfig,
    source: &SeriesSource,
) -> DetectorConfig {
    let mut detector = match args.method {
        Some(Method::Zscore) => DetectorConfig::ZScore(ZScoreConfig::default()),
        Some(Method::ZscoreIncremental) => DetectorConfig::ZScore(ZScoreConfig {
            incremental: true,
            ..Default::default()
        }),
        Some(Method::Ewma) => DetectorConfig::Ewma(EwmaConfig::default()),
        Some(Method::Shesd) => DetectorConfig::ShEsd(ShEsdConfig {
            period: source_period(source).unwrap_or(ShEsdConfig::default().period),
            ..Default::default()
        }),
        None => current,
    };

    for flag in ignored_flags(args, &detector) {
        warn!(
            flag,
            method = detector.method_name(),
            "flag does not apply to this method, ignored"
        );
    }

    match &mut detector {
        DetectorConfig::ZScore(c) => {
            if let Some(window) = args.window {
                c.window_size = window;
            }
            if let Some(threshold) = args.threshold {
                c.threshold = threshold;
            }
        }
        DetectorConfig::Ewma(c) => {
            if let Some(alpha) = args.alpha {
                c.alpha = alpha;
            }
            if let Some(threshold) = args.threshold {
                c.threshold = threshold;
            }
        }
        DetectorConfig::ShEsd(c) => {
            if let Some(period) = args.period {
                c.period = period;
            }
            if let Some(max_anomalies) = args.max_anomalies {
                c.max_anomalies = max_anomalies;
            }
        }
    }
    detector
}

fn resolve_injection(
    args: &DetectArgs,
    current: Option<InjectionConfig>,
) -> Option<InjectionConfig> {
    let injection = match args.inject {
        Some(0) => None,
        Some(count) => Some(InjectionConfig {
            count,
            ..current.unwrap_or_default()
        }),
        None => current,
    };
    injection.map(|mut i| {
        if let Some(factor) = args.factor {
            i.factor = factor;
        }
        i
    })
}

fn run_detect(args: DetectArgs) -> CliResult {
    let base = match &args.config {
        Some(path) => RunConfig::from_json_file(path)?,
        None => RunConfig::default(),
    };

    let source = resolve_source(&args.source, base.source)?;
    let detector = resolve_detector(&args, base.detector, &source);
    let injection = resolve_injection(&args, base.injection);
    let config = RunConfig {
        source,
        detector,
        injection,
        seed: args.seed.or(base.seed),
    };
    info!(method = config.detector.method_name(), seed = ?config.seed, "starting detection run");

    let outcome = Orchestrator::new(config)?.run()?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    match args.format {
        OutputFormat::Pretty => {
            render_static(&mut out, &outcome.series, &outcome.report)?;
            if !outcome.injected.is_empty() {
                writeln!(
                    out,
                    "injected: {}  recovered: {}",
                    outcome.injected.len(),
                    outcome.recovered().len()
                )?;
            }
        }
        OutputFormat::Json => writeln!(out, "{}", outcome.report.to_json()?)?,
        OutputFormat::Realtime => {
            render_realtime(&mut out, &outcome.series, &outcome.report, DEFAULT_FRAME_DELAY)?
        }
    }
    out.flush()?;
    Ok(())
}

fn run_compare(source: SourceArgs, period: Option<usize>, seed: Option<u64>) -> CliResult {
    let source = resolve_source(&source, SeriesSource::default())?;
    let period = period
        .or_else(|| source_period(&source))
        .unwrap_or(ShEsdConfig::default().period);

    let mut orchestrator = Orchestrator::new(RunConfig {
        source,
        seed,
        ..Default::default()
    })?;
    let series = orchestrator.load_series()?;

    let reports = compare(
        &series,
        &[
            DetectorConfig::ZScore(ZScoreConfig::default()),
            DetectorConfig::Ewma(EwmaConfig::default()),
            DetectorConfig::ShEsd(ShEsdConfig {
                period,
                ..Default::default()
            }),
        ],
    )?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for report in &reports {
        render_static(&mut out, &series, report)?;
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}

fn run_generate(kind: &str, steps: usize, seed: Option<u64>) -> CliResult {
    let generator = parse_generator(kind)?.with_steps(steps);
    let mut rng = match seed {
        Some(seed) => seeded_rng(seed),
        None => StdRng::from_os_rng(),
    };
    let series = generator.generate(&mut rng)?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    writeln!(out, "{}", generator.kind())?;
    for value in &series {
        writeln!(out, "{}", value)?;
    }
    out.flush()?;
    Ok(())
}

fn run_interactive(seed: Option<u64>, steps: usize) -> CliResult {
    let rng = match seed {
        Some(seed) => seeded_rng(seed),
        None => StdRng::from_os_rng(),
    };
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut menu = Menu::new(stdin.lock(), stdout.lock(), rng).with_steps(steps);
    menu.run()?;
    Ok(())
}

fn run_list() -> CliResult {
    println!("Generators:");
    for kind in GeneratorConfig::KINDS {
        println!("  {}", kind);
    }
    println!();
    println!("Detectors:");
    println!("  zscore              rolling-window Z-score (window 50, threshold 3.0)");
    println!("  zscore-incremental  running-sum variant of zscore");
    println!("  ewma                EWMA residuals (alpha 0.3, threshold 3.0)");
    println!("  shesd               seasonal hybrid ESD (period 100, max_anomalies 0.05)");
    println!();
    println!("Usage: vigil-sim detect --generator <KIND> --method <METHOD>");
    Ok(())
}
