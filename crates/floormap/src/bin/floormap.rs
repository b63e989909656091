//! floormap CLI: calibrate floor classifiers and try them on image patches.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use floormap::classify::{ClassifierKind, ClassifierSpec, CompositeDecision, PatchClassifier};
use floormap::imageio::{collect_patch_paths, load_patch, load_patch_stack};
use floormap::MapperConfig;
use log::{info, warn};
use serde::Serialize;

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "floormap")]
#[command(about = "Calibrate floor/obstacle patch classifiers and label image patches")]
#[command(version)]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log as JSON lines (with the `tracing` feature).
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit a classifier on floor patches and report its thresholds.
    Calibrate(CalibrateArgs),

    /// Fit a classifier, then label query patches as floor or obstacle.
    Classify(ClassifyArgs),
}

#[derive(Debug, Clone, Args)]
struct ClassifierArgs {
    /// Calibration floor patches: PNG files and/or directories of PNGs.
    #[arg(long, required = true, num_args = 1..)]
    patches: Vec<PathBuf>,

    /// Session config (JSON); its `classifier` section is the starting point.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Classifier variant. Replaces the config's classifier when it differs.
    #[arg(long, value_enum)]
    kind: Option<KindArg>,

    /// Threshold percentile for the hue and LBP classifiers.
    #[arg(long)]
    percentile: Option<f64>,

    /// Fixed decision threshold instead of a fitted one.
    #[arg(long)]
    threshold: Option<f64>,
}

#[derive(Debug, Clone, Args)]
struct CalibrateArgs {
    #[command(flatten)]
    classifier: ClassifierArgs,

    /// Path to write the calibration report (JSON). Printed to stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct ClassifyArgs {
    #[command(flatten)]
    classifier: ClassifierArgs,

    /// Query patches (PNG files or directories), sized like the calibration patches.
    #[arg(long, required = true, num_args = 1..)]
    query: Vec<PathBuf>,

    /// Path to write the classification report (JSON). Printed to stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum KindArg {
    Pixel,
    Hue,
    Lbp,
    Composite,
}

impl From<KindArg> for ClassifierKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Pixel => ClassifierKind::Pixel,
            KindArg::Hue => ClassifierKind::Hue,
            KindArg::Lbp => ClassifierKind::Lbp,
            KindArg::Composite => ClassifierKind::Composite,
        }
    }
}

impl ClassifierArgs {
    fn spec(&self) -> CliResult<ClassifierSpec> {
        let mut spec = match &self.config {
            Some(path) => MapperConfig::load_json(path)?.classifier,
            None => ClassifierSpec::default(),
        };
        if let Some(kind) = self.kind.map(ClassifierKind::from) {
            if spec.kind() != kind {
                spec = ClassifierSpec::for_kind(kind);
            }
        }

        if let Some(q) = self.percentile {
            match &mut spec {
                ClassifierSpec::Pixel(_) => {
                    warn!("--percentile has no effect on the pixel classifier")
                }
                ClassifierSpec::Hue(p) => p.percentile = q,
                ClassifierSpec::Lbp(p) => p.percentile = q,
                ClassifierSpec::Composite { hue, lbp } => {
                    hue.percentile = q;
                    lbp.percentile = q;
                }
            }
        }
        if let Some(t) = self.threshold {
            match &mut spec {
                ClassifierSpec::Pixel(p) => p.threshold = Some(t),
                ClassifierSpec::Hue(p) => p.threshold = Some(t),
                ClassifierSpec::Lbp(p) => p.threshold = Some(t),
                ClassifierSpec::Composite { .. } => {
                    return Err("--threshold is ambiguous for the composite classifier; \
                                set per-part thresholds in --config"
                        .into());
                }
            }
        }
        Ok(spec)
    }

    fn fit(&self) -> CliResult<(PatchClassifier, usize)> {
        let spec = self.spec()?;
        let stack = load_patch_stack(&self.patches)?;
        info!(
            "calibrating {} classifier on {} patches of {}",
            spec.kind(),
            stack.len(),
            stack.patch_shape()
        );
        let classifier = spec.fit(&stack)?;
        Ok((classifier, stack.len()))
    }
}

#[derive(Debug, Serialize)]
struct CalibrationReport {
    kind: ClassifierKind,
    patches: usize,
    /// `[height, width, channels]`
    patch_shape: [usize; 3],
    threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hue_threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    lbp_threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    lbp_bins: Option<usize>,
}

impl CalibrationReport {
    fn new(classifier: &PatchClassifier, patches: usize) -> Self {
        let shape = classifier.patch_shape();
        let (hue_threshold, lbp_threshold, lbp_bins) = match classifier {
            PatchClassifier::Composite(c) => (
                Some(c.hue().threshold()),
                Some(c.lbp().threshold()),
                Some(c.lbp().bins()),
            ),
            PatchClassifier::Lbp(c) => (None, None, Some(c.bins())),
            _ => (None, None, None),
        };
        Self {
            kind: classifier.kind(),
            patches,
            patch_shape: [shape.height, shape.width, shape.channels],
            threshold: classifier.threshold(),
            hue_threshold,
            lbp_threshold,
            lbp_bins,
        }
    }
}

#[derive(Debug, Serialize)]
struct QueryResult {
    path: PathBuf,
    floor: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    decision: Option<CompositeDecision>,
}

#[derive(Debug, Serialize)]
struct ClassifyReport {
    calibration: CalibrationReport,
    floor: usize,
    obstacle: usize,
    results: Vec<QueryResult>,
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.json_logs);

    match cli.command {
        Commands::Calibrate(args) => run_calibrate(&args),
        Commands::Classify(args) => run_classify(&args),
    }
}

#[cfg(feature = "tracing")]
fn init_logging(_verbose: u8, json: bool) {
    let _ = tracing_log::LogTracer::init();
    floormap::core::init_tracing(json);
}

#[cfg(not(feature = "tracing"))]
fn init_logging(verbose: u8, json: bool) {
    let _ = floormap::core::init_with_level(floormap::core::verbosity_level(verbose));
    if json {
        warn!("--json-logs needs the `tracing` feature; logging as text");
    }
}

fn run_calibrate(args: &CalibrateArgs) -> CliResult<()> {
    let (classifier, patches) = args.classifier.fit()?;
    let report = CalibrationReport::new(&classifier, patches);
    write_report(&report, args.out.as_deref())
}

fn run_classify(args: &ClassifyArgs) -> CliResult<()> {
    let (classifier, patches) = args.classifier.fit()?;

    let mut results = Vec::new();
    for path in collect_patch_paths(&args.query)? {
        let patch = load_patch(&path)?;
        let view = patch.view();
        let (floor, decision) = match &classifier {
            PatchClassifier::Composite(c) => {
                let d = c.classify_detailed(&view)?;
                (d.is_floor(), Some(d))
            }
            other => (other.classify(&view)?, None),
        };
        info!(
            "{}: {}",
            path.display(),
            if floor { "floor" } else { "obstacle" }
        );
        results.push(QueryResult {
            path,
            floor,
            decision,
        });
    }

    let floor = results.iter().filter(|r| r.floor).count();
    let report = ClassifyReport {
        calibration: CalibrationReport::new(&classifier, patches),
        floor,
        obstacle: results.len() - floor,
        results,
    };
    write_report(&report, args.out.as_deref())
}

fn write_report<T: Serialize>(report: &T, out: Option<&Path>) -> CliResult<()> {
    let json = serde_json::to_string_pretty(report)?;
    match out {
        Some(path) => {
            fs::write(path, json)?;
            info!("report written to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
