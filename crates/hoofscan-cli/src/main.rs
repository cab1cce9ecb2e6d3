//! hoofscan CLI: command-line interface for hoof–pastern alignment scans.

use clap::{Args, Parser, Subcommand};
use hoofscan::{
    evaluate, leg_score, measure_keypoints, render_overlay, AnalyzeConfig, AnalyzeError,
    AnnotationOracle, AnnotationSet, Leg, LegAssessment, LegImage, LegInput, ScanRequest, Scanner,
    DEFAULT_TOLERANCE_DEG,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "hoofscan")]
#[command(about = "Score hoof-pastern alignment from leg photographs")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze up to four leg photographs and write the scan report.
    Scan(CliScanArgs),

    /// Measure and score every image of a keypoint annotation file.
    Measure(CliMeasureArgs),

    /// Score a single pair of clinical angles.
    Score {
        /// Pastern angle from ground, in degrees.
        #[arg(long, allow_hyphen_values = true)]
        pastern: f64,

        /// Hoof-wall angle from ground, in degrees.
        #[arg(long, allow_hyphen_values = true)]
        hoof: f64,

        /// Mean keypoint confidence in [0, 1] used for the quality grade.
        #[arg(long, default_value = "1.0")]
        confidence: f64,
    },

    /// Compare predicted keypoints against ground truth.
    Evaluate(CliEvaluateArgs),
}

#[derive(Debug, Clone, Args)]
struct CliScanArgs {
    /// Front-left leg photograph.
    #[arg(long)]
    front_left: Option<PathBuf>,

    /// Front-right leg photograph.
    #[arg(long)]
    front_right: Option<PathBuf>,

    /// Back-left leg photograph.
    #[arg(long)]
    back_left: Option<PathBuf>,

    /// Back-right leg photograph.
    #[arg(long)]
    back_right: Option<PathBuf>,

    /// COCO keypoint annotations replayed as detections (matched by file name).
    #[arg(long)]
    keypoints: PathBuf,

    /// Path to write the scan report (JSON).
    #[arg(long)]
    out: PathBuf,

    /// Path to write per-leg analysis details (JSON).
    #[arg(long)]
    details: Option<PathBuf>,

    /// Directory for per-leg overlay PNGs.
    #[arg(long)]
    overlay_dir: Option<PathBuf>,

    /// Analysis configuration (JSON). Missing fields take defaults.
    #[arg(long)]
    config: Option<PathBuf>,
}

impl CliScanArgs {
    fn leg_paths(&self) -> Vec<(Leg, &Path)> {
        [
            (Leg::FrontLeft, &self.front_left),
            (Leg::FrontRight, &self.front_right),
            (Leg::BackLeft, &self.back_left),
            (Leg::BackRight, &self.back_right),
        ]
        .into_iter()
        .filter_map(|(leg, p)| p.as_deref().map(|p| (leg, p)))
        .collect()
    }
}

#[derive(Debug, Clone, Args)]
struct CliMeasureArgs {
    /// COCO keypoint annotations.
    #[arg(long)]
    keypoints: PathBuf,

    /// Path to write measurements (JSON).
    #[arg(long)]
    out: PathBuf,

    /// Analysis configuration (JSON). Missing fields take defaults.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct CliEvaluateArgs {
    /// Ground-truth COCO keypoint annotations.
    #[arg(long)]
    ground_truth: PathBuf,

    /// Predicted COCO keypoint annotations.
    #[arg(long)]
    predictions: PathBuf,

    /// Path to write the accuracy report (JSON).
    #[arg(long)]
    out: PathBuf,

    /// Deviation error (degrees) counted as a success.
    #[arg(long, default_value_t = DEFAULT_TOLERANCE_DEG)]
    tolerance: f64,
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scan(args) => run_scan(&args),
        Commands::Measure(args) => run_measure(&args),
        Commands::Score {
            pastern,
            hoof,
            confidence,
        } => run_score(pastern, hoof, confidence),
        Commands::Evaluate(args) => run_evaluate(&args),
    }
}

fn load_config(path: Option<&Path>) -> CliResult<AnalyzeConfig> {
    match path {
        Some(p) => {
            tracing::info!("Loading config: {}", p.display());
            Ok(AnalyzeConfig::from_json_file(p)?)
        }
        None => Ok(AnalyzeConfig::default()),
    }
}

fn load_annotations(path: &Path) -> CliResult<AnnotationSet> {
    let set = AnnotationSet::from_json_file(path)?;
    tracing::info!("Loaded {} annotated image(s) from {}", set.len(), path.display());
    Ok(set)
}

fn write_json<T: serde::Serialize + ?Sized>(path: &Path, value: &T) -> CliResult<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, &json)?;
    tracing::info!("Results written to {}", path.display());
    Ok(())
}

// ── scan ───────────────────────────────────────────────────────────────

fn run_scan(args: &CliScanArgs) -> CliResult<()> {
    let config = load_config(args.config.as_deref())?;
    let scanner = Scanner::with_config(
        AnnotationOracle::new(load_annotations(&args.keypoints)?),
        config,
    );

    let mut request = ScanRequest::new();
    let mut images: BTreeMap<Leg, LegImage> = BTreeMap::new();
    for (leg, path) in args.leg_paths() {
        tracing::info!("Loading {leg} image: {}", path.display());
        match image::open(path) {
            Ok(img) => {
                let leg_image = LegImage::new(path.display().to_string(), img.to_rgb8());
                if args.overlay_dir.is_some() {
                    images.insert(leg, leg_image.clone());
                }
                request.insert(leg, LegInput::Decoded(leg_image));
            }
            Err(e) => {
                tracing::warn!("Failed to open image {}: {}", path.display(), e);
                request.insert(leg, LegInput::Unavailable(AnalyzeError::Decode(e)));
            }
        }
    }

    let result = scanner.scan(request);
    match result.summary.scan_score {
        Some(score) => tracing::info!("Scan score {:.1}: {}", score, result.summary.notes),
        None => tracing::info!("{}", result.summary.notes),
    }

    write_json(&args.out, &result.report())?;

    if let Some(details) = &args.details {
        write_json(details, &result)?;
    }

    if let Some(dir) = &args.overlay_dir {
        std::fs::create_dir_all(dir)?;
        for (leg, img) in &images {
            let Some(analysis) = result.outcome(*leg).analysis() else {
                continue;
            };
            let path = dir.join(format!("{leg}_overlay.png"));
            render_overlay(img, analysis).save(&path)?;
            tracing::info!("Overlay written to {}", path.display());
        }
    }

    Ok(())
}

// ── measure ────────────────────────────────────────────────────────────

fn run_measure(args: &CliMeasureArgs) -> CliResult<()> {
    let config = load_config(args.config.as_deref())?;
    let annotations = load_annotations(&args.keypoints)?;

    let mut records = Vec::with_capacity(annotations.len());
    for ann in annotations.iter() {
        if !config.gate.passes(&ann.confidence) {
            tracing::warn!("{}: unlabelled keypoints, skipped", ann.file_name);
            records.push(serde_json::json!({
                "image": ann.file_name,
                "success": false,
            }));
            continue;
        }
        let width = ann.width.unwrap_or_else(|| {
            tracing::warn!(
                "{}: image width unknown, facing offset disabled",
                ann.file_name
            );
            0
        });
        let m = measure_keypoints(
            &ann.keypoints,
            width,
            &config.normalize,
            hoofscan::mean_confidence(&ann.confidence),
        );
        let assessment = LegAssessment::from_measurement(&m);
        records.push(serde_json::json!({
            "image": ann.file_name,
            "success": true,
            "measurement": m,
            "assessment": assessment,
        }));
    }

    tracing::info!("Measured {} image(s)", records.len());
    write_json(&args.out, &records)
}

// ── score ──────────────────────────────────────────────────────────────

fn run_score(pastern: f64, hoof: f64, confidence: f64) -> CliResult<()> {
    if !pastern.is_finite() || !hoof.is_finite() {
        return Err("angles must be finite".into());
    }
    if !(0.0..=1.0).contains(&confidence) {
        return Err(format!("confidence must be in [0, 1], got {confidence}").into());
    }
    let assessment = LegAssessment::from_score(leg_score(pastern, hoof), confidence);
    println!("{}", serde_json::to_string_pretty(&assessment)?);
    Ok(())
}

// ── evaluate ───────────────────────────────────────────────────────────

fn run_evaluate(args: &CliEvaluateArgs) -> CliResult<()> {
    if !args.tolerance.is_finite() || args.tolerance < 0.0 {
        return Err(format!("tolerance must be finite and >= 0, got {}", args.tolerance).into());
    }
    let gt = load_annotations(&args.ground_truth)?;
    let pred = load_annotations(&args.predictions)?;
    let report = evaluate(&gt, &pred, args.tolerance);

    if let (Some(p), Some(h), Some(rate)) = (
        report.mean_pastern_error,
        report.mean_hoof_error,
        report.success_rate,
    ) {
        tracing::info!(
            "Mean pastern error {:.2} deg, mean hoof error {:.2} deg, {:.1}% within {:.1} deg",
            p,
            h,
            rate,
            args.tolerance
        );
    }

    write_json(&args.out, &report)
}
