//! sketchloop-bench: CLI tool for stitching experiments and diagnostics.
//!
//! Runs the curve stitching pipeline on a fragment CSV file with
//! configurable parameters, printing detailed per-stage diagnostics.
//! Useful for:
//!
//! - Tuning the endpoint tolerance for a vectorizer's output
//! - Comparing the polygon heuristic with a fitted centroid model
//! - Measuring per-stage durations on dense sketches
//! - Seeing which fragments end up in no curve
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin sketchloop-bench -- [OPTIONS] <CSV_PATH>
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod fragments;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;
use sketchloop_pipeline::diagnostics::{Clock, PipelineDiagnostics};
use sketchloop_pipeline::{
    CentroidModel, ClassifierKind, FeatureClassifier, PolygonHeuristic, ShapeFit, StitchConfig,
    StitchResult, StructureTensorCorners,
};

/// Curve stitching experimentation and diagnostics for sketchloop.
///
/// Reads fragment rows `fragment_id,sub_id,x,y`, stitches them into
/// closed and open curves, and prints per-stage timing and counts.
#[derive(Parser)]
#[command(name = "sketchloop-bench", version)]
struct Cli {
    /// Path to the fragment CSV file.
    csv_path: PathBuf,

    /// Endpoint proximity threshold.
    #[arg(long, default_value_t = StitchConfig::DEFAULT_ENDPOINT_TOLERANCE)]
    tolerance: f64,

    /// Maximum DFS depth during enumeration (0 for unbounded).
    #[arg(long, default_value_t = StitchConfig::DEFAULT_MAX_SEARCH_DEPTH.unwrap_or(0))]
    max_search_depth: usize,

    /// Resampled points per feature vector.
    #[arg(long, default_value_t = StitchConfig::DEFAULT_FEATURE_SAMPLES, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(3..))]
    feature_samples: usize,

    /// Nearest-centroid model JSON file. The polygon heuristic is used
    /// when absent.
    #[arg(long)]
    model: Option<PathBuf>,

    /// Number of runs for averaging.
    #[arg(long, default_value_t = 1, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    runs: usize,

    /// Output diagnostics and curves as JSON instead of human-readable
    /// report.
    #[arg(long)]
    json: bool,

    /// Full pipeline config as a JSON string.
    ///
    /// When provided, all other pipeline parameter flags are ignored.
    /// The JSON must be a valid `StitchConfig` serialization.
    #[arg(long)]
    config_json: Option<String>,
}

/// Build a [`StitchConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and all
/// individual parameter flags are ignored. Otherwise, a config is
/// assembled from the individual flags.
fn config_from_cli(cli: &Cli) -> Result<StitchConfig, String> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"));
    }

    Ok(StitchConfig {
        endpoint_tolerance: cli.tolerance,
        max_search_depth: (cli.max_search_depth > 0).then_some(cli.max_search_depth),
        feature_samples: cli.feature_samples,
        ..StitchConfig::default()
    })
}

/// Pick the classifier: a fitted model from `--model`, or the heuristic.
fn classifier_from_cli(cli: &Cli, config: &StitchConfig) -> Result<ClassifierKind, String> {
    let Some(ref path) = cli.model else {
        return Ok(ClassifierKind::Heuristic(PolygonHeuristic::new(
            config.heuristic.clone(),
        )));
    };
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("Error reading model {}: {e}", path.display()))?;
    let model: CentroidModel = serde_json::from_str(&text)
        .map_err(|e| format!("Error parsing model {}: {e}", path.display()))?;
    let classifier = FeatureClassifier::new(model, config.feature_samples)
        .map_err(|e| format!("Error loading model {}: {e}", path.display()))?;
    Ok(ClassifierKind::Centroid(classifier))
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };
    let classifier = match classifier_from_cli(&cli, &config) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };
    let corners = StructureTensorCorners::new(config.corners.clone());

    let fragments = match std::fs::read_to_string(&cli.csv_path)
        .map_err(|e| e.to_string())
        .and_then(|text| fragments::parse_fragments(&text))
    {
        Ok(fragments) => fragments,
        Err(e) => {
            eprintln!("Error reading {}: {e}", cli.csv_path.display());
            return ExitCode::FAILURE;
        }
    };

    eprintln!(
        "Fragments: {} ({} fragments)",
        cli.csv_path.display(),
        fragments.len(),
    );
    eprintln!("Config: {config:#?}");
    eprintln!("Runs: {}", cli.runs);
    eprintln!();

    let mut all_diagnostics = Vec::with_capacity(cli.runs);

    for run in 0..cli.runs {
        if cli.runs > 1 {
            eprintln!("--- Run {}/{} ---", run + 1, cli.runs);
        }

        match sketchloop_pipeline::diagnostics::process_with_diagnostics(
            fragments.clone(),
            config.clone(),
            &classifier,
            &corners,
            &StdClock,
        ) {
            Ok((result, diagnostics)) => {
                if cli.json {
                    let output = serde_json::json!({
                        "diagnostics": diagnostics,
                        "result": result,
                    });
                    match serde_json::to_string_pretty(&output) {
                        Ok(json) => println!("{json}"),
                        Err(e) => {
                            eprintln!("Error serializing diagnostics: {e}");
                            return ExitCode::FAILURE;
                        }
                    }
                } else {
                    println!("{}", diagnostics.report());
                    if run == 0 {
                        print_curves(&result);
                    }
                }

                all_diagnostics.push(diagnostics);
            }
            Err(e) => {
                eprintln!("Pipeline error: {e}");
                return ExitCode::FAILURE;
            }
        }

        if cli.runs > 1 {
            eprintln!();
        }
    }

    // Print summary when multiple runs.
    if cli.runs > 1 {
        print_multi_run_summary(&all_diagnostics);
    }

    ExitCode::SUCCESS
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}

/// List every curve of `result` with its fragments and label.
fn print_curves(result: &StitchResult) {
    println!();
    println!("{:<8} {:<24} {:>8}  {}", "Curve", "Fragments", "Points", "Label");
    println!("{}", "-".repeat(60));

    for (i, outcome) in result.closed.iter().enumerate() {
        let (points, label) = match &outcome.result {
            Ok(closed) => {
                let label = match &closed.label {
                    Ok(label) => match (&closed.regularized, &closed.fit) {
                        (Some(shape), _) if !shape.is_empty() => {
                            format!("{label} (regularized, {} corners)", shape.corner_count())
                        }
                        (_, Some(ShapeFit::Circle { center, radius })) => format!(
                            "{label} (center {:.1},{:.1} radius {radius:.1})",
                            center.x, center.y
                        ),
                        _ => label.to_string(),
                    },
                    Err(e) => format!("unclassified: {e}"),
                };
                (closed.curve.len().to_string(), label)
            }
            Err(e) => ("-".to_string(), format!("failed: {e}")),
        };
        let name = format!("closed {i}");
        println!("{name:<8} {:<24} {points:>8}  {label}", outcome.fragments.to_string());
    }

    for (i, outcome) in result.open.iter().enumerate() {
        let (points, note) = match &outcome.result {
            Ok(curve) => (curve.len().to_string(), String::new()),
            Err(e) => ("-".to_string(), format!("failed: {e}")),
        };
        let name = format!("open {i}");
        println!("{name:<8} {:<24} {points:>8}  {note}", outcome.fragments.to_string());
    }

    for group in &result.unassigned {
        println!("{:<8} {}", "unused", group.fragments);
    }
}

/// Function pointer type for extracting a stage duration from diagnostics.
type StageExtractor = fn(&PipelineDiagnostics) -> Duration;

/// Print aggregated statistics across multiple runs.
#[allow(clippy::cast_precision_loss)]
fn print_multi_run_summary(all_diagnostics: &[PipelineDiagnostics]) {
    debug_assert!(!all_diagnostics.is_empty(), "no diagnostics to summarize");

    println!();
    println!(
        "Summary ({} runs)\n{}",
        all_diagnostics.len(),
        "=".repeat(60),
    );

    if all_diagnostics.is_empty() {
        println!("Warning: no diagnostics to summarize");
        return;
    }

    let durations: Vec<f64> = all_diagnostics
        .iter()
        .map(|d| d.total_duration.as_secs_f64() * 1000.0)
        .collect();

    let min = durations.iter().copied().reduce(f64::min).unwrap_or(0.0);
    let max = durations.iter().copied().reduce(f64::max).unwrap_or(0.0);
    let mean = durations.iter().sum::<f64>() / durations.len() as f64;

    println!("Total duration: min={min:.3}ms  mean={mean:.3}ms  max={max:.3}ms");

    // Per-stage means.
    println!();
    println!("{:<24} {:>12}", "Stage", "Mean (ms)");
    println!("{}", "-".repeat(40));

    let stage_extractors: &[(&str, StageExtractor)] = &[
        ("Load", |d| d.load.duration),
        ("Endpoint Graph", |d| d.graph.duration),
        ("Cycles", |d| d.cycles.duration),
        ("Paths", |d| d.paths.duration),
        ("Reconstruct", |d| d.reconstruct.duration),
        ("Classify", |d| d.classify.duration),
        ("Regularize", |d| d.regularize.duration),
    ];

    for (name, extractor) in stage_extractors {
        let stage_mean = all_diagnostics
            .iter()
            .map(extractor)
            .map(|dur| dur.as_secs_f64() * 1000.0)
            .sum::<f64>()
            / all_diagnostics.len() as f64;
        println!("{name:<24} {stage_mean:>10.3}ms");
    }
}
