//! Pipeline diagnostics: timing, counts, and other metrics for each stage.
//!
//! These diagnostics are permanent instrumentation intended for
//! parameter experimentation on real sketches. Every call to
//! [`process_with_diagnostics`] collects them alongside the pipeline
//! result.
//!
//! Time is read through the [`Clock`] trait so the library never touches
//! a platform timer itself; the caller supplies one.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::classify::ShapeClassifier;
use crate::corners::CornerDetector;
use crate::outcome::StitchResult;
use crate::pipeline::{Pipeline, PipelineStage};
use crate::types::{PipelineError, Polyline, StitchConfig};

/// Source of timestamps for stage timing.
pub trait Clock {
    /// Opaque timestamp type.
    type Instant;

    /// Capture the current time.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Diagnostics collected from a single pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineDiagnostics {
    /// Stage 1: input validation.
    pub load: StageDiagnostics,
    /// Stage 2: endpoint graph construction.
    pub graph: StageDiagnostics,
    /// Stage 3: cycle enumeration.
    pub cycles: StageDiagnostics,
    /// Stage 4: open path enumeration.
    pub paths: StageDiagnostics,
    /// Stage 5: curve reconstruction.
    pub reconstruct: StageDiagnostics,
    /// Stage 6: classification.
    pub classify: StageDiagnostics,
    /// Stage 7: regularization.
    pub regularize: StageDiagnostics,
    /// Total wall-clock duration of the entire pipeline (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Summary counts across all stages.
    pub summary: PipelineSummary,
}

/// Diagnostics for a single pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics.
    pub metrics: StageMetrics,
}

/// Stage-specific metrics that vary by pipeline stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StageMetrics {
    Load {
        fragment_count: usize,
        /// Total points across all fragments.
        point_count: usize,
    },
    Graph {
        /// Endpoint proximity threshold ε.
        tolerance: f64,
        /// Two per fragment.
        node_count: usize,
        /// Undirected proximity edges.
        proximity_edge_count: usize,
        /// Endpoints touching no other fragment.
        dead_end_count: usize,
    },
    Cycles {
        cycle_count: usize,
        /// Whether the depth bound cut the search short.
        truncated: bool,
    },
    Paths {
        path_count: usize,
        /// Whether the depth bound cut the search short.
        truncated: bool,
    },
    Reconstruct {
        /// Closed and open curves attempted.
        curve_count: usize,
        failed_count: usize,
        /// Points across all reconstructed curves.
        point_count: usize,
    },
    Classify {
        classified_count: usize,
        failed_count: usize,
        /// Curves per label name.
        label_counts: BTreeMap<String, usize>,
    },
    Regularize {
        /// Curves whose label selected them for regularization.
        attempted_count: usize,
        /// Attempts that produced no polygon.
        empty_count: usize,
        /// Polygon vertices across all regularized shapes.
        corner_count: usize,
    },
}

/// High-level summary counts for the entire pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    pub fragment_count: usize,
    pub closed_count: usize,
    pub open_count: usize,
    /// Unassigned fragment groups.
    pub unassigned_count: usize,
    /// Curves whose reconstruction failed.
    pub failed_count: usize,
    pub truncated: bool,
}

impl PipelineDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Pipeline Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!("Fragments: {}", self.summary.fragment_count));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<24} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(80));

        let total_ms = duration_ms(self.total_duration);

        let stages: [(&str, &StageDiagnostics); 7] = [
            ("Load", &self.load),
            ("Endpoint Graph", &self.graph),
            ("Cycles", &self.cycles),
            ("Paths", &self.paths),
            ("Reconstruct", &self.reconstruct),
            ("Classify", &self.classify),
            ("Regularize", &self.regularize),
        ];

        for (name, diag) in &stages {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<24} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.push(String::new());
        lines.push(format!(
            "Closed: {}  |  Open: {}  |  Unassigned groups: {}  |  Failed: {}",
            self.summary.closed_count,
            self.summary.open_count,
            self.summary.unassigned_count,
            self.summary.failed_count,
        ));
        if self.summary.truncated {
            lines.push("Search truncated by max_search_depth".to_string());
        }

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    let truncated = |t: bool| if t { " (truncated)" } else { "" };
    match metrics {
        StageMetrics::Load {
            fragment_count,
            point_count,
        } => format!("{fragment_count} fragments, {point_count} pts"),
        StageMetrics::Graph {
            tolerance,
            node_count,
            proximity_edge_count,
            dead_end_count,
        } => format!(
            "eps={tolerance:.2} {node_count} nodes, {proximity_edge_count} gaps, {dead_end_count} dead ends",
        ),
        StageMetrics::Cycles {
            cycle_count,
            truncated: t,
        } => format!("{cycle_count} cycles{}", truncated(*t)),
        StageMetrics::Paths {
            path_count,
            truncated: t,
        } => format!("{path_count} paths{}", truncated(*t)),
        StageMetrics::Reconstruct {
            curve_count,
            failed_count,
            point_count,
        } => format!("{curve_count} curves ({failed_count} failed), {point_count} pts"),
        StageMetrics::Classify {
            classified_count,
            failed_count,
            label_counts,
        } => {
            let labels: Vec<String> = label_counts
                .iter()
                .map(|(label, n)| format!("{label}={n}"))
                .collect();
            format!(
                "{classified_count} labelled ({failed_count} failed) {}",
                labels.join(" ")
            )
        }
        StageMetrics::Regularize {
            attempted_count,
            empty_count,
            corner_count,
        } => format!("{attempted_count} shapes ({empty_count} empty), {corner_count} corners"),
    }
}

/// Time one stage transition and capture the resulting stage's metrics.
fn timed<C, S, F>(clock: &C, advance: F) -> (S, StageDiagnostics)
where
    C: Clock,
    S: PipelineStage,
    F: FnOnce() -> S,
{
    let start = clock.now();
    let stage = advance();
    let duration = clock.elapsed(&start);
    tracing::trace!(stage = S::NAME, ?duration, "stage complete");
    let diag = StageDiagnostics {
        duration,
        metrics: stage.metrics(),
    };
    (stage, diag)
}

/// Run the full pipeline, timing every stage with `clock`.
///
/// # Errors
///
/// Returns the same errors as [`crate::process`].
pub fn process_with_diagnostics<C: Clock>(
    fragments: Vec<Polyline>,
    config: StitchConfig,
    classifier: &dyn ShapeClassifier,
    detector: &dyn CornerDetector,
    clock: &C,
) -> Result<(StitchResult, PipelineDiagnostics), PipelineError> {
    let total_start = clock.now();

    let load_start = clock.now();
    let loaded = Pipeline::new(fragments, config).load()?;
    let load = StageDiagnostics {
        duration: clock.elapsed(&load_start),
        metrics: loaded.metrics(),
    };
    let fragment_count = loaded.store().len();

    let (built, graph) = timed(clock, || loaded.build_graph());
    let (found, cycles) = timed(clock, || built.find_cycles());
    let (enumerated, paths) = timed(clock, || found.find_paths());
    let (reconstructed, reconstruct) = timed(clock, || enumerated.reconstruct());
    let (classified, classify) = timed(clock, || reconstructed.classify(classifier));
    let (regularized, regularize) = timed(clock, || classified.regularize(detector));
    let result = regularized.into_result();

    let total_duration = clock.elapsed(&total_start);
    let summary = PipelineSummary {
        fragment_count,
        closed_count: result.closed.len(),
        open_count: result.open.len(),
        unassigned_count: result.unassigned.len(),
        failed_count: result.failed_count(),
        truncated: result.truncated,
    };
    tracing::debug!(
        ?total_duration,
        closed = summary.closed_count,
        open = summary.open_count,
        "pipeline complete"
    );

    Ok((
        result,
        PipelineDiagnostics {
            load,
            graph,
            cycles,
            paths,
            reconstruct,
            classify,
            regularize,
            total_duration,
            summary,
        },
    ))
}
