//! Incremental pipeline: advance stage-by-stage, inspecting each
//! intermediate result before continuing.
//!
//! Unlike [`crate::process`] which runs the entire pipeline in one call,
//! [`Pipeline`] lets the caller drive execution one step at a time:
//!
//! ```rust
//! # use sketchloop_pipeline::{Pipeline, PipelineError, Point, Polyline, StitchConfig};
//! # use sketchloop_pipeline::{PolygonHeuristic, StructureTensorCorners};
//! # fn run(fragments: Vec<Polyline>) -> Result<(), PipelineError> {
//! let config = StitchConfig::default();
//! let classifier = PolygonHeuristic::new(config.heuristic.clone());
//! let corners = StructureTensorCorners::new(config.corners.clone());
//! let pipeline = Pipeline::new(fragments, config)
//!     .load()?
//!     .build_graph()
//!     .enumerate()
//!     .reconstruct()
//!     .classify(&classifier)
//!     .regularize(&corners);
//!
//! let result = pipeline.into_result();
//! # Ok(())
//! # }
//! ```
//!
//! Each stage method consumes `self` and returns the next pipeline state
//! (or `Result` for the fallible load stage), carrying all previously
//! computed intermediates. The caller can inspect the current stage's
//! output via accessor methods at any point.

use crate::catalog::{CurveCatalog, DiscoveredCurve};
use crate::classify::{Classification, ShapeClassifier};
use crate::corners::CornerDetector;
use crate::diagnostics::StageMetrics;
use crate::graph::EndpointGraph;
use crate::outcome::{
    ClosedCurve, ClosedCurveOutcome, OpenCurveOutcome, StitchResult, group_unassigned,
};
use crate::reconstruct::reconstruct_curve;
use crate::regularize::{RegularizedShape, regularize_curve};
use crate::types::{CurveError, FragmentStore, PipelineError, Polyline, StitchConfig};

/// Entry point of the staged API.
pub struct Pipeline;

impl Pipeline {
    /// Start a pipeline over `fragments` with `config`.
    ///
    /// Nothing is validated until [`Pending::load`].
    #[allow(clippy::new_ret_no_self)]
    pub const fn new(fragments: Vec<Polyline>, config: StitchConfig) -> Pending {
        Pending { config, fragments }
    }
}

// ───────────────────────── Stage 0: Pending ──────────────────────────

/// Pipeline state before any processing has occurred.
#[must_use = "pipeline stages are consumed by advancing — call .load() to continue"]
pub struct Pending {
    config: StitchConfig,
    fragments: Vec<Polyline>,
}

impl Pending {
    /// The raw input fragments.
    #[must_use]
    pub fn fragments(&self) -> &[Polyline] {
        &self.fragments
    }

    /// Validate the config and fragments and advance to [`Loaded`].
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] for an unusable config,
    /// and [`PipelineError::MalformedFragment`] or
    /// [`PipelineError::NonFiniteCoordinate`] for bad input. No later
    /// stage runs in that case.
    pub fn load(self) -> Result<Loaded, PipelineError> {
        self.config.validate()?;
        let store = FragmentStore::new(self.fragments)?;
        tracing::debug!(
            fragments = store.len(),
            points = store.total_points(),
            "loaded fragments"
        );
        Ok(Loaded {
            config: self.config,
            store,
        })
    }
}

// ───────────────────────── Stage 1: Loaded ───────────────────────────

/// Pipeline state after validating the input.
#[must_use = "pipeline stages are consumed by advancing — call .build_graph() to continue"]
pub struct Loaded {
    config: StitchConfig,
    store: FragmentStore,
}

impl Loaded {
    /// The validated fragments.
    #[must_use]
    pub const fn store(&self) -> &FragmentStore {
        &self.store
    }

    /// Build the endpoint graph and advance to [`GraphBuilt`].
    pub fn build_graph(self) -> GraphBuilt {
        let graph = EndpointGraph::build(&self.store, self.config.endpoint_tolerance);
        GraphBuilt {
            config: self.config,
            store: self.store,
            graph,
        }
    }
}

// ───────────────────────── Stage 2: GraphBuilt ───────────────────────

/// Pipeline state after building the endpoint graph.
#[must_use = "pipeline stages are consumed by advancing — call .find_cycles() to continue"]
pub struct GraphBuilt {
    config: StitchConfig,
    store: FragmentStore,
    graph: EndpointGraph,
}

impl GraphBuilt {
    /// The endpoint graph.
    #[must_use]
    pub const fn graph(&self) -> &EndpointGraph {
        &self.graph
    }

    /// Enumerate closed curves and advance to [`CyclesFound`].
    pub fn find_cycles(self) -> CyclesFound {
        let cycles = crate::cycles::find_cycles(&self.graph, self.config.max_search_depth);
        CyclesFound {
            config: self.config,
            store: self.store,
            graph: self.graph,
            cycles,
        }
    }

    /// Enumerate closed and open curves in one step.
    pub fn enumerate(self) -> Enumerated {
        self.find_cycles().find_paths()
    }
}

// ───────────────────────── Stage 3: CyclesFound ──────────────────────

/// Pipeline state after cycle enumeration.
#[must_use = "pipeline stages are consumed by advancing — call .find_paths() to continue"]
pub struct CyclesFound {
    config: StitchConfig,
    store: FragmentStore,
    graph: EndpointGraph,
    cycles: CurveCatalog,
}

impl CyclesFound {
    /// The distinct cycles found.
    #[must_use]
    pub const fn cycles(&self) -> &CurveCatalog {
        &self.cycles
    }

    /// Enumerate open curves and advance to [`Enumerated`].
    pub fn find_paths(self) -> Enumerated {
        let paths = crate::paths::find_open_paths(&self.graph, self.config.max_search_depth);
        Enumerated {
            config: self.config,
            store: self.store,
            graph: self.graph,
            cycles: self.cycles,
            paths,
        }
    }
}

// ───────────────────────── Stage 4: Enumerated ───────────────────────

/// Pipeline state after both enumerations.
#[must_use = "pipeline stages are consumed by advancing — call .reconstruct() to continue"]
pub struct Enumerated {
    config: StitchConfig,
    store: FragmentStore,
    graph: EndpointGraph,
    cycles: CurveCatalog,
    paths: CurveCatalog,
}

impl Enumerated {
    /// The distinct cycles found.
    #[must_use]
    pub const fn cycles(&self) -> &CurveCatalog {
        &self.cycles
    }

    /// The distinct open paths found.
    #[must_use]
    pub const fn paths(&self) -> &CurveCatalog {
        &self.paths
    }

    /// Rebuild every curve's points and advance to [`Reconstructed`].
    ///
    /// A curve whose node sequence does not match the fragments is kept
    /// with its [`CurveError`]; the others are unaffected.
    pub fn reconstruct(self) -> Reconstructed {
        let rebuild = |curve: &DiscoveredCurve| {
            let result = reconstruct_curve(&curve.nodes, &self.graph, &self.store);
            if let Err(e) = &result {
                tracing::warn!(fragments = %curve.fragments, error = %e, "curve reconstruction failed");
            }
            result
        };
        let closed: Vec<Result<Polyline, CurveError>> =
            self.cycles.curves().iter().map(rebuild).collect();
        let open: Vec<Result<Polyline, CurveError>> =
            self.paths.curves().iter().map(rebuild).collect();

        Reconstructed {
            config: self.config,
            graph: self.graph,
            cycles: self.cycles,
            paths: self.paths,
            closed,
            open,
        }
    }
}

// ───────────────────────── Stage 5: Reconstructed ────────────────────

/// Pipeline state after curve reconstruction.
#[must_use = "pipeline stages are consumed by advancing — call .classify() to continue"]
pub struct Reconstructed {
    config: StitchConfig,
    graph: EndpointGraph,
    cycles: CurveCatalog,
    paths: CurveCatalog,
    closed: Vec<Result<Polyline, CurveError>>,
    open: Vec<Result<Polyline, CurveError>>,
}

impl Reconstructed {
    /// Closed curve points, parallel to the cycle catalog.
    #[must_use]
    pub fn closed(&self) -> &[Result<Polyline, CurveError>] {
        &self.closed
    }

    /// Open curve points, parallel to the path catalog.
    #[must_use]
    pub fn open(&self) -> &[Result<Polyline, CurveError>] {
        &self.open
    }

    /// Label every reconstructed closed curve and advance to
    /// [`Classified`].
    ///
    /// Curves that failed reconstruction keep their [`CurveError`] and
    /// are never shown to the classifier.
    pub fn classify(self, classifier: &dyn ShapeClassifier) -> Classified {
        let closed: Vec<Result<ClosedCurve, CurveError>> = self
            .closed
            .into_iter()
            .zip(self.cycles.curves())
            .map(|(curve, discovered)| {
                curve.map(|curve| {
                    let (label, fit) = match classifier.classify_with_fit(&curve) {
                        Ok(Classification { label, fit }) => (Ok(label), fit),
                        Err(e) => {
                            tracing::warn!(fragments = %discovered.fragments, error = %e, "classification failed");
                            (Err(e), None)
                        }
                    };
                    ClosedCurve {
                        curve,
                        label,
                        fit,
                        regularized: None,
                    }
                })
            })
            .collect();

        Classified {
            config: self.config,
            graph: self.graph,
            cycles: self.cycles,
            paths: self.paths,
            closed,
            open: self.open,
        }
    }
}

// ───────────────────────── Stage 6: Classified ───────────────────────

/// Pipeline state after classification.
#[must_use = "pipeline stages are consumed by advancing — call .regularize() to continue"]
pub struct Classified {
    config: StitchConfig,
    graph: EndpointGraph,
    cycles: CurveCatalog,
    paths: CurveCatalog,
    closed: Vec<Result<ClosedCurve, CurveError>>,
    open: Vec<Result<Polyline, CurveError>>,
}

impl Classified {
    /// Classified closed curves, parallel to the cycle catalog.
    #[must_use]
    pub fn closed(&self) -> &[Result<ClosedCurve, CurveError>] {
        &self.closed
    }

    /// Regularize curves whose label is listed in
    /// `config.regularize_labels` and advance to the final stage.
    pub fn regularize(mut self, detector: &dyn CornerDetector) -> Regularized {
        let wanted = &self.config.regularize_labels;
        for closed in self.closed.iter_mut().flatten() {
            if closed.label.as_ref().is_ok_and(|label| wanted.contains(label)) {
                closed.regularized = Some(regularize_curve(&closed.curve, detector));
            }
        }

        Regularized {
            graph: self.graph,
            cycles: self.cycles,
            paths: self.paths,
            closed: self.closed,
            open: self.open,
        }
    }
}

// ───────────────────────── Stage 7: Regularized ──────────────────────

/// Pipeline state after regularization, the final stage.
///
/// Call [`into_result`](Self::into_result) to extract the
/// [`StitchResult`].
#[must_use = "call .into_result() to extract the StitchResult"]
pub struct Regularized {
    graph: EndpointGraph,
    cycles: CurveCatalog,
    paths: CurveCatalog,
    closed: Vec<Result<ClosedCurve, CurveError>>,
    open: Vec<Result<Polyline, CurveError>>,
}

impl Regularized {
    /// Finished closed curves, parallel to the cycle catalog.
    #[must_use]
    pub fn closed(&self) -> &[Result<ClosedCurve, CurveError>] {
        &self.closed
    }

    /// Consume the pipeline and assemble the [`StitchResult`].
    #[must_use]
    pub fn into_result(self) -> StitchResult {
        let unassigned = group_unassigned(
            &self.graph,
            self.cycles
                .curves()
                .iter()
                .chain(self.paths.curves())
                .map(|c| &c.fragments),
        );
        let truncated = self.cycles.truncated() || self.paths.truncated();

        let closed = self
            .cycles
            .into_curves()
            .into_iter()
            .zip(self.closed)
            .map(|(discovered, result)| ClosedCurveOutcome {
                fragments: discovered.fragments,
                nodes: discovered.nodes,
                result,
            })
            .collect();

        let open = self
            .paths
            .into_curves()
            .into_iter()
            .zip(self.open)
            .map(|(discovered, result)| OpenCurveOutcome {
                fragments: discovered.fragments,
                nodes: discovered.nodes,
                result,
            })
            .collect();

        StitchResult {
            closed,
            open,
            unassigned,
            truncated,
        }
    }
}

// ──────────────────────── PipelineStage trait ─────────────────────────

/// Total number of stages in the pipeline.
pub const STAGE_COUNT: usize = 7;

/// Trait implemented by every pipeline stage that has done work.
///
/// Gives uniform access to the stage's name, position, and the metrics
/// describing the work done to reach it. [`Pending`] is the input to
/// the first stage, not a stage itself.
pub trait PipelineStage {
    /// Human-readable name of this stage (e.g. `"graph"`).
    const NAME: &str;

    /// Zero-based index of this stage (`0` for Loaded through `6` for
    /// Regularized).
    const INDEX: usize;

    /// Stage-specific metrics for diagnostics.
    fn metrics(&self) -> StageMetrics;
}

impl PipelineStage for Loaded {
    const NAME: &str = "load";
    const INDEX: usize = 0;

    fn metrics(&self) -> StageMetrics {
        StageMetrics::Load {
            fragment_count: self.store.len(),
            point_count: self.store.total_points(),
        }
    }
}

impl PipelineStage for GraphBuilt {
    const NAME: &str = "graph";
    const INDEX: usize = 1;

    fn metrics(&self) -> StageMetrics {
        StageMetrics::Graph {
            tolerance: self.graph.tolerance(),
            node_count: self.graph.node_count(),
            proximity_edge_count: self.graph.proximity_edge_count() / 2,
            dead_end_count: self.graph.dead_ends().count(),
        }
    }
}

impl PipelineStage for CyclesFound {
    const NAME: &str = "cycles";
    const INDEX: usize = 2;

    fn metrics(&self) -> StageMetrics {
        StageMetrics::Cycles {
            cycle_count: self.cycles.len(),
            truncated: self.cycles.truncated(),
        }
    }
}

impl PipelineStage for Enumerated {
    const NAME: &str = "paths";
    const INDEX: usize = 3;

    fn metrics(&self) -> StageMetrics {
        StageMetrics::Paths {
            path_count: self.paths.len(),
            truncated: self.paths.truncated(),
        }
    }
}

impl PipelineStage for Reconstructed {
    const NAME: &str = "reconstruct";
    const INDEX: usize = 4;

    fn metrics(&self) -> StageMetrics {
        let all = || self.closed.iter().chain(&self.open);
        StageMetrics::Reconstruct {
            curve_count: all().count(),
            failed_count: all().filter(|r| r.is_err()).count(),
            point_count: all().flatten().map(Polyline::len).sum(),
        }
    }
}

impl PipelineStage for Classified {
    const NAME: &str = "classify";
    const INDEX: usize = 5;

    fn metrics(&self) -> StageMetrics {
        let mut label_counts = std::collections::BTreeMap::new();
        let mut failed_count = 0;
        for closed in self.closed.iter().flatten() {
            match &closed.label {
                Ok(label) => *label_counts.entry(label.to_string()).or_insert(0) += 1,
                Err(_) => failed_count += 1,
            }
        }
        StageMetrics::Classify {
            classified_count: label_counts.values().sum(),
            failed_count,
            label_counts,
        }
    }
}

impl PipelineStage for Regularized {
    const NAME: &str = "regularize";
    const INDEX: usize = 6;

    fn metrics(&self) -> StageMetrics {
        let attempted: Vec<&RegularizedShape> = self
            .closed
            .iter()
            .flatten()
            .filter_map(|c| c.regularized.as_ref())
            .collect();
        StageMetrics::Regularize {
            attempted_count: attempted.len(),
            empty_count: attempted.iter().filter(|s| s.is_empty()).count(),
            corner_count: attempted.iter().map(|s| s.corner_count()).sum(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::classify::{ShapeFit, ShapeLabel};
    use crate::corners::StructureTensorCorners;
    use crate::heuristic::PolygonHeuristic;
    use crate::types::{ClassificationError, Point};

    fn pl(points: &[(f64, f64)]) -> Polyline {
        Polyline::new(points.iter().map(|&(x, y)| Point::new(x, y)).collect())
    }

    /// A square drawn as four strokes plus one stray stroke.
    fn sketch() -> Vec<Polyline> {
        vec![
            pl(&[(0.0, 0.0), (50.0, 0.0), (100.0, 0.0)]),
            pl(&[(101.0, 1.0), (101.0, 50.0), (101.0, 100.0)]),
            pl(&[(100.0, 101.0), (50.0, 101.0), (0.0, 101.0)]),
            pl(&[(-1.0, 100.0), (-1.0, 50.0), (0.0, 1.0)]),
            pl(&[(300.0, 0.0), (350.0, 30.0)]),
        ]
    }

    #[test]
    fn stages_expose_intermediates() {
        let loaded = Pipeline::new(sketch(), StitchConfig::default())
            .load()
            .unwrap();
        assert_eq!(loaded.store().len(), 5);

        let graph = loaded.build_graph();
        assert_eq!(graph.graph().node_count(), 10);

        let cycles = graph.find_cycles();
        assert_eq!(cycles.cycles().len(), 1);

        let enumerated = cycles.find_paths();
        assert_eq!(enumerated.paths().len(), 1);

        let reconstructed = enumerated.reconstruct();
        assert!(reconstructed.closed()[0].is_ok());
        assert_eq!(reconstructed.open()[0].as_ref().unwrap().len(), 2);

        let classified = reconstructed.classify(&PolygonHeuristic::default());
        let square = classified.closed()[0].as_ref().unwrap();
        assert_eq!(square.label, Ok(ShapeLabel::Rectangle));
        assert!(matches!(square.fit, Some(ShapeFit::Polygon { .. })));
        assert!(square.regularized.is_none());

        let regularized = classified.regularize(&StructureTensorCorners::default());
        assert!(regularized.closed()[0].as_ref().unwrap().regularized.is_some());
    }

    #[test]
    fn malformed_fragment_stops_at_load() {
        let mut fragments = sketch();
        fragments.push(pl(&[(5.0, 5.0)]));
        let result = Pipeline::new(fragments, StitchConfig::default()).load();
        assert!(matches!(
            result,
            Err(PipelineError::MalformedFragment {
                fragment_id: 5,
                point_count: 1,
            })
        ));
    }

    #[test]
    fn invalid_config_stops_at_load() {
        let config = StitchConfig {
            endpoint_tolerance: -1.0,
            ..StitchConfig::default()
        };
        let result = Pipeline::new(sketch(), config).load();
        assert!(matches!(result, Err(PipelineError::InvalidConfig(_))));
    }

    #[test]
    fn only_selected_labels_are_regularized() {
        let config = StitchConfig {
            regularize_labels: vec![ShapeLabel::Triangle],
            ..StitchConfig::default()
        };
        let result = Pipeline::new(sketch(), config)
            .load()
            .unwrap()
            .build_graph()
            .enumerate()
            .reconstruct()
            .classify(&PolygonHeuristic::default())
            .regularize(&StructureTensorCorners::default())
            .into_result();
        let closed = result.closed[0].result.as_ref().unwrap();
        assert_eq!(closed.label, Ok(ShapeLabel::Rectangle));
        assert!(closed.regularized.is_none());
    }

    #[test]
    fn classifier_failure_keeps_curve() {
        struct Failing;
        impl ShapeClassifier for Failing {
            fn classify(&self, _: &Polyline) -> Result<ShapeLabel, ClassificationError> {
                Err(ClassificationError::Model("offline".to_string()))
            }
        }
        let result = Pipeline::new(sketch(), StitchConfig::default())
            .load()
            .unwrap()
            .build_graph()
            .enumerate()
            .reconstruct()
            .classify(&Failing)
            .regularize(&StructureTensorCorners::default())
            .into_result();
        let closed = result.closed[0].result.as_ref().unwrap();
        assert_eq!(closed.curve.len(), 12);
        assert!(closed.label.is_err());
        assert!(closed.fit.is_none());
        assert!(closed.regularized.is_none());
        assert!(result.closed_by_label().is_empty());
    }

    #[test]
    fn failed_reconstruction_skips_classifier() {
        struct Counting(std::cell::Cell<usize>);
        impl ShapeClassifier for Counting {
            fn classify(&self, _: &Polyline) -> Result<ShapeLabel, ClassificationError> {
                self.0.set(self.0.get() + 1);
                Ok(ShapeLabel::Rectangle)
            }
        }
        let mut reconstructed = Pipeline::new(sketch(), StitchConfig::default())
            .load()
            .unwrap()
            .build_graph()
            .enumerate()
            .reconstruct();
        let lookup = CurveError::Lookup { from: 0, to: 1 };
        reconstructed.closed[0] = Err(lookup.clone());

        let classifier = Counting(std::cell::Cell::new(0));
        let result = reconstructed
            .classify(&classifier)
            .regularize(&StructureTensorCorners::default())
            .into_result();
        assert_eq!(classifier.0.get(), 0);
        assert_eq!(result.closed[0].result, Err(lookup));
        assert_eq!(result.failed_count(), 1);
    }

    #[test]
    fn stage_metadata() {
        assert_eq!(Loaded::NAME, "load");
        assert_eq!(Loaded::INDEX, 0);
        assert_eq!(Regularized::INDEX, STAGE_COUNT - 1);
        let loaded = Pipeline::new(sketch(), StitchConfig::default())
            .load()
            .unwrap();
        assert_eq!(
            loaded.metrics(),
            StageMetrics::Load {
                fragment_count: 5,
                point_count: 14,
            }
        );
    }
}
