//! sketchloop-pipeline: stitch vectorized sketch fragments into curves
//! (sans-IO).
//!
//! Takes the polyline fragments a vectorizer produced from a hand-drawn
//! sketch and turns them into:
//!
//! - closed curves, each labelled with a shape class and, for selected
//!   labels, regularized into an idealized polygon
//! - open curves running between two dead-end endpoints
//! - groups of leftover fragments that fit into neither
//!
//! Fragments whose endpoints lie closer than the endpoint tolerance are
//! joined in an endpoint graph; cycles and dead-end-to-dead-end paths in
//! that graph become the curves.
//!
//! This crate has **no I/O dependencies**. It operates on in-memory
//! polylines and returns structured data. File parsing and reporting
//! live in `sketchloop-bench`.

pub mod catalog;
pub mod classify;
pub mod corners;
pub mod cycles;
pub mod diagnostics;
pub mod features;
pub mod graph;
pub mod heuristic;
pub mod outcome;
pub mod paths;
pub mod pca;
pub mod pipeline;
pub mod reconstruct;
pub mod regularize;
pub mod simplify;
pub mod types;

pub use classify::{
    CentroidModel, Classification, ClassifierKind, FeatureClassifier, FeatureModel, ShapeClassifier,
    ShapeFit, ShapeLabel,
};
pub use corners::{CornerDetector, StructureTensorCorners};
pub use features::{FeatureVector, extract_features};
pub use graph::EndpointGraph;
pub use heuristic::PolygonHeuristic;
pub use outcome::{ClosedCurve, ClosedCurveOutcome, OpenCurveOutcome, StitchResult, UnassignedGroup};
pub use pipeline::{Pipeline, PipelineStage};
pub use regularize::RegularizedShape;
pub use types::{
    ClassificationError, CornerConfig, CurveError, FragmentId, FragmentSet, HeuristicConfig,
    NodeId, PipelineError, Point, Polyline, StitchConfig,
};

/// Run the full stitching pipeline.
///
/// # Pipeline steps
///
/// 1. Validate the config and the fragments
/// 2. Build the endpoint graph
/// 3. Enumerate closed curves (cycles)
/// 4. Enumerate open curves (dead end to dead end)
/// 5. Reconstruct every curve's points
/// 6. Classify closed curves (pluggable strategy)
/// 7. Regularize closed curves with selected labels (pluggable corner
///    detector)
///
/// Failures in steps 5 to 7 are recorded per curve in the
/// [`StitchResult`]; they never abort the batch.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] if `config` is unusable.
/// Returns [`PipelineError::MalformedFragment`] if a fragment has fewer
/// than two points.
/// Returns [`PipelineError::NonFiniteCoordinate`] if a fragment holds a
/// NaN or infinite coordinate.
pub fn process(
    fragments: Vec<Polyline>,
    config: &StitchConfig,
    classifier: &dyn ShapeClassifier,
    detector: &dyn CornerDetector,
) -> Result<StitchResult, PipelineError> {
    Ok(Pipeline::new(fragments, config.clone())
        .load()?
        .build_graph()
        .enumerate()
        .reconstruct()
        .classify(classifier)
        .regularize(detector)
        .into_result())
}
