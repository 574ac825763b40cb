//! Shared types for the sketchloop curve stitching pipeline.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::classify::ShapeLabel;

/// Index of a fragment inside a [`FragmentStore`].
pub type FragmentId = usize;

/// Index of an endpoint node inside an [`EndpointGraph`](crate::graph::EndpointGraph).
///
/// Node `2 * i` is the start of fragment `i`, node `2 * i + 1` its end.
pub type NodeId = usize;

/// A 2D point in sketch coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position.
    pub x: f64,
    /// Vertical position.
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    ///
    /// Avoids the square root for comparison purposes.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.mul_add(dx, dy * dy)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Whether both coordinates are finite.
    #[must_use]
    pub const fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// An ordered sequence of points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline(Vec<Point>);

impl Polyline {
    /// Create a new polyline from a vector of points.
    #[must_use]
    pub const fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    /// Returns `true` if the polyline has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of points in the polyline.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the first point, if any.
    #[must_use]
    pub fn first(&self) -> Option<&Point> {
        self.0.first()
    }

    /// Returns the last point, if any.
    #[must_use]
    pub fn last(&self) -> Option<&Point> {
        self.0.last()
    }

    /// Returns a slice of all points.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    /// Consumes the polyline and returns the underlying vector of points.
    #[must_use]
    pub fn into_points(self) -> Vec<Point> {
        self.0
    }

    /// Total length of the open polyline (sum of segment lengths).
    #[must_use]
    pub fn length(&self) -> f64 {
        self.0.windows(2).map(|w| w[0].distance(w[1])).sum()
    }
}

/// One stroke fragment: a polyline of unknown connectivity.
///
/// Only a [`FragmentStore`] creates fragments, so there is no
/// `Deserialize` impl that could bypass its checks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fragment {
    id: FragmentId,
    points: Polyline,
}

impl Fragment {
    /// Stable identifier of this fragment within its store.
    #[must_use]
    pub const fn id(&self) -> FragmentId {
        self.id
    }

    /// The fragment's points in their original order.
    #[must_use]
    pub const fn polyline(&self) -> &Polyline {
        &self.points
    }

    /// First point of the fragment.
    #[must_use]
    pub fn start_point(&self) -> Point {
        self.points.points()[0]
    }

    /// Last point of the fragment.
    #[must_use]
    pub fn end_point(&self) -> Point {
        self.points.points()[self.points.len() - 1]
    }
}

/// The validated input fragments of one run.
///
/// Ids are assigned in input order. Every fragment is guaranteed to
/// have at least two finite points, so [`Fragment::start_point`] and
/// [`Fragment::end_point`] never index out of bounds.
///
/// Serializes as the plain list of polylines. Deserializing goes through
/// [`FragmentStore::new`], so a stored run is validated like fresh input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Polyline>", into = "Vec<Polyline>")]
pub struct FragmentStore {
    fragments: Vec<Fragment>,
}

impl FragmentStore {
    /// Validate and store the given fragments.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::MalformedFragment`] for the first
    /// fragment with fewer than two points, and
    /// [`PipelineError::NonFiniteCoordinate`] for the first fragment
    /// containing a NaN or infinite coordinate. Nothing is stored when
    /// validation fails.
    pub fn new(polylines: Vec<Polyline>) -> Result<Self, PipelineError> {
        let mut fragments = Vec::with_capacity(polylines.len());
        for (id, points) in polylines.into_iter().enumerate() {
            if points.len() < 2 {
                return Err(PipelineError::MalformedFragment {
                    fragment_id: id,
                    point_count: points.len(),
                });
            }
            if let Some(bad) = points.points().iter().position(|p| !p.is_finite()) {
                return Err(PipelineError::NonFiniteCoordinate {
                    fragment_id: id,
                    point_index: bad,
                });
            }
            fragments.push(Fragment { id, points });
        }
        Ok(Self { fragments })
    }

    /// Number of fragments.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Returns `true` if the store holds no fragments.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Look up a fragment by id.
    #[must_use]
    pub fn get(&self, id: FragmentId) -> Option<&Fragment> {
        self.fragments.get(id)
    }

    /// All fragments in id order.
    #[must_use]
    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// Total number of points across all fragments.
    #[must_use]
    pub fn total_points(&self) -> usize {
        self.fragments.iter().map(|f| f.points.len()).sum()
    }
}

impl TryFrom<Vec<Polyline>> for FragmentStore {
    type Error = PipelineError;

    fn try_from(polylines: Vec<Polyline>) -> Result<Self, Self::Error> {
        Self::new(polylines)
    }
}

impl From<FragmentStore> for Vec<Polyline> {
    fn from(store: FragmentStore) -> Self {
        store.fragments.into_iter().map(|f| f.points).collect()
    }
}

/// The set of fragment ids making up one discovered curve.
///
/// Used as the deduplication key for cycles and paths: two traversals
/// over the same fragments describe the same curve regardless of start
/// node or direction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FragmentSet(BTreeSet<FragmentId>);

impl FragmentSet {
    /// Number of distinct fragments in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no fragment is in the set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `id` belongs to the set.
    #[must_use]
    pub fn contains(&self, id: FragmentId) -> bool {
        self.0.contains(&id)
    }

    /// Fragment ids in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = FragmentId> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<FragmentId> for FragmentSet {
    fn from_iter<I: IntoIterator<Item = FragmentId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for FragmentSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, id) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{id}")?;
        }
        f.write_str("}")
    }
}

/// Smallest resampled point count a feature vector can be built from.
pub const MIN_FEATURE_SAMPLES: usize = 3;

/// Thresholds of the polygon heuristic classifier.
///
/// The defaults were tuned empirically on hand-drawn sketches. They
/// carry no meaning beyond reproducing that behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicConfig {
    /// Curves with a smaller enclosed area are unidentified.
    pub min_area: f64,
    /// First-pass polygon approximation tolerance, as a fraction of the
    /// perimeter.
    pub coarse_fraction: f64,
    /// Second-pass tolerance for curves with fewer than seven coarse
    /// vertices.
    pub fine_fraction: f64,
    /// A many-vertex curve is a circle if its area differs from the
    /// minimum enclosing circle's area by less than this fraction.
    pub circle_area_tolerance: f64,
    /// Exclusive circularity (`4πA/P²`) band treated as a
    /// non-shape.
    pub circularity_band: (f64, f64),
    /// Heptagons whose perimeter/area ratio exceeds this are rejected.
    pub heptagon_max_perimeter_ratio: f64,
    /// Ten-vertex circles whose perimeter/area ratio exceeds this are
    /// rejected.
    pub decagon_max_perimeter_ratio: f64,
}

impl HeuristicConfig {
    pub const DEFAULT_MIN_AREA: f64 = 3.0;
    pub const DEFAULT_COARSE_FRACTION: f64 = 0.01;
    pub const DEFAULT_FINE_FRACTION: f64 = 0.02;
    pub const DEFAULT_CIRCLE_AREA_TOLERANCE: f64 = 0.2;
    pub const DEFAULT_CIRCULARITY_BAND: (f64, f64) = (0.43, 0.79);
    pub const DEFAULT_HEPTAGON_MAX_PERIMETER_RATIO: f64 = 0.05;
    pub const DEFAULT_DECAGON_MAX_PERIMETER_RATIO: f64 = 0.105;
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        Self {
            min_area: Self::DEFAULT_MIN_AREA,
            coarse_fraction: Self::DEFAULT_COARSE_FRACTION,
            fine_fraction: Self::DEFAULT_FINE_FRACTION,
            circle_area_tolerance: Self::DEFAULT_CIRCLE_AREA_TOLERANCE,
            circularity_band: Self::DEFAULT_CIRCULARITY_BAND,
            heptagon_max_perimeter_ratio: Self::DEFAULT_HEPTAGON_MAX_PERIMETER_RATIO,
            decagon_max_perimeter_ratio: Self::DEFAULT_DECAGON_MAX_PERIMETER_RATIO,
        }
    }
}

/// Parameters of the structure-tensor corner detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CornerConfig {
    /// Maximum spacing between resampled points. Original vertices are
    /// always kept.
    pub spacing: f64,
    /// Number of tangent samples taken on each side of a point.
    pub window: usize,
    /// Harris sensitivity factor κ.
    pub harris_k: f64,
    /// Peaks below `threshold_rel * max_response` are discarded.
    pub threshold_rel: f64,
    /// Minimum separation between two peaks, in samples.
    pub min_distance: usize,
}

impl CornerConfig {
    pub const DEFAULT_SPACING: f64 = 2.0;
    pub const DEFAULT_WINDOW: usize = 3;
    pub const DEFAULT_HARRIS_K: f64 = 0.04;
    pub const DEFAULT_THRESHOLD_REL: f64 = 0.1;
    pub const DEFAULT_MIN_DISTANCE: usize = 3;

    /// Smallest accepted `spacing`.
    pub const MIN_SPACING: f64 = 0.01;

    /// Check the detector parameters.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] describing the first
    /// offending field.
    pub fn validate(&self) -> Result<(), PipelineError> {
        let invalid = |msg: String| Err(PipelineError::InvalidConfig(msg));

        if !(self.spacing.is_finite() && self.spacing >= Self::MIN_SPACING) {
            return invalid(format!(
                "corners.spacing must be finite and at least {}",
                Self::MIN_SPACING
            ));
        }
        if self.window == 0 {
            return invalid("corners.window must be at least 1".to_string());
        }
        if !(0.0..=1.0).contains(&self.threshold_rel) {
            return invalid("corners.threshold_rel must be within 0.0..=1.0".to_string());
        }
        Ok(())
    }
}

impl Default for CornerConfig {
    fn default() -> Self {
        Self {
            spacing: Self::DEFAULT_SPACING,
            window: Self::DEFAULT_WINDOW,
            harris_k: Self::DEFAULT_HARRIS_K,
            threshold_rel: Self::DEFAULT_THRESHOLD_REL,
            min_distance: Self::DEFAULT_MIN_DISTANCE,
        }
    }
}

/// Configuration for the curve stitching pipeline.
///
/// All thresholds the stages use live here so tests and the CLI can
/// vary them. Call [`validate`](Self::validate) (the pipeline does this
/// on load) to reject nonsensical values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StitchConfig {
    /// Endpoint proximity threshold ε. Two endpoints of distinct
    /// fragments are joined when their distance is strictly below it.
    pub endpoint_tolerance: f64,

    /// Maximum number of nodes on a DFS path during cycle and path
    /// enumeration.
    ///
    /// `None` runs the bare algorithm with no bound, whose worst case
    /// is exponential in dense graphs.
    pub max_search_depth: Option<usize>,

    /// Number of resampled points used to build a feature vector. The
    /// vector length is twice this.
    pub feature_samples: usize,

    /// Labels whose curves get regularized into idealized polygons.
    pub regularize_labels: Vec<ShapeLabel>,

    /// Polygon heuristic classifier thresholds.
    pub heuristic: HeuristicConfig,

    /// Corner detector parameters.
    pub corners: CornerConfig,
}

impl StitchConfig {
    pub const DEFAULT_ENDPOINT_TOLERANCE: f64 = 5.0;
    pub const DEFAULT_MAX_SEARCH_DEPTH: Option<usize> = Some(512);
    pub const DEFAULT_FEATURE_SAMPLES: usize = 64;

    /// Check every parameter for a usable value.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] describing the first
    /// offending field.
    pub fn validate(&self) -> Result<(), PipelineError> {
        let invalid = |msg: &str| Err(PipelineError::InvalidConfig(msg.to_string()));

        if !(self.endpoint_tolerance.is_finite() && self.endpoint_tolerance > 0.0) {
            return invalid("endpoint_tolerance must be finite and positive");
        }
        if self.max_search_depth.is_some_and(|d| d < 2) {
            return invalid("max_search_depth must be at least 2");
        }
        if self.feature_samples < MIN_FEATURE_SAMPLES {
            return invalid("feature_samples must be at least 3");
        }
        let h = &self.heuristic;
        if !(h.coarse_fraction > 0.0 && h.fine_fraction > 0.0) {
            return invalid("heuristic approximation fractions must be positive");
        }
        if h.circularity_band.0 > h.circularity_band.1 {
            return invalid("heuristic circularity_band is reversed");
        }
        self.corners.validate()
    }
}

impl Default for StitchConfig {
    fn default() -> Self {
        Self {
            endpoint_tolerance: Self::DEFAULT_ENDPOINT_TOLERANCE,
            max_search_depth: Self::DEFAULT_MAX_SEARCH_DEPTH,
            feature_samples: Self::DEFAULT_FEATURE_SAMPLES,
            regularize_labels: vec![ShapeLabel::Rectangle],
            heuristic: HeuristicConfig::default(),
            corners: CornerConfig::default(),
        }
    }
}

/// Errors that abort a whole run before any graph is built.
#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize, Deserialize)]
pub enum PipelineError {
    /// A fragment has fewer than two points.
    #[error("fragment {fragment_id} has {point_count} point(s), at least 2 are required")]
    MalformedFragment {
        /// Position of the fragment in the input.
        fragment_id: FragmentId,
        /// How many points it had.
        point_count: usize,
    },

    /// A fragment contains a NaN or infinite coordinate.
    #[error("fragment {fragment_id} has a non-finite coordinate at point {point_index}")]
    NonFiniteCoordinate {
        /// Position of the fragment in the input.
        fragment_id: FragmentId,
        /// Index of the offending point.
        point_index: usize,
    },

    /// Pipeline configuration is invalid.
    #[error("invalid pipeline configuration: {0}")]
    InvalidConfig(String),
}

/// Errors that make a single curve unusable without affecting others.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum CurveError {
    /// No fragment matches the endpoint pair expected by the node
    /// sequence. Indicates a graph/data inconsistency.
    #[error("no fragment joins nodes {from} and {to}")]
    Lookup {
        /// First node of the pair.
        from: NodeId,
        /// Second node of the pair.
        to: NodeId,
    },
}

/// Failures of the shape classifier for a single curve.
///
/// The affected curve is reported unclassified.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum ClassificationError {
    /// The curve has too few points to build a feature vector.
    #[error("curve has {0} point(s), at least 3 are required for classification")]
    TooFewPoints(usize),

    /// A feature vector was requested with too few resampled points.
    #[error("feature sample count {0} is too small, at least 3 are required")]
    InvalidSampleCount(usize),

    /// The model has no data to predict from.
    #[error("classifier model is not fitted")]
    ModelNotFitted,

    /// The model expects a different feature vector length.
    #[error("feature vector has length {actual}, model expects {expected}")]
    DimensionMismatch {
        /// Length the model was fitted with.
        expected: usize,
        /// Length that was supplied.
        actual: usize,
    },

    /// Any other failure reported by an external model.
    #[error("classifier failed: {0}")]
    Model(String),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line(points: &[(f64, f64)]) -> Polyline {
        Polyline::new(points.iter().map(|&(x, y)| Point::new(x, y)).collect())
    }

    // --- Point tests ---

    #[test]
    fn point_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance_squared(b) - 25.0).abs() < f64::EPSILON);
        assert!((a.distance(b) - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn point_is_finite() {
        assert!(Point::new(1.0, 2.0).is_finite());
        assert!(!Point::new(f64::NAN, 2.0).is_finite());
        assert!(!Point::new(1.0, f64::INFINITY).is_finite());
    }

    // --- Polyline tests ---

    #[test]
    fn polyline_length_sums_segments() {
        let pl = line(&[(0.0, 0.0), (3.0, 4.0), (3.0, 10.0)]);
        assert!((pl.length() - 11.0).abs() < 1e-12);
    }

    #[test]
    fn polyline_empty() {
        let pl = Polyline::new(vec![]);
        assert!(pl.is_empty());
        assert!(pl.first().is_none());
        assert!(pl.length().abs() < f64::EPSILON);
    }

    // --- FragmentStore tests ---

    #[test]
    fn store_assigns_ids_in_order() {
        let store = FragmentStore::new(vec![
            line(&[(0.0, 0.0), (1.0, 0.0)]),
            line(&[(5.0, 5.0), (6.0, 6.0), (7.0, 5.0)]),
        ])
        .unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(1).unwrap().id(), 1);
        assert_eq!(store.get(1).unwrap().start_point(), Point::new(5.0, 5.0));
        assert_eq!(store.get(1).unwrap().end_point(), Point::new(7.0, 5.0));
        assert_eq!(store.total_points(), 5);
    }

    #[test]
    fn store_rejects_single_point_fragment() {
        let result = FragmentStore::new(vec![
            line(&[(0.0, 0.0), (1.0, 0.0)]),
            line(&[(5.0, 5.0)]),
        ]);
        assert_eq!(
            result,
            Err(PipelineError::MalformedFragment {
                fragment_id: 1,
                point_count: 1,
            })
        );
    }

    #[test]
    fn store_rejects_empty_fragment() {
        let result = FragmentStore::new(vec![Polyline::new(vec![])]);
        assert!(matches!(
            result,
            Err(PipelineError::MalformedFragment { point_count: 0, .. })
        ));
    }

    #[test]
    fn store_rejects_nan() {
        let result = FragmentStore::new(vec![line(&[(0.0, 0.0), (f64::NAN, 1.0)])]);
        assert_eq!(
            result,
            Err(PipelineError::NonFiniteCoordinate {
                fragment_id: 0,
                point_index: 1,
            })
        );
    }

    #[test]
    fn store_json_round_trip() {
        let store = FragmentStore::new(vec![
            line(&[(0.0, 0.0), (1.0, 0.0)]),
            line(&[(5.0, 5.0), (6.0, 6.0)]),
        ])
        .unwrap();
        let json = serde_json::to_string(&store).unwrap();
        let back: FragmentStore = serde_json::from_str(&json).unwrap();
        assert_eq!(back, store);
        assert_eq!(back.get(1).unwrap().id(), 1);
    }

    #[test]
    fn store_deserialize_is_validated() {
        // Fragment records with explicit ids are not an accepted form.
        let err = serde_json::from_str::<FragmentStore>(r#"{"fragments":[{"id":0,"points":[]}]}"#);
        assert!(err.is_err());

        let err = serde_json::from_str::<FragmentStore>(r#"[[{"x":0.0,"y":0.0}]]"#).unwrap_err();
        assert!(
            err.to_string().contains("fragment 0 has 1 point(s)"),
            "{err}"
        );

        let err = serde_json::from_str::<FragmentStore>("[[]]").unwrap_err();
        assert!(err.to_string().contains("fragment 0 has 0 point(s)"), "{err}");
    }

    // --- FragmentSet tests ---

    #[test]
    fn fragment_set_ignores_order_and_duplicates() {
        let a: FragmentSet = [3, 1, 2, 1].into_iter().collect();
        let b: FragmentSet = [1, 2, 3].into_iter().collect();
        assert_eq!(a, b);
        assert_eq!(a.len(), 3);
        assert_eq!(a.to_string(), "{1, 2, 3}");
    }

    // --- Config tests ---

    #[test]
    fn config_defaults() {
        let config = StitchConfig::default();
        assert!((config.endpoint_tolerance - 5.0).abs() < f64::EPSILON);
        assert_eq!(config.max_search_depth, Some(512));
        assert_eq!(config.feature_samples, 64);
        assert_eq!(config.regularize_labels, vec![ShapeLabel::Rectangle]);
        assert_eq!(config.heuristic.circularity_band, (0.43, 0.79));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_rejects_non_positive_tolerance() {
        let config = StitchConfig {
            endpoint_tolerance: 0.0,
            ..StitchConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PipelineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn config_rejects_tiny_depth() {
        let config = StitchConfig {
            max_search_depth: Some(1),
            ..StitchConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn config_rejects_tiny_corner_spacing() {
        let config = StitchConfig {
            corners: CornerConfig {
                spacing: 1e-9,
                ..CornerConfig::default()
            },
            ..StitchConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PipelineError::InvalidConfig(msg)) if msg.contains("corners.spacing")
        ));
        assert!(CornerConfig::default().validate().is_ok());
    }

    #[test]
    fn config_partial_json_fills_defaults() {
        let config: StitchConfig =
            serde_json::from_str(r#"{"endpoint_tolerance": 2.5, "max_search_depth": null}"#)
                .unwrap();
        assert!((config.endpoint_tolerance - 2.5).abs() < f64::EPSILON);
        assert_eq!(config.max_search_depth, None);
        assert_eq!(config.feature_samples, StitchConfig::DEFAULT_FEATURE_SAMPLES);
    }

    // --- Error display tests ---

    #[test]
    fn error_display() {
        let err = PipelineError::MalformedFragment {
            fragment_id: 4,
            point_count: 1,
        };
        assert_eq!(
            err.to_string(),
            "fragment 4 has 1 point(s), at least 2 are required"
        );
        let err = CurveError::Lookup { from: 2, to: 3 };
        assert_eq!(err.to_string(), "no fragment joins nodes 2 and 3");
        let err = ClassificationError::DimensionMismatch {
            expected: 8,
            actual: 6,
        };
        assert_eq!(
            err.to_string(),
            "feature vector has length 6, model expects 8"
        );
    }
}
