//! Shape classification of closed curves.
//!
//! This module defines the [`ShapeClassifier`] trait for pluggable
//! classifiers and the [`ClassifierKind`] enum for selecting one at
//! runtime.
//!
//! # Strategy pattern
//!
//! A trained model only sees the fixed-length [`FeatureVector`] of a
//! curve. [`FeatureModel`] is that contract, and [`FeatureClassifier`]
//! adapts any model into a curve-level [`ShapeClassifier`]. The polygon
//! heuristic in [`crate::heuristic`] looks at the raw geometry instead
//! and implements [`ShapeClassifier`] directly.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::features::{FeatureVector, extract_features};
use crate::heuristic::PolygonHeuristic;
use crate::types::{ClassificationError, MIN_FEATURE_SAMPLES, Point, Polyline};

/// Label assigned to a closed curve.
///
/// Serializes as a lowercase string (`"rectangle"`). Labels outside
/// the known set round-trip through [`Other`](Self::Other).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum ShapeLabel {
    Triangle,
    Rectangle,
    Pentagon,
    Hexagon,
    Heptagon,
    Octagon,
    Nonagon,
    Circle,
    /// The curve matched no known shape.
    Unidentified,
    /// Any label produced by an external model that is not listed above.
    Other(String),
}

impl ShapeLabel {
    /// Number of corners of the ideal polygon, if the label names one.
    #[must_use]
    pub const fn corner_count(&self) -> Option<usize> {
        match self {
            Self::Triangle => Some(3),
            Self::Rectangle => Some(4),
            Self::Pentagon => Some(5),
            Self::Hexagon => Some(6),
            Self::Heptagon => Some(7),
            Self::Octagon => Some(8),
            Self::Nonagon => Some(9),
            Self::Circle | Self::Unidentified | Self::Other(_) => None,
        }
    }

    /// The label as a lowercase string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Triangle => "triangle",
            Self::Rectangle => "rectangle",
            Self::Pentagon => "pentagon",
            Self::Hexagon => "hexagon",
            Self::Heptagon => "heptagon",
            Self::Octagon => "octagon",
            Self::Nonagon => "nonagon",
            Self::Circle => "circle",
            Self::Unidentified => "unidentified",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for ShapeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for ShapeLabel {
    fn from(s: String) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "triangle" => Self::Triangle,
            "rectangle" => Self::Rectangle,
            "pentagon" => Self::Pentagon,
            "hexagon" => Self::Hexagon,
            "heptagon" => Self::Heptagon,
            "octagon" => Self::Octagon,
            "nonagon" => Self::Nonagon,
            "circle" => Self::Circle,
            "unidentified" => Self::Unidentified,
            _ => Self::Other(s),
        }
    }
}

impl From<ShapeLabel> for String {
    fn from(label: ShapeLabel) -> Self {
        match label {
            ShapeLabel::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for ShapeLabel {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.to_string()))
    }
}

/// Ideal geometry a classifier derived while labelling a curve.
///
/// Serialized with a `kind` tag: `{"kind":"circle","center":..,"radius":..}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ShapeFit {
    /// Minimum enclosing circle of a round curve.
    Circle { center: Point, radius: f64 },
    /// Vertices of the polygon approximation, first vertex not repeated.
    Polygon { vertices: Vec<Point> },
}

/// A label plus the geometry behind it, if the classifier has any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub label: ShapeLabel,
    pub fit: Option<ShapeFit>,
}

impl From<ShapeLabel> for Classification {
    fn from(label: ShapeLabel) -> Self {
        Self { label, fit: None }
    }
}

/// Trait for curve-level shape classifiers.
pub trait ShapeClassifier {
    /// Assign a label to one closed curve.
    ///
    /// # Errors
    ///
    /// Returns a [`ClassificationError`] if the curve cannot be
    /// labelled. The pipeline reports such curves as unclassified.
    fn classify(&self, curve: &Polyline) -> Result<ShapeLabel, ClassificationError>;

    /// Label one closed curve and report the ideal shape it matched.
    ///
    /// Classifiers that only produce a label keep this default, which
    /// carries no geometry.
    ///
    /// # Errors
    ///
    /// Same as [`classify`](Self::classify).
    fn classify_with_fit(&self, curve: &Polyline) -> Result<Classification, ClassificationError> {
        self.classify(curve).map(Classification::from)
    }
}

/// A model that predicts a label from a feature vector.
///
/// This is the boundary to trained classifiers: the pipeline computes
/// the vector, the model maps it to exactly one label.
pub trait FeatureModel {
    /// Predict the label of `features`.
    ///
    /// # Errors
    ///
    /// Returns a [`ClassificationError`] if the model cannot produce a
    /// label for this input.
    fn predict(&self, features: &FeatureVector) -> Result<ShapeLabel, ClassificationError>;
}

impl<F> FeatureModel for F
where
    F: Fn(&FeatureVector) -> Result<ShapeLabel, ClassificationError>,
{
    fn predict(&self, features: &FeatureVector) -> Result<ShapeLabel, ClassificationError> {
        self(features)
    }
}

/// Adapts a [`FeatureModel`] into a [`ShapeClassifier`] by extracting
/// features with a fixed sample count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureClassifier<M> {
    model: M,
    samples: usize,
}

impl<M: FeatureModel> FeatureClassifier<M> {
    /// Wrap `model`, resampling curves to `samples` points.
    ///
    /// # Errors
    ///
    /// Returns [`ClassificationError::InvalidSampleCount`] if `samples`
    /// is below [`MIN_FEATURE_SAMPLES`].
    pub fn new(model: M, samples: usize) -> Result<Self, ClassificationError> {
        if samples < MIN_FEATURE_SAMPLES {
            return Err(ClassificationError::InvalidSampleCount(samples));
        }
        Ok(Self { model, samples })
    }

    /// The wrapped model.
    #[must_use]
    pub const fn model(&self) -> &M {
        &self.model
    }

    /// Resampled point count; feature vectors are twice this long.
    #[must_use]
    pub const fn samples(&self) -> usize {
        self.samples
    }
}

impl<M: FeatureModel> ShapeClassifier for FeatureClassifier<M> {
    fn classify(&self, curve: &Polyline) -> Result<ShapeLabel, ClassificationError> {
        let features = extract_features(curve, self.samples)?;
        self.model.predict(&features)
    }
}

/// One class of a [`CentroidModel`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelledCentroid {
    pub label: ShapeLabel,
    pub features: FeatureVector,
}

/// Nearest-centroid classifier over feature vectors.
///
/// Predicts the label of the closest centroid by Euclidean distance.
/// Ties go to the centroid listed first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CentroidModel {
    pub centroids: Vec<LabelledCentroid>,
}

impl CentroidModel {
    /// Fit one centroid per label as the mean of its samples.
    ///
    /// Labels keep the order of their first sample.
    ///
    /// # Errors
    ///
    /// Returns [`ClassificationError::DimensionMismatch`] if the samples
    /// do not all have the same length.
    pub fn fit<I>(samples: I) -> Result<Self, ClassificationError>
    where
        I: IntoIterator<Item = (ShapeLabel, FeatureVector)>,
    {
        let mut sums: Vec<(ShapeLabel, Vec<f64>, usize)> = Vec::new();
        let mut dimension: Option<usize> = None;

        for (label, features) in samples {
            let expected = *dimension.get_or_insert(features.len());
            if features.len() != expected {
                return Err(ClassificationError::DimensionMismatch {
                    expected,
                    actual: features.len(),
                });
            }
            if let Some((_, sum, count)) = sums.iter_mut().find(|(l, _, _)| *l == label) {
                for (s, v) in sum.iter_mut().zip(features.as_slice()) {
                    *s += v;
                }
                *count += 1;
            } else {
                sums.push((label, features.as_slice().to_vec(), 1));
            }
        }

        let centroids = sums
            .into_iter()
            .map(|(label, sum, count)| {
                #[allow(clippy::cast_precision_loss)]
                let n = count as f64;
                LabelledCentroid {
                    label,
                    features: FeatureVector::new(sum.into_iter().map(|s| s / n).collect()),
                }
            })
            .collect();
        Ok(Self { centroids })
    }
}

impl FeatureModel for CentroidModel {
    fn predict(&self, features: &FeatureVector) -> Result<ShapeLabel, ClassificationError> {
        let mut best: Option<(&LabelledCentroid, f64)> = None;
        for centroid in &self.centroids {
            if centroid.features.len() != features.len() {
                return Err(ClassificationError::DimensionMismatch {
                    expected: centroid.features.len(),
                    actual: features.len(),
                });
            }
            let d = centroid.features.distance(features);
            if best.is_none_or(|(_, best_d)| d < best_d) {
                best = Some((centroid, d));
            }
        }
        best.map(|(c, _)| c.label.clone())
            .ok_or(ClassificationError::ModelNotFitted)
    }
}

/// Selects which classifier the pipeline runs.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassifierKind {
    /// Vertex-count and circularity heuristics on the curve geometry.
    Heuristic(PolygonHeuristic),
    /// Nearest-centroid model over feature vectors.
    Centroid(FeatureClassifier<CentroidModel>),
}

impl ShapeClassifier for ClassifierKind {
    fn classify(&self, curve: &Polyline) -> Result<ShapeLabel, ClassificationError> {
        match self {
            Self::Heuristic(h) => h.classify(curve),
            Self::Centroid(c) => c.classify(curve),
        }
    }

    fn classify_with_fit(&self, curve: &Polyline) -> Result<Classification, ClassificationError> {
        match self {
            Self::Heuristic(h) => h.classify_with_fit(curve),
            Self::Centroid(c) => c.classify_with_fit(curve),
        }
    }
}
