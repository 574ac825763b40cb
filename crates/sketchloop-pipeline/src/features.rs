//! Feature vectors for the shape classifier.
//!
//! A curve becomes a fixed-length vector in three steps:
//!
//! 1. Resample to `k` points evenly spaced by arc length, so the length
//!    no longer depends on how many points the fragments had.
//! 2. Standardize each axis to zero mean and unit variance. An axis
//!    with zero variance is only centered.
//! 3. Project onto the top two principal components and flatten
//!    row-major into `[c0, c1, c0, c1, ...]` of length `2k`.

use serde::{Deserialize, Serialize};

use crate::pca::PcaFrame;
use crate::types::{ClassificationError, MIN_FEATURE_SAMPLES, Point, Polyline};

/// Fixed-length numeric description of a curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    /// Wrap raw feature values.
    #[must_use]
    pub const fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    /// The flattened values.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Number of values.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the vector holds no values.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Euclidean distance to another vector of the same length.
    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        self.0
            .iter()
            .zip(&other.0)
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>()
            .sqrt()
    }
}

/// Build the feature vector of `curve` with `samples` resampled points.
///
/// # Errors
///
/// Returns [`ClassificationError::InvalidSampleCount`] if `samples` is
/// below [`MIN_FEATURE_SAMPLES`], and
/// [`ClassificationError::TooFewPoints`] if the curve has fewer than
/// three points.
pub fn extract_features(
    curve: &Polyline,
    samples: usize,
) -> Result<FeatureVector, ClassificationError> {
    if samples < MIN_FEATURE_SAMPLES {
        return Err(ClassificationError::InvalidSampleCount(samples));
    }
    if curve.len() < 3 {
        return Err(ClassificationError::TooFewPoints(curve.len()));
    }
    let resampled = resample_by_arc_length(curve.points(), samples);
    let standardized = standardize(&resampled);
    // Non-empty: `samples` is at least 3.
    let Some(frame) = PcaFrame::fit(&standardized) else {
        return Err(ClassificationError::InvalidSampleCount(samples));
    };

    let values = standardized
        .iter()
        .flat_map(|&p| {
            let q = frame.project(p);
            [q.x, q.y]
        })
        .collect();
    Ok(FeatureVector(values))
}

/// Resample `points` to `count` points spaced evenly along the curve,
/// including both ends.
///
/// A zero-length curve yields `count` copies of its first point.
#[must_use]
pub fn resample_by_arc_length(points: &[Point], count: usize) -> Vec<Point> {
    let Some(&first) = points.first() else {
        return Vec::new();
    };
    if count == 0 {
        return Vec::new();
    }

    let mut cumulative = Vec::with_capacity(points.len());
    let mut total = 0.0;
    cumulative.push(0.0);
    for w in points.windows(2) {
        total += w[0].distance(w[1]);
        cumulative.push(total);
    }
    if total <= 0.0 || count == 1 {
        return vec![first; count];
    }

    let mut out = Vec::with_capacity(count);
    let mut seg = 0;
    #[allow(clippy::cast_precision_loss)]
    let step = total / (count - 1) as f64;
    for j in 0..count {
        #[allow(clippy::cast_precision_loss)]
        let target = (step * j as f64).min(total);
        while seg + 2 < cumulative.len() && cumulative[seg + 1] < target {
            seg += 1;
        }
        let seg_len = cumulative[seg + 1] - cumulative[seg];
        let t = if seg_len > 0.0 {
            ((target - cumulative[seg]) / seg_len).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let (a, b) = (points[seg], points[seg + 1]);
        out.push(Point::new(
            t.mul_add(b.x - a.x, a.x),
            t.mul_add(b.y - a.y, a.y),
        ));
    }
    out
}

/// Shift each axis to zero mean and scale it to unit population
/// variance.
#[must_use]
pub fn standardize(points: &[Point]) -> Vec<Point> {
    if points.is_empty() {
        return Vec::new();
    }
    #[allow(clippy::cast_precision_loss)]
    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.x).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.y).sum::<f64>() / n;
    let std_x = (points.iter().map(|p| (p.x - mean_x).powi(2)).sum::<f64>() / n).sqrt();
    let std_y = (points.iter().map(|p| (p.y - mean_y).powi(2)).sum::<f64>() / n).sqrt();
    let scale = |s: f64| if s > 0.0 { s } else { 1.0 };
    let (sx, sy) = (scale(std_x), scale(std_y));

    points
        .iter()
        .map(|p| Point::new((p.x - mean_x) / sx, (p.y - mean_y) / sy))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn pl(points: &[(f64, f64)]) -> Polyline {
        Polyline::new(points.iter().map(|&(x, y)| Point::new(x, y)).collect())
    }

    #[test]
    fn resample_keeps_ends_and_spacing() {
        let pts = [Point::new(0.0, 0.0), Point::new(10.0, 0.0)];
        let out = resample_by_arc_length(&pts, 6);
        assert_eq!(out.len(), 6);
        for (j, p) in out.iter().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let expected = 2.0 * j as f64;
            assert!((p.x - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn resample_walks_corners() {
        let pts = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
        ];
        let out = resample_by_arc_length(&pts, 3);
        assert!(out[1].distance(Point::new(10.0, 0.0)) < 1e-9);
        assert!(out[2].distance(Point::new(10.0, 10.0)) < 1e-9);
    }

    #[test]
    fn resample_zero_length_curve() {
        let pts = [Point::new(3.0, 3.0), Point::new(3.0, 3.0)];
        assert_eq!(resample_by_arc_length(&pts, 4), vec![Point::new(3.0, 3.0); 4]);
    }

    #[test]
    fn standardize_zero_mean_unit_variance() {
        let pts = [
            Point::new(1.0, 10.0),
            Point::new(3.0, 10.0),
            Point::new(5.0, 10.0),
        ];
        let out = standardize(&pts);
        let mean: f64 = out.iter().map(|p| p.x).sum::<f64>() / 3.0;
        let var: f64 = out.iter().map(|p| p.x * p.x).sum::<f64>() / 3.0;
        assert!(mean.abs() < 1e-12);
        assert!((var - 1.0).abs() < 1e-12);
        // Constant axis is only centered.
        assert!(out.iter().all(|p| p.y.abs() < 1e-12));
    }

    #[test]
    fn feature_vector_has_fixed_length() {
        let small = pl(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]);
        let large = pl(&[
            (0.0, 0.0),
            (5.0, 0.0),
            (10.0, 0.0),
            (10.0, 5.0),
            (10.0, 10.0),
            (5.0, 10.0),
            (0.0, 10.0),
        ]);
        assert_eq!(extract_features(&small, 16).unwrap().len(), 32);
        assert_eq!(extract_features(&large, 16).unwrap().len(), 32);
    }

    #[test]
    fn features_are_scale_and_translation_invariant() {
        let a = pl(&[(0.0, 0.0), (40.0, 0.0), (40.0, 10.0), (0.0, 10.0), (0.0, 0.0)]);
        let b = pl(&[
            (100.0, 100.0),
            (180.0, 100.0),
            (180.0, 120.0),
            (100.0, 120.0),
            (100.0, 100.0),
        ]);
        let fa = extract_features(&a, 32).unwrap();
        let fb = extract_features(&b, 32).unwrap();
        assert!(fa.distance(&fb) < 1e-9);
    }

    #[test]
    fn zero_samples_is_invalid_sample_count() {
        let curve = pl(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]);
        assert_eq!(
            extract_features(&curve, 0),
            Err(ClassificationError::InvalidSampleCount(0))
        );
        assert_eq!(
            extract_features(&curve, 2),
            Err(ClassificationError::InvalidSampleCount(2))
        );
    }

    #[test]
    fn too_few_points() {
        let curve = pl(&[(0.0, 0.0), (1.0, 1.0)]);
        assert_eq!(
            extract_features(&curve, 8),
            Err(ClassificationError::TooFewPoints(2))
        );
    }
}
