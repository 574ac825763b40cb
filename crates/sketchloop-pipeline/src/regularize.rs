//! Regularization: replace a hand-drawn closed curve with an idealized
//! polygon through its corners.
//!
//! Corners are expressed in their own principal axes, which aligns a
//! sketched rectangle with the coordinate axes, and the convex hull of
//! the projected corners becomes the polygon.

use geo::{ConvexHull, MultiPoint};
use serde::{Deserialize, Serialize};

use crate::corners::CornerDetector;
use crate::pca::PcaFrame;
use crate::types::{Point, Polyline};

/// An idealized polygon in the PCA frame of the corners it came from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegularizedShape {
    /// Hull vertices in hull order, first vertex repeated at the end.
    /// Empty when fewer than three usable corners were found.
    pub vertices: Vec<Point>,
    /// Frame mapping `vertices` back to sketch coordinates.
    pub frame: Option<PcaFrame>,
}

impl RegularizedShape {
    /// Returns `true` if no polygon could be formed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Number of distinct polygon vertices.
    #[must_use]
    pub const fn corner_count(&self) -> usize {
        self.vertices.len().saturating_sub(1)
    }

    /// The polygon in the original sketch coordinates.
    #[must_use]
    pub fn to_sketch(&self) -> Vec<Point> {
        self.frame.map_or_else(Vec::new, |frame| {
            self.vertices.iter().map(|&q| frame.unproject(q)).collect()
        })
    }
}

/// Build the regularized polygon of `corners`.
///
/// Fewer than three corners, or corners that are all collinear, yield
/// an empty shape.
#[must_use]
pub fn regularize_corners(corners: &[Point]) -> RegularizedShape {
    if corners.len() < 3 {
        return RegularizedShape::default();
    }
    let Some(frame) = PcaFrame::fit(corners) else {
        return RegularizedShape::default();
    };
    // No spread across the minor axis: the corners are collinear.
    if frame.variances[1] <= 1e-12 * frame.variances[0] {
        return RegularizedShape::default();
    }

    let projected: MultiPoint<f64> = corners
        .iter()
        .map(|&p| {
            let q = frame.project(p);
            geo::Point::new(q.x, q.y)
        })
        .collect();
    let hull = projected.convex_hull();
    let vertices: Vec<Point> = hull
        .exterior()
        .coords()
        .map(|c| Point::new(c.x, c.y))
        .collect();

    // A closed ring around a real area has at least 4 coordinates.
    if vertices.len() < 4 {
        return RegularizedShape::default();
    }
    RegularizedShape {
        vertices,
        frame: Some(frame),
    }
}

/// Detect the corners of `curve` and regularize them.
#[must_use]
pub fn regularize_curve(curve: &Polyline, detector: &dyn CornerDetector) -> RegularizedShape {
    let corners = detector.corners(curve);
    regularize_corners(&corners)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
mod tests {
    use super::*;
    use crate::corners::StructureTensorCorners;

    fn angle_at(prev: Point, at: Point, next: Point) -> f64 {
        let (ax, ay) = (prev.x - at.x, prev.y - at.y);
        let (bx, by) = (next.x - at.x, next.y - at.y);
        let cos = ax.mul_add(bx, ay * by) / (ax.hypot(ay) * bx.hypot(by));
        cos.clamp(-1.0, 1.0).acos().to_degrees()
    }

    fn rotated_rect(w: f64, h: f64, degrees: f64) -> Vec<Point> {
        let (s, c) = degrees.to_radians().sin_cos();
        [(0.0, 0.0), (w, 0.0), (w, h), (0.0, h)]
            .into_iter()
            .map(|(x, y)| Point::new(x.mul_add(c, -(y * s)) + 10.0, x.mul_add(s, y * c) + 20.0))
            .collect()
    }

    #[test]
    fn too_few_corners_is_empty() {
        assert!(regularize_corners(&[]).is_empty());
        assert!(regularize_corners(&[Point::new(0.0, 0.0), Point::new(1.0, 1.0)]).is_empty());
    }

    #[test]
    fn collinear_corners_are_empty() {
        let pts = [Point::new(0.0, 0.0), Point::new(1.0, 1.0), Point::new(2.0, 2.0)];
        assert!(regularize_corners(&pts).is_empty());
    }

    #[test]
    fn rotated_rectangle_becomes_axis_aligned() {
        let shape = regularize_corners(&rotated_rect(80.0, 40.0, 30.0));
        assert_eq!(shape.vertices.len(), 5);
        assert_eq!(shape.corner_count(), 4);
        assert_eq!(shape.vertices.first(), shape.vertices.last());
        for v in &shape.vertices {
            assert!((v.x.abs() - 40.0).abs() < 1e-6, "{v:?}");
            assert!((v.y.abs() - 20.0).abs() < 1e-6, "{v:?}");
        }
    }

    #[test]
    fn rectangle_angles_are_right() {
        let shape = regularize_corners(&rotated_rect(60.0, 25.0, -15.0));
        let ring = &shape.vertices[..shape.vertices.len() - 1];
        for i in 0..ring.len() {
            let prev = ring[(i + ring.len() - 1) % ring.len()];
            let next = ring[(i + 1) % ring.len()];
            assert!((angle_at(prev, ring[i], next) - 90.0).abs() < 1e-6);
        }
    }

    #[test]
    fn interior_corner_is_dropped_by_hull() {
        let mut pts = rotated_rect(80.0, 40.0, 0.0);
        pts.push(Point::new(50.0, 40.0));
        assert_eq!(regularize_corners(&pts).corner_count(), 4);
    }

    #[test]
    fn maps_back_to_sketch_coordinates() {
        let rect = rotated_rect(80.0, 40.0, 30.0);
        let shape = regularize_corners(&rect);
        for p in shape.to_sketch() {
            assert!(rect.iter().any(|r| r.distance(p) < 1e-6), "{p:?}");
        }
    }

    #[test]
    fn clean_rectangle_curve_regularizes_to_right_angles() {
        let corners = rotated_rect(120.0, 60.0, 25.0);
        // Sample each side every 5 units, closing back on the first corner.
        let mut outline = Vec::new();
        for i in 0..4 {
            let (a, b) = (corners[i], corners[(i + 1) % 4]);
            let steps = (a.distance(b) / 5.0).round();
            for s in 0..steps as u32 {
                let t = f64::from(s) / steps;
                outline.push(Point::new(t.mul_add(b.x - a.x, a.x), t.mul_add(b.y - a.y, a.y)));
            }
        }
        outline.push(corners[0]);

        let shape = regularize_curve(
            &Polyline::new(outline),
            &StructureTensorCorners::default(),
        );
        assert_eq!(shape.corner_count(), 4, "{shape:?}");
        assert_eq!(shape.vertices.first(), shape.vertices.last());
        let ring = &shape.vertices[..4];
        for i in 0..4 {
            let angle = angle_at(ring[(i + 3) % 4], ring[i], ring[(i + 1) % 4]);
            assert!((angle - 90.0).abs() < 1e-6, "corner {i} is {angle} degrees");
        }
        for p in shape.to_sketch() {
            assert!(corners.iter().any(|c| c.distance(p) < 1e-6), "{p:?}");
        }
    }

    #[test]
    fn curve_pipeline_from_detector() {
        let mut outline = rotated_rect(80.0, 40.0, 0.0);
        outline.push(outline[0]);
        let shape = regularize_curve(
            &Polyline::new(outline),
            &StructureTensorCorners::default(),
        );
        assert_eq!(shape.corner_count(), 4);
    }
}
