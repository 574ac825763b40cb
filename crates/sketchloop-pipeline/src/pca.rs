//! Two-component principal component analysis for planar point sets.
//!
//! In two dimensions the covariance matrix is 2×2, so the eigen
//! decomposition has a closed form and no linear algebra crate is
//! needed. Component signs are normalized so each axis' largest
//! absolute coordinate is positive, which makes projections
//! deterministic.

use serde::{Deserialize, Serialize};

use crate::types::Point;

/// Below this magnitude the covariance is treated as diagonal.
const OFF_DIAGONAL_EPSILON: f64 = 1e-12;

/// Principal axes of a point set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PcaFrame {
    /// Centroid of the fitted points.
    pub mean: Point,
    /// Unit principal axes, major first.
    pub axes: [Point; 2],
    /// Population variance along each axis, major first.
    pub variances: [f64; 2],
}

impl PcaFrame {
    /// Fit the frame to `points`. Returns `None` for an empty slice.
    #[must_use]
    pub fn fit(points: &[Point]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        #[allow(clippy::cast_precision_loss)]
        let n = points.len() as f64;
        let mean = Point::new(
            points.iter().map(|p| p.x).sum::<f64>() / n,
            points.iter().map(|p| p.y).sum::<f64>() / n,
        );

        let (mut sxx, mut sxy, mut syy) = (0.0, 0.0, 0.0);
        for p in points {
            let dx = p.x - mean.x;
            let dy = p.y - mean.y;
            sxx += dx * dx;
            sxy += dx * dy;
            syy += dy * dy;
        }
        let (a, b, c) = (sxx / n, sxy / n, syy / n);

        let half_trace = (a + c) / 2.0;
        let spread = ((a - c) / 2.0).hypot(b);
        let major = half_trace + spread;
        let minor = (half_trace - spread).max(0.0);

        let first = if b.abs() > OFF_DIAGONAL_EPSILON {
            normalize(Point::new(major - c, b))
        } else if a >= c {
            Point::new(1.0, 0.0)
        } else {
            Point::new(0.0, 1.0)
        };
        let first = orient(first);
        let second = orient(Point::new(-first.y, first.x));

        Some(Self {
            mean,
            axes: [first, second],
            variances: [major, minor],
        })
    }

    /// Coordinates of `p` in this frame.
    #[must_use]
    pub fn project(&self, p: Point) -> Point {
        let dx = p.x - self.mean.x;
        let dy = p.y - self.mean.y;
        Point::new(
            dx.mul_add(self.axes[0].x, dy * self.axes[0].y),
            dx.mul_add(self.axes[1].x, dy * self.axes[1].y),
        )
    }

    /// Map frame coordinates back to the original space.
    #[must_use]
    pub fn unproject(&self, q: Point) -> Point {
        Point::new(
            q.x.mul_add(self.axes[0].x, q.y.mul_add(self.axes[1].x, self.mean.x)),
            q.x.mul_add(self.axes[0].y, q.y.mul_add(self.axes[1].y, self.mean.y)),
        )
    }
}

fn normalize(v: Point) -> Point {
    let len = v.x.hypot(v.y);
    Point::new(v.x / len, v.y / len)
}

/// Flip `v` so its largest-magnitude coordinate is positive.
fn orient(v: Point) -> Point {
    let dominant = if v.x.abs() >= v.y.abs() { v.x } else { v.y };
    if dominant < 0.0 {
        Point::new(-v.x, -v.y)
    } else {
        v
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn close(a: Point, b: Point) -> bool {
        a.distance(b) < 1e-9
    }

    #[test]
    fn empty_has_no_frame() {
        assert!(PcaFrame::fit(&[]).is_none());
    }

    #[test]
    fn axis_aligned_spread() {
        let pts = [
            Point::new(-10.0, -1.0),
            Point::new(10.0, -1.0),
            Point::new(10.0, 1.0),
            Point::new(-10.0, 1.0),
        ];
        let frame = PcaFrame::fit(&pts).unwrap();
        assert!(close(frame.mean, Point::new(0.0, 0.0)));
        assert!(close(frame.axes[0], Point::new(1.0, 0.0)));
        assert!(close(frame.axes[1], Point::new(0.0, 1.0)));
        assert!((frame.variances[0] - 100.0).abs() < 1e-9);
        assert!((frame.variances[1] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn diagonal_line_major_axis() {
        let pts: Vec<Point> = (0..10)
            .map(|i| Point::new(f64::from(i), f64::from(i)))
            .collect();
        let frame = PcaFrame::fit(&pts).unwrap();
        let s = std::f64::consts::FRAC_1_SQRT_2;
        assert!(close(frame.axes[0], Point::new(s, s)));
        assert!(frame.variances[1].abs() < 1e-9);
    }

    #[test]
    fn project_unproject_inverse() {
        let pts = [
            Point::new(3.0, 1.0),
            Point::new(7.0, 4.0),
            Point::new(-2.0, 5.0),
            Point::new(0.0, -3.0),
        ];
        let frame = PcaFrame::fit(&pts).unwrap();
        for p in pts {
            assert!(close(frame.unproject(frame.project(p)), p));
        }
    }
}
