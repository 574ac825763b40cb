//! Corner detection on closed curves.
//!
//! [`CornerDetector`] is the seam for pluggable detectors.
//! [`StructureTensorCorners`] is the default: it densifies the curve to
//! an even spacing, scores every sample with a Harris-style response
//! computed from the tangent directions around it, and keeps the
//! strongest separated peaks.
//!
//! The response at a sample is `det(M) - κ·trace(M)²` where `M` is the
//! mean outer product of the unit tangents in a window of `window`
//! segments on each side. Along a straight run every tangent is the
//! same, `det(M)` vanishes and the response is negative. At a right
//! angle the tangents split evenly between two directions and `det(M)`
//! peaks at 0.25.

use crate::types::{CornerConfig, Point, Polyline};

/// Trait for corner detection strategies.
pub trait CornerDetector {
    /// Corner points of `curve`, treated as a closed ring, in curve
    /// order. May be empty.
    fn corners(&self, curve: &Polyline) -> Vec<Point>;
}

/// Harris-style corner detector over the curve's tangent field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructureTensorCorners {
    config: CornerConfig,
}

impl StructureTensorCorners {
    #[must_use]
    pub const fn new(config: CornerConfig) -> Self {
        Self { config }
    }

    /// Response value of every sample of the densified ring.
    fn responses(&self, samples: &[Point]) -> Vec<f64> {
        let n = samples.len();
        let tangents: Vec<Point> = (0..n)
            .map(|i| unit(samples[i], samples[(i + 1) % n]))
            .collect();
        let w = self.config.window.min(n / 2).max(1);

        (0..n)
            .map(|i| {
                let (mut xx, mut xy, mut yy) = (0.0, 0.0, 0.0);
                for k in 0..2 * w {
                    // Segments i-w .. i+w-1, wrapping around the ring.
                    let t = tangents[(i + n + k - w) % n];
                    xx += t.x * t.x;
                    xy += t.x * t.y;
                    yy += t.y * t.y;
                }
                #[allow(clippy::cast_precision_loss)]
                let count = (2 * w) as f64;
                let (xx, xy, yy) = (xx / count, xy / count, yy / count);
                let det = xx.mul_add(yy, -(xy * xy));
                let trace = xx + yy;
                (self.config.harris_k * trace).mul_add(-trace, det)
            })
            .collect()
    }
}

impl CornerDetector for StructureTensorCorners {
    fn corners(&self, curve: &Polyline) -> Vec<Point> {
        let samples = densify_ring(curve.points(), self.config.spacing);
        if samples.len() < 3 {
            return Vec::new();
        }
        let responses = self.responses(&samples);
        let peaks = pick_peaks(
            &responses,
            self.config.threshold_rel,
            self.config.min_distance,
        );
        tracing::trace!(samples = samples.len(), corners = peaks.len(), "detected corners");
        peaks.into_iter().map(|i| samples[i]).collect()
    }
}

/// Upper bound on the interpolated samples of one densified ring.
const MAX_RING_SAMPLES: f64 = 65_536.0;

/// Resample the closed ring through `points` so consecutive samples are
/// at most `spacing` apart. Original vertices are kept; repeated points
/// are dropped.
///
/// The spacing is widened when the ring would need more than
/// `MAX_RING_SAMPLES` interpolated samples.
fn densify_ring(points: &[Point], spacing: f64) -> Vec<Point> {
    let m = points.len();
    let perimeter: f64 = (0..m).map(|i| points[i].distance(points[(i + 1) % m])).sum();
    let spacing = spacing.max(perimeter / MAX_RING_SAMPLES);
    let mut out: Vec<Point> = Vec::with_capacity(m);
    for i in 0..m {
        let (a, b) = (points[i], points[(i + 1) % m]);
        if out.last() != Some(&a) {
            out.push(a);
        }
        let len = a.distance(b);
        if len <= spacing {
            continue;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let steps = (len / spacing).ceil() as u32;
        for s in 1..steps {
            let t = f64::from(s) / f64::from(steps);
            out.push(Point::new(t.mul_add(b.x - a.x, a.x), t.mul_add(b.y - a.y, a.y)));
        }
    }
    while out.len() > 1 && out.first() == out.last() {
        out.pop();
    }
    out
}

/// Indices of response peaks, in ascending order.
///
/// A peak is positive, at least `threshold_rel` times the strongest
/// response, and no closer than `min_distance` samples (around the
/// ring) to a stronger accepted peak.
fn pick_peaks(responses: &[f64], threshold_rel: f64, min_distance: usize) -> Vec<usize> {
    let n = responses.len();
    let max = responses.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max <= 0.0 {
        return Vec::new();
    }
    let floor = threshold_rel * max;

    let mut candidates: Vec<usize> = (0..n)
        .filter(|&i| responses[i] > 0.0 && responses[i] >= floor)
        .collect();
    candidates.sort_by(|&a, &b| responses[b].total_cmp(&responses[a]).then(a.cmp(&b)));

    let mut accepted: Vec<usize> = Vec::new();
    for i in candidates {
        let separated = accepted.iter().all(|&j| {
            let d = i.abs_diff(j);
            d.min(n - d) > min_distance
        });
        if separated {
            accepted.push(i);
        }
    }
    accepted.sort_unstable();
    accepted
}

fn unit(a: Point, b: Point) -> Point {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len = dx.hypot(dy);
    if len > 0.0 {
        Point::new(dx / len, dy / len)
    } else {
        Point::new(0.0, 0.0)
    }
}
