//! Polygon heuristic classifier.
//!
//! Labels a closed curve by counting the vertices of its polygon
//! approximation, with circle detection for many-vertex curves. Needs no
//! trained model, so it is the default classifier of the CLI.
//!
//! Decision order:
//!
//! 1. Enclosed area below `min_area` → unidentified.
//! 2. Approximate with tolerance `coarse_fraction × perimeter`.
//! 3. Seven or more vertices: a circle if the area is close to that of
//!    the minimum enclosing circle, otherwise unidentified.
//! 4. Fewer: re-approximate with `fine_fraction × perimeter` and map the
//!    vertex count to a polygon label. Seven-vertex and ten-vertex
//!    results are rejected when their perimeter/area ratio is too high.
//!
//! Recognized curves carry their ideal shape as a [`ShapeFit`]: the
//! enclosing circle for round curves found in step 3, the approximated
//! polygon for everything labelled in step 4.

use std::f64::consts::PI;

use geo::{Area, Coord, LineString, Polygon};

use crate::classify::{Classification, ShapeClassifier, ShapeFit, ShapeLabel};
use crate::simplify::approximate_closed;
use crate::types::{ClassificationError, HeuristicConfig, Point, Polyline};

/// Vertex-count shape classifier over raw curve geometry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolygonHeuristic {
    config: HeuristicConfig,
}

impl PolygonHeuristic {
    #[must_use]
    pub const fn new(config: HeuristicConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &HeuristicConfig {
        &self.config
    }

    fn label_many_vertices(&self, points: &[Point], area: f64, perimeter: f64) -> Classification {
        if let Some(circle) = min_enclosing_circle(points) {
            let circle_area = PI * circle.radius * circle.radius;
            if (area - circle_area).abs() < self.config.circle_area_tolerance * circle_area {
                return Classification {
                    label: ShapeLabel::Circle,
                    fit: Some(ShapeFit::Circle {
                        center: circle.center,
                        radius: circle.radius,
                    }),
                };
            }
        }
        let circularity = 4.0 * PI * area / (perimeter * perimeter);
        let (low, high) = self.config.circularity_band;
        tracing::trace!(
            circularity,
            in_band = low < circularity && circularity < high,
            "many-vertex curve is not a circle"
        );
        ShapeLabel::Unidentified.into()
    }

    fn label_by_vertices(&self, vertices: usize, area: f64, perimeter: f64) -> ShapeLabel {
        let ratio = perimeter / area;
        match vertices {
            3 => ShapeLabel::Triangle,
            4 => ShapeLabel::Rectangle,
            5 => ShapeLabel::Pentagon,
            6 => ShapeLabel::Hexagon,
            7 if ratio <= self.config.heptagon_max_perimeter_ratio => ShapeLabel::Heptagon,
            8 => ShapeLabel::Octagon,
            9 => ShapeLabel::Nonagon,
            10 if ratio <= self.config.decagon_max_perimeter_ratio => ShapeLabel::Circle,
            _ => ShapeLabel::Unidentified,
        }
    }
}

impl ShapeClassifier for PolygonHeuristic {
    fn classify(&self, curve: &Polyline) -> Result<ShapeLabel, ClassificationError> {
        self.classify_with_fit(curve).map(|c| c.label)
    }

    fn classify_with_fit(&self, curve: &Polyline) -> Result<Classification, ClassificationError> {
        let points = curve.points();
        if points.len() < 3 {
            return Err(ClassificationError::TooFewPoints(points.len()));
        }

        let area = enclosed_area(points);
        if area < self.config.min_area {
            return Ok(ShapeLabel::Unidentified.into());
        }
        let perimeter = closed_perimeter(points);

        let coarse = approximate_closed(points, self.config.coarse_fraction * perimeter);
        if coarse.len() >= 7 {
            return Ok(self.label_many_vertices(points, area, perimeter));
        }

        let fine = approximate_closed(points, self.config.fine_fraction * perimeter);
        let label = self.label_by_vertices(fine.len(), area, perimeter);
        let fit = (label != ShapeLabel::Unidentified).then(|| ShapeFit::Polygon { vertices: fine });
        Ok(Classification { label, fit })
    }
}

/// Area enclosed by the curve, treating it as a closed ring.
fn enclosed_area(points: &[Point]) -> f64 {
    let ring: LineString<f64> = points.iter().map(|p| Coord { x: p.x, y: p.y }).collect();
    Polygon::new(ring, vec![]).unsigned_area()
}

/// Length of the curve including the closing segment.
fn closed_perimeter(points: &[Point]) -> f64 {
    let open: f64 = points.windows(2).map(|w| w[0].distance(w[1])).sum();
    match (points.first(), points.last()) {
        (Some(&first), Some(&last)) => open + last.distance(first),
        _ => open,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Circle {
    center: Point,
    radius: f64,
}

impl Circle {
    fn contains(&self, p: Point) -> bool {
        p.distance(self.center) <= self.radius.mul_add(1.0 + 1e-12, 1e-9)
    }

    fn from_two(a: Point, b: Point) -> Self {
        let center = Point::new(f64::midpoint(a.x, b.x), f64::midpoint(a.y, b.y));
        Self {
            center,
            radius: a.distance(b) / 2.0,
        }
    }

    fn from_three(a: Point, b: Point, c: Point) -> Self {
        let d = 2.0 * (a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y));
        if d.abs() < 1e-12 {
            // Collinear: the widest pair spans the other point.
            return [Self::from_two(a, b), Self::from_two(a, c), Self::from_two(b, c)]
                .into_iter()
                .max_by(|l, r| l.radius.total_cmp(&r.radius))
                .unwrap_or_else(|| Self::from_two(a, b));
        }
        let a2 = a.x.mul_add(a.x, a.y * a.y);
        let b2 = b.x.mul_add(b.x, b.y * b.y);
        let c2 = c.x.mul_add(c.x, c.y * c.y);
        let center = Point::new(
            (a2 * (b.y - c.y) + b2 * (c.y - a.y) + c2 * (a.y - b.y)) / d,
            (a2 * (c.x - b.x) + b2 * (a.x - c.x) + c2 * (b.x - a.x)) / d,
        );
        Self {
            center,
            radius: center.distance(a),
        }
    }
}

/// Smallest circle containing every point, by Welzl's incremental
/// algorithm.
///
/// Points are visited in a fixed pseudo-random order; curve points
/// arrive in angular order, which is the worst case for the incremental
/// construction.
fn min_enclosing_circle(points: &[Point]) -> Option<Circle> {
    let shuffled = shuffled(points);
    let (&first, _) = shuffled.split_first()?;
    let mut circle = Circle {
        center: first,
        radius: 0.0,
    };

    for (i, &p) in shuffled.iter().enumerate().skip(1) {
        if circle.contains(p) {
            continue;
        }
        circle = Circle {
            center: p,
            radius: 0.0,
        };
        for (j, &q) in shuffled[..i].iter().enumerate() {
            if circle.contains(q) {
                continue;
            }
            circle = Circle::from_two(p, q);
            for &r in &shuffled[..j] {
                if !circle.contains(r) {
                    circle = Circle::from_three(p, q, r);
                }
            }
        }
    }
    Some(circle)
}

/// Fisher-Yates shuffle driven by a fixed-seed xorshift generator.
fn shuffled(points: &[Point]) -> Vec<Point> {
    let mut out = points.to_vec();
    let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
    for i in (1..out.len()).rev() {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        #[allow(clippy::cast_possible_truncation)]
        let j = (state % (i as u64 + 1)) as usize;
        out.swap(i, j);
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    /// Densify a closed polygon so each side carries `per_side` points.
    fn outline(corners: &[(f64, f64)], per_side: u32) -> Polyline {
        let mut points = Vec::new();
        for (i, &(ax, ay)) in corners.iter().enumerate() {
            let (bx, by) = corners[(i + 1) % corners.len()];
            for s in 0..per_side {
                let t = f64::from(s) / f64::from(per_side);
                points.push(Point::new(t.mul_add(bx - ax, ax), t.mul_add(by - ay, ay)));
            }
        }
        Polyline::new(points)
    }

    fn circle(radius: f64, n: u32) -> Polyline {
        Polyline::new(
            (0..n)
                .map(|i| {
                    let a = 2.0 * PI * f64::from(i) / f64::from(n);
                    Point::new(radius * a.cos() + 200.0, radius * a.sin() + 200.0)
                })
                .collect(),
        )
    }

    fn classify(curve: &Polyline) -> ShapeLabel {
        PolygonHeuristic::default().classify(curve).unwrap()
    }

    #[test]
    fn square_is_rectangle() {
        let square = outline(&[(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)], 10);
        assert_eq!(classify(&square), ShapeLabel::Rectangle);
    }

    #[test]
    fn triangle_is_triangle() {
        let tri = outline(&[(0.0, 0.0), (100.0, 0.0), (50.0, 80.0)], 10);
        assert_eq!(classify(&tri), ShapeLabel::Triangle);
    }

    #[test]
    fn pentagon_is_pentagon() {
        let corners: Vec<(f64, f64)> = (0..5)
            .map(|i| {
                let a = 2.0 * PI * f64::from(i) / 5.0;
                (100.0 * a.cos(), 100.0 * a.sin())
            })
            .collect();
        assert_eq!(classify(&outline(&corners, 10)), ShapeLabel::Pentagon);
    }

    #[test]
    fn round_curve_is_circle() {
        assert_eq!(classify(&circle(50.0, 100)), ShapeLabel::Circle);
    }

    #[test]
    fn circle_fit_reports_center_and_radius() {
        let fit = PolygonHeuristic::default()
            .classify_with_fit(&circle(50.0, 100))
            .unwrap();
        assert_eq!(fit.label, ShapeLabel::Circle);
        let Some(ShapeFit::Circle { center, radius }) = fit.fit else {
            panic!("expected a circle fit, got {:?}", fit.fit);
        };
        assert!(center.distance(Point::new(200.0, 200.0)) < 1e-6, "{center:?}");
        assert!((radius - 50.0).abs() < 1e-6, "{radius}");
    }

    #[test]
    fn polygon_fit_reports_approximated_vertices() {
        let corners = [(0.0, 0.0), (100.0, 0.0), (50.0, 80.0)];
        let fit = PolygonHeuristic::default()
            .classify_with_fit(&outline(&corners, 10))
            .unwrap();
        assert_eq!(fit.label, ShapeLabel::Triangle);
        let Some(ShapeFit::Polygon { vertices }) = &fit.fit else {
            panic!("expected a polygon fit, got {:?}", fit.fit);
        };
        assert_eq!(vertices.len(), 3);
        for (x, y) in corners {
            assert!(vertices.contains(&Point::new(x, y)), "missing corner ({x}, {y})");
        }
    }

    #[test]
    fn unidentified_curve_has_no_fit() {
        let speck = outline(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)], 3);
        let fit = PolygonHeuristic::default().classify_with_fit(&speck).unwrap();
        assert_eq!(fit, Classification::from(ShapeLabel::Unidentified));
    }

    #[test]
    fn tiny_curve_is_unidentified() {
        let speck = outline(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)], 3);
        assert_eq!(classify(&speck), ShapeLabel::Unidentified);
    }

    #[test]
    fn two_points_is_error() {
        let curve = Polyline::new(vec![Point::new(0.0, 0.0), Point::new(5.0, 5.0)]);
        assert_eq!(
            PolygonHeuristic::default().classify(&curve),
            Err(ClassificationError::TooFewPoints(2))
        );
    }

    #[test]
    fn enclosed_area_of_unclosed_square() {
        let pts = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ];
        assert!((enclosed_area(&pts) - 100.0).abs() < 1e-9);
        assert!((closed_perimeter(&pts) - 40.0).abs() < 1e-9);
    }

    #[test]
    fn enclosing_circle_of_square() {
        let pts = [
            Point::new(0.0, 0.0),
            Point::new(2.0, 0.0),
            Point::new(2.0, 2.0),
            Point::new(0.0, 2.0),
            Point::new(1.0, 1.0),
        ];
        let c = min_enclosing_circle(&pts).unwrap();
        assert!(c.center.distance(Point::new(1.0, 1.0)) < 1e-9);
        assert!((c.radius - 2.0_f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn enclosing_circle_covers_all_points() {
        let curve = circle(30.0, 64);
        let c = min_enclosing_circle(curve.points()).unwrap();
        assert!((c.radius - 30.0).abs() < 1e-6);
        assert!(curve.points().iter().all(|&p| c.contains(p)));
    }

    #[test]
    fn enclosing_circle_collinear() {
        let pts = [Point::new(0.0, 0.0), Point::new(5.0, 0.0), Point::new(10.0, 0.0)];
        let c = min_enclosing_circle(&pts).unwrap();
        assert!((c.radius - 5.0).abs() < 1e-9);
    }
}
