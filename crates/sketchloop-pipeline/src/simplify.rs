//! Polygon approximation of closed curves using the Ramer-Douglas-Peucker
//! algorithm.
//!
//! A closed curve has no natural endpoints, so it is split at two
//! anchors: the first point and the point farthest from it. Each half is
//! simplified as an open chain and the kept points are returned as the
//! polygon's vertices, without repeating the first.

use crate::types::Point;

/// Approximate the closed curve through `points` with a polygon.
///
/// Points within `tolerance` of the chord between their kept neighbors
/// are dropped. A trailing point equal to the first is ignored. Curves
/// with fewer than 3 distinct points are returned unchanged.
#[must_use = "returns the polygon vertices"]
pub fn approximate_closed(points: &[Point], tolerance: f64) -> Vec<Point> {
    let points = match points {
        [first, rest @ .., last] if first == last && !rest.is_empty() => &points[..points.len() - 1],
        _ => points,
    };
    if points.len() < 3 {
        return points.to_vec();
    }

    let first = points[0];
    let far = points
        .iter()
        .enumerate()
        .skip(1)
        .max_by(|(_, a), (_, b)| first.distance_squared(**a).total_cmp(&first.distance_squared(**b)))
        .map_or(1, |(i, _)| i);

    // Second half runs from the far anchor back around to the first point.
    let mut ring: Vec<Point> = points.to_vec();
    ring.push(first);
    let end = ring.len() - 1;

    let mut kept = vec![false; ring.len()];
    kept[0] = true;
    kept[far] = true;
    rdp_recurse(&ring, 0, far, tolerance, &mut kept);
    rdp_recurse(&ring, far, end, tolerance, &mut kept);

    ring[..end]
        .iter()
        .zip(&kept)
        .filter(|&(_, k)| *k)
        .map(|(&p, _)| p)
        .collect()
}

/// Recursive step of the Ramer-Douglas-Peucker algorithm.
///
/// Finds the point between `start` and `end` that is farthest from the
/// line segment between them. If that distance exceeds `tolerance`, the
/// point is kept and both sub-segments are processed recursively.
fn rdp_recurse(points: &[Point], start: usize, end: usize, tolerance: f64, kept: &mut [bool]) {
    if end <= start + 1 {
        return;
    }

    let mut max_dist = 0.0;
    let mut max_idx = start;

    for i in (start + 1)..end {
        let d = perpendicular_distance(points[i], points[start], points[end]);
        if d > max_dist {
            max_dist = d;
            max_idx = i;
        }
    }

    if max_dist > tolerance {
        kept[max_idx] = true;
        rdp_recurse(points, start, max_idx, tolerance, kept);
        rdp_recurse(points, max_idx, end, tolerance, kept);
    }
}

/// Perpendicular distance from point `p` to the line defined by `a` and `b`.
///
/// When `a` and `b` coincide, returns the distance from `p` to `a`.
fn perpendicular_distance(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let length_sq = dx.mul_add(dx, dy * dy);

    if length_sq == 0.0 {
        return p.distance(a);
    }

    let cross = dx.mul_add(a.y - p.y, -(dy * (a.x - p.x)));
    cross.abs() / length_sq.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(coords: &[(f64, f64)]) -> Vec<Point> {
        coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    /// Square outline with extra points along each side.
    fn dense_square() -> Vec<Point> {
        let mut out = Vec::new();
        for i in 0..10 {
            out.push(Point::new(f64::from(i) * 10.0, 0.0));
        }
        for i in 0..10 {
            out.push(Point::new(100.0, f64::from(i) * 10.0));
        }
        for i in 0..10 {
            out.push(Point::new(100.0 - f64::from(i) * 10.0, 100.0));
        }
        for i in 0..10 {
            out.push(Point::new(0.0, 100.0 - f64::from(i) * 10.0));
        }
        out
    }

    #[test]
    fn short_input_unchanged() {
        let p = pts(&[(0.0, 0.0), (1.0, 1.0)]);
        assert_eq!(approximate_closed(&p, 1.0), p);
        assert!(approximate_closed(&[], 1.0).is_empty());
    }

    #[test]
    fn square_collapses_to_four_corners() {
        let poly = approximate_closed(&dense_square(), 4.0);
        assert_eq!(poly.len(), 4);
        for corner in pts(&[(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)]) {
            assert!(poly.contains(&corner), "missing {corner:?}");
        }
    }

    #[test]
    fn repeated_closing_point_is_ignored() {
        let mut square = dense_square();
        square.push(square[0]);
        assert_eq!(approximate_closed(&square, 4.0).len(), 4);
    }

    #[test]
    fn small_bumps_within_tolerance_dropped() {
        let p = pts(&[
            (0.0, 0.0),
            (50.0, 0.5),
            (100.0, 0.0),
            (100.0, 100.0),
            (50.0, 99.5),
            (0.0, 100.0),
        ]);
        assert_eq!(approximate_closed(&p, 2.0).len(), 4);
        assert_eq!(approximate_closed(&p, 0.1).len(), 6);
    }

    #[test]
    fn perpendicular_distance_diagonal_segment() {
        let d = perpendicular_distance(
            Point::new(2.0, -1.0),
            Point::new(0.0, 0.0),
            Point::new(4.0, 2.0),
        );
        let expected = 8.0 / 20.0_f64.sqrt();
        assert!((d - expected).abs() < 1e-10, "got {d}, expected {expected}");
    }

    #[test]
    fn perpendicular_distance_coincident_endpoints() {
        let d = perpendicular_distance(
            Point::new(3.0, 4.0),
            Point::new(0.0, 0.0),
            Point::new(0.0, 0.0),
        );
        assert!((d - 5.0).abs() < 1e-10);
    }
}
