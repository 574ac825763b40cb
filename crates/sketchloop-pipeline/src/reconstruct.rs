//! Curve reconstruction: stitch fragments along a node sequence into one
//! continuous point sequence.
//!
//! The node sequence alternates between walking a fragment (two
//! consecutive partner nodes) and hopping across a gap (a proximity
//! edge). Each walked fragment is appended forward or reversed so that
//! it starts at the first node of its pair. Gap hops emit nothing; the
//! straight segment between the two fragments is implicit.

use crate::graph::EndpointGraph;
use crate::types::{CurveError, FragmentStore, NodeId, Point, Polyline};

/// Rebuild the curve described by `nodes`.
///
/// # Errors
///
/// Returns [`CurveError::Lookup`] if a partner pair refers to an
/// unknown node or its fragment's endpoints do not match the pair's
/// points. This only happens if `nodes` was not produced from a graph
/// built over `store`.
pub fn reconstruct_curve(
    nodes: &[NodeId],
    graph: &EndpointGraph,
    store: &FragmentStore,
) -> Result<Polyline, CurveError> {
    let total: usize = nodes
        .windows(2)
        .filter(|w| EndpointGraph::are_partners(w[0], w[1]))
        .filter_map(|w| store.get(EndpointGraph::fragment_of(w[0])))
        .map(|f| f.polyline().len())
        .sum();
    let mut points: Vec<Point> = Vec::with_capacity(total);

    let mut i = 0;
    while i + 1 < nodes.len() {
        let (from, to) = (nodes[i], nodes[i + 1]);
        if !EndpointGraph::are_partners(from, to) {
            i += 1;
            continue;
        }

        let lookup = CurveError::Lookup { from, to };
        let (Some(from_node), Some(to_node)) = (graph.node(from), graph.node(to)) else {
            return Err(lookup);
        };
        let fragment = store
            .get(EndpointGraph::fragment_of(from))
            .ok_or_else(|| lookup.clone())?;

        let (start, end) = (fragment.start_point(), fragment.end_point());
        let fragment_points = fragment.polyline().points();
        if start == from_node.point && end == to_node.point {
            points.extend_from_slice(fragment_points);
        } else if start == to_node.point && end == from_node.point {
            points.extend(fragment_points.iter().rev());
        } else {
            return Err(lookup);
        }
        i += 2;
    }

    Ok(Polyline::new(points))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn pl(points: &[(f64, f64)]) -> Polyline {
        Polyline::new(points.iter().map(|&(x, y)| Point::new(x, y)).collect())
    }

    fn setup(fragments: &[&[(f64, f64)]]) -> (FragmentStore, EndpointGraph) {
        let store = FragmentStore::new(fragments.iter().map(|f| pl(f)).collect()).unwrap();
        let graph = EndpointGraph::build(&store, 5.0);
        (store, graph)
    }

    #[test]
    fn isolated_fragment_reconstructs_forward() {
        let points: &[(f64, f64)] = &[(0.0, 0.0), (3.0, 7.0), (9.0, 2.0), (20.0, 20.0)];
        let (store, graph) = setup(&[points]);
        let curve = reconstruct_curve(&[0, 1], &graph, &store).unwrap();
        assert_eq!(curve, pl(points));
    }

    #[test]
    fn reversed_pair_reverses_fragment() {
        let (store, graph) = setup(&[&[(0.0, 0.0), (5.0, 1.0), (10.0, 0.0)]]);
        let curve = reconstruct_curve(&[1, 0], &graph, &store).unwrap();
        assert_eq!(curve, pl(&[(10.0, 0.0), (5.0, 1.0), (0.0, 0.0)]));
    }

    #[test]
    fn proximity_hops_emit_nothing() {
        // Second fragment is drawn against the direction of travel.
        let (store, graph) = setup(&[
            &[(0.0, 0.0), (0.0, 50.0)],
            &[(50.0, 50.0), (25.0, 52.0), (1.0, 51.0)],
        ]);
        let curve = reconstruct_curve(&[0, 1, 3, 2], &graph, &store).unwrap();
        assert_eq!(
            curve,
            pl(&[
                (0.0, 0.0),
                (0.0, 50.0),
                (1.0, 51.0),
                (25.0, 52.0),
                (50.0, 50.0),
            ])
        );
    }

    #[test]
    fn closed_sequence_starting_with_hop() {
        let (store, graph) = setup(&[
            &[(0.0, 0.0), (100.0, 0.0)],
            &[(101.0, 1.0), (101.0, 100.0)],
            &[(100.0, 101.0), (0.0, 101.0)],
            &[(-1.0, 100.0), (0.0, 1.0)],
        ]);
        // Start on the end of fragment 0, hop to fragment 1 first.
        let curve = reconstruct_curve(&[1, 2, 3, 4, 5, 6, 7, 0, 1], &graph, &store).unwrap();
        assert_eq!(curve.len(), 8);
        assert_eq!(curve.first(), Some(&Point::new(101.0, 1.0)));
        assert_eq!(curve.last(), Some(&Point::new(100.0, 0.0)));
    }

    #[test]
    fn unknown_node_is_lookup_error() {
        let (store, graph) = setup(&[&[(0.0, 0.0), (10.0, 0.0)]]);
        let result = reconstruct_curve(&[2, 3], &graph, &store);
        assert_eq!(result, Err(CurveError::Lookup { from: 2, to: 3 }));
    }

    #[test]
    fn mismatched_store_is_lookup_error() {
        let (_, graph) = setup(&[&[(0.0, 0.0), (10.0, 0.0)]]);
        let other = FragmentStore::new(vec![pl(&[(1.0, 1.0), (9.0, 9.0)])]).unwrap();
        let result = reconstruct_curve(&[0, 1], &graph, &other);
        assert_eq!(result, Err(CurveError::Lookup { from: 0, to: 1 }));
    }

    #[test]
    fn empty_sequence_is_empty_curve() {
        let (store, graph) = setup(&[&[(0.0, 0.0), (10.0, 0.0)]]);
        assert!(reconstruct_curve(&[], &graph, &store).unwrap().is_empty());
    }
}
