//! Open curve enumeration: chains of fragments between dead ends.
//!
//! Searches start only at nodes with a single adjacency entry (an
//! endpoint touching no other fragment). The search never steps back
//! along the edge it arrived by and records a path when it reaches a
//! node with nowhere else to go, provided that last step is at least ε
//! long. The length test discards chains that end on a near-zero hop,
//! such as a single stroke drawn as a closed loop.
//!
//! As with cycles, a path's fragment set holds the fragments walked
//! along their own edge; proximity hops add nothing.
//!
//! Each open chain is found once from each of its two dead ends; the
//! [`CurveCatalog`] keeps the first.

use crate::catalog::CurveCatalog;
use crate::graph::{EdgeKind, EndpointGraph};
use crate::types::{FragmentId, FragmentSet, NodeId};

#[derive(Debug, Clone, Copy)]
struct Frame {
    node: NodeId,
    parent: Option<NodeId>,
    /// Fragment walked to reach this node (`None` for the start and
    /// for proximity hops).
    via: Option<FragmentId>,
    cursor: usize,
    /// Whether any neighbor other than the parent exists.
    has_forward: bool,
}

/// Find all distinct open curves in `graph`.
///
/// `max_depth` bounds the number of nodes on a search path; see
/// [`find_cycles`](crate::cycles::find_cycles).
#[must_use]
pub fn find_open_paths(graph: &EndpointGraph, max_depth: Option<usize>) -> CurveCatalog {
    let mut catalog = CurveCatalog::new();
    let mut visited = vec![false; graph.node_count()];
    let mut stack: Vec<Frame> = Vec::new();

    let starts: Vec<NodeId> = graph.dead_ends().collect();
    for start in starts {
        search_from(graph, start, max_depth, &mut visited, &mut stack, &mut catalog);
    }

    tracing::debug!(
        paths = catalog.len(),
        truncated = catalog.truncated(),
        "enumerated open curves"
    );
    catalog
}

fn search_from(
    graph: &EndpointGraph,
    start: NodeId,
    max_depth: Option<usize>,
    visited: &mut [bool],
    stack: &mut Vec<Frame>,
    catalog: &mut CurveCatalog,
) {
    visited[start] = true;
    stack.push(Frame {
        node: start,
        parent: None,
        via: None,
        cursor: 0,
        has_forward: false,
    });

    while let Some(top) = stack.last_mut() {
        let node = top.node;
        let parent = top.parent;
        let cursor = top.cursor;
        top.cursor += 1;

        let Some(&entry) = graph.neighbors(node).get(cursor) else {
            let is_end = !top.has_forward;
            if is_end
                && let Some(parent) = parent
                && !graph.within_tolerance(parent, node)
            {
                let fragments: FragmentSet = stack.iter().filter_map(|f| f.via).collect();
                let nodes: Vec<NodeId> = stack.iter().map(|f| f.node).collect();
                catalog.insert(fragments, nodes);
            }
            visited[node] = false;
            stack.pop();
            continue;
        };

        if Some(entry.neighbor) == parent {
            continue;
        }
        top.has_forward = true;

        if !visited[entry.neighbor] {
            if max_depth.is_some_and(|max| stack.len() >= max) {
                catalog.mark_truncated();
                continue;
            }
            visited[entry.neighbor] = true;
            stack.push(Frame {
                node: entry.neighbor,
                parent: Some(node),
                via: (entry.kind == EdgeKind::Own).then_some(entry.fragment),
                cursor: 0,
                has_forward: false,
            });
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{FragmentStore, Point, Polyline};

    fn graph(fragments: &[&[(f64, f64)]], tolerance: f64) -> EndpointGraph {
        let store = FragmentStore::new(
            fragments
                .iter()
                .map(|pts| Polyline::new(pts.iter().map(|&(x, y)| Point::new(x, y)).collect()))
                .collect(),
        )
        .unwrap();
        EndpointGraph::build(&store, tolerance)
    }

    #[test]
    fn isolated_fragment_is_one_path() {
        let g = graph(&[&[(0.0, 0.0), (5.0, 5.0), (30.0, 0.0)]], 5.0);
        let paths = find_open_paths(&g, None);
        assert_eq!(paths.len(), 1);
        assert_eq!(paths.curves()[0].fragments, [0].into_iter().collect());
        assert_eq!(paths.curves()[0].nodes, vec![0, 1]);
    }

    #[test]
    fn l_shape_is_one_path_over_both_fragments() {
        let g = graph(
            &[&[(0.0, 0.0), (0.0, 50.0)], &[(1.0, 51.0), (50.0, 50.0)]],
            5.0,
        );
        let paths = find_open_paths(&g, None);
        assert_eq!(paths.len(), 1);
        assert_eq!(paths.curves()[0].fragments, [0, 1].into_iter().collect());
        assert_eq!(paths.curves()[0].nodes, vec![0, 1, 2, 3]);
    }

    #[test]
    fn path_endpoints_are_dead_ends() {
        let g = graph(
            &[
                &[(0.0, 0.0), (0.0, 50.0)],
                &[(1.0, 51.0), (50.0, 50.0)],
                &[(52.0, 49.0), (90.0, 10.0)],
                &[(300.0, 300.0), (320.0, 300.0)],
            ],
            5.0,
        );
        let paths = find_open_paths(&g, None);
        assert_eq!(paths.len(), 2);
        for path in paths.curves() {
            let first = *path.nodes.first().unwrap();
            let last = *path.nodes.last().unwrap();
            assert_eq!(g.degree(first), 1);
            assert_eq!(g.degree(last), 1);
        }
    }

    #[test]
    fn closed_single_stroke_is_not_a_path() {
        let g = graph(
            &[&[(0.0, 0.0), (20.0, 0.0), (20.0, 20.0), (0.0, 2.0)]],
            5.0,
        );
        assert!(find_open_paths(&g, None).is_empty());
    }

    #[test]
    fn closed_square_has_no_dead_ends() {
        let g = graph(
            &[
                &[(0.0, 0.0), (100.0, 0.0)],
                &[(101.0, 1.0), (101.0, 100.0)],
                &[(100.0, 101.0), (0.0, 101.0)],
                &[(-1.0, 100.0), (0.0, 1.0)],
            ],
            5.0,
        );
        assert_eq!(g.dead_ends().count(), 0);
        assert!(find_open_paths(&g, None).is_empty());
    }

    #[test]
    fn y_junction_yields_a_path_per_pair_of_arms() {
        // Three arms meeting near the origin.
        let g = graph(
            &[
                &[(-50.0, 0.0), (0.0, 0.0)],
                &[(1.0, 0.0), (50.0, 0.0)],
                &[(0.0, 1.0), (0.0, 50.0)],
            ],
            5.0,
        );
        let paths = find_open_paths(&g, None);
        let sets: Vec<FragmentSet> = paths.curves().iter().map(|p| p.fragments.clone()).collect();
        assert_eq!(sets.len(), 3);
        assert!(sets.contains(&[0, 1].into_iter().collect()));
        assert!(sets.contains(&[0, 2].into_iter().collect()));
        assert!(sets.contains(&[1, 2].into_iter().collect()));
    }

    #[test]
    fn depth_bound_truncates() {
        let g = graph(
            &[&[(0.0, 0.0), (0.0, 50.0)], &[(1.0, 51.0), (50.0, 50.0)]],
            5.0,
        );
        let paths = find_open_paths(&g, Some(2));
        assert!(paths.truncated());
    }
}
