//! Closed curve enumeration: depth-first search for fragment loops.
//!
//! Every node gets a turn as the start of a search. The search walks
//! the endpoint graph without revisiting nodes already on the current
//! path and records a cycle whenever it can step back onto the start
//! node. Two closures are recognized:
//!
//! - **Two-node closure.** The path is exactly `[start, partner]` and
//!   the fragment's own endpoints lie within ε: a single fragment drawn
//!   as a closed loop.
//! - **General closure.** A neighbor of the current node is the start
//!   node and the path holds more than two nodes.
//!
//! A cycle's fragment set contains every fragment walked along an own
//! edge, including the closing step. Proximity hops contribute nothing.
//!
//! The search keeps its state in an explicit frame stack. Each frame
//! owns its neighbor cursor and is popped (unmarking its node) once its
//! neighbors are exhausted, so no two searches see each other's state.

use crate::catalog::CurveCatalog;
use crate::graph::{EdgeKind, EndpointGraph};
use crate::types::{FragmentSet, NodeId};

/// One level of the depth-first search.
#[derive(Debug, Clone, Copy)]
struct Frame {
    node: NodeId,
    /// Index of the next adjacency entry to try.
    cursor: usize,
    /// Kind of edge used to reach this node (`None` for the start).
    arrived_by: Option<EdgeKind>,
}

/// Find all distinct closed curves in `graph`.
///
/// `max_depth` bounds the number of nodes on a search path. Searches
/// that hit the bound are cut short and the returned catalog is marked
/// [`truncated`](CurveCatalog::truncated). `None` runs the unbounded
/// search.
#[must_use]
pub fn find_cycles(graph: &EndpointGraph, max_depth: Option<usize>) -> CurveCatalog {
    let mut catalog = CurveCatalog::new();
    let mut visited = vec![false; graph.node_count()];
    let mut stack: Vec<Frame> = Vec::new();

    for start in 0..graph.node_count() {
        search_from(graph, start, max_depth, &mut visited, &mut stack, &mut catalog);
    }

    tracing::debug!(
        cycles = catalog.len(),
        truncated = catalog.truncated(),
        "enumerated closed curves"
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
        cursor: 0,
        arrived_by: None,
    });

    while let Some(top) = stack.last_mut() {
        let node = top.node;
        let cursor = top.cursor;
        top.cursor += 1;

        let Some(&entry) = graph.neighbors(node).get(cursor) else {
            visited[node] = false;
            stack.pop();
            continue;
        };

        if cursor == 0 && stack.len() == 2 {
            let first = stack[0].node;
            if EndpointGraph::are_partners(first, node) && graph.within_tolerance(first, node) {
                let fragments: FragmentSet =
                    std::iter::once(EndpointGraph::fragment_of(first)).collect();
                catalog.insert(fragments, vec![first, node, start]);
            }
        }

        if entry.neighbor == start && stack.len() > 2 {
            let mut fragments: FragmentSet = stack
                .iter()
                .filter(|f| f.arrived_by == Some(EdgeKind::Own))
                .map(|f| EndpointGraph::fragment_of(f.node))
                .collect();
            if entry.kind == EdgeKind::Own {
                fragments = fragments
                    .iter()
                    .chain(std::iter::once(EndpointGraph::fragment_of(start)))
                    .collect();
            }
            let mut nodes: Vec<NodeId> = stack.iter().map(|f| f.node).collect();
            nodes.push(start);
            catalog.insert(fragments, nodes);
        } else if !visited[entry.neighbor] {
            if max_depth.is_some_and(|max| stack.len() >= max) {
                catalog.mark_truncated();
                continue;
            }
            visited[entry.neighbor] = true;
            stack.push(Frame {
                node: entry.neighbor,
                cursor: 0,
                arrived_by: Some(entry.kind),
            });
        }
    }
}
