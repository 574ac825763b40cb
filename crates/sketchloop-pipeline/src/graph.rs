//! Endpoint graph: one node per fragment endpoint, edges for fragments
//! and for endpoint proximity.
//!
//! Node `2i` is the start of fragment `i` and node `2i + 1` its end, so
//! the partner of a node is `node ^ 1`. Every node carries an [`Own`]
//! edge to its partner. A [`Proximity`] edge joins two endpoints of
//! *different* fragments whose distance is strictly below the endpoint
//! tolerance ε; it carries the neighbor's fragment id.
//!
//! Candidate pairs come from an R\*-tree range query and are then
//! filtered with the strict `<` test, which produces exactly the edge
//! set of the pairwise `O(F²)` comparison.
//!
//! [`Own`]: EdgeKind::Own
//! [`Proximity`]: EdgeKind::Proximity

use rstar::RTree;
use rstar::primitives::GeomWithData;
use serde::{Deserialize, Serialize};

use crate::types::{FragmentId, FragmentStore, NodeId, Point};

/// How an adjacency entry came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeKind {
    /// The fragment itself, joining its two endpoints.
    Own,
    /// Two endpoints of distinct fragments lying within ε.
    Proximity,
}

/// One outgoing edge of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjacencyEntry {
    /// The node on the other side.
    pub neighbor: NodeId,
    /// Whether this edge walks a fragment or hops across a gap.
    pub kind: EdgeKind,
    /// The neighbor's fragment (for own edges, the shared fragment).
    pub fragment: FragmentId,
}

/// An endpoint of a fragment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EndpointNode {
    /// This node's id.
    pub id: NodeId,
    /// Coordinates of the endpoint.
    pub point: Point,
    /// Fragment owning the endpoint.
    pub fragment: FragmentId,
    /// The other endpoint of the same fragment.
    pub partner: NodeId,
}

/// Endpoint adjacency graph built from a [`FragmentStore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointGraph {
    nodes: Vec<EndpointNode>,
    adjacency: Vec<Vec<AdjacencyEntry>>,
    tolerance: f64,
}

/// Endpoint coordinates tagged with their node id for R\*-tree lookup.
type IndexedEndpoint = GeomWithData<[f64; 2], NodeId>;

impl EndpointGraph {
    /// Build the graph for `store` with proximity threshold `tolerance`.
    ///
    /// Each node's entries are ordered own edge first, then proximity
    /// neighbors by ascending node id.
    #[must_use]
    pub fn build(store: &FragmentStore, tolerance: f64) -> Self {
        let nodes: Vec<EndpointNode> = store
            .fragments()
            .iter()
            .flat_map(|fragment| {
                let start = 2 * fragment.id();
                [
                    EndpointNode {
                        id: start,
                        point: fragment.start_point(),
                        fragment: fragment.id(),
                        partner: start + 1,
                    },
                    EndpointNode {
                        id: start + 1,
                        point: fragment.end_point(),
                        fragment: fragment.id(),
                        partner: start,
                    },
                ]
            })
            .collect();

        let tree = RTree::bulk_load(
            nodes
                .iter()
                .map(|n| IndexedEndpoint::new([n.point.x, n.point.y], n.id))
                .collect(),
        );

        let max_distance_2 = tolerance * tolerance;
        let adjacency = nodes
            .iter()
            .map(|node| {
                let mut entries = vec![AdjacencyEntry {
                    neighbor: node.partner,
                    kind: EdgeKind::Own,
                    fragment: node.fragment,
                }];

                let mut near: Vec<NodeId> = tree
                    .locate_within_distance([node.point.x, node.point.y], max_distance_2)
                    .map(|candidate| candidate.data)
                    .filter(|&other| {
                        let other = &nodes[other];
                        other.fragment != node.fragment
                            && node.point.distance(other.point) < tolerance
                    })
                    .collect();
                near.sort_unstable();

                entries.extend(near.into_iter().map(|neighbor| AdjacencyEntry {
                    neighbor,
                    kind: EdgeKind::Proximity,
                    fragment: nodes[neighbor].fragment,
                }));
                entries
            })
            .collect();

        let graph = Self {
            nodes,
            adjacency,
            tolerance,
        };
        tracing::debug!(
            nodes = graph.node_count(),
            proximity_edges = graph.proximity_edge_count(),
            tolerance,
            "built endpoint graph"
        );
        graph
    }

    /// The partner of `node`: the other endpoint of the same fragment.
    #[must_use]
    pub const fn partner_of(node: NodeId) -> NodeId {
        node ^ 1
    }

    /// The fragment owning `node`.
    #[must_use]
    pub const fn fragment_of(node: NodeId) -> FragmentId {
        node / 2
    }

    /// Whether `a` and `b` are the two endpoints of one fragment.
    #[must_use]
    pub const fn are_partners(a: NodeId, b: NodeId) -> bool {
        Self::partner_of(a) == b
    }

    /// Proximity threshold the graph was built with.
    #[must_use]
    pub const fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Number of endpoint nodes (always twice the fragment count).
    #[must_use]
    pub const fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// All nodes in id order.
    #[must_use]
    pub fn nodes(&self) -> &[EndpointNode] {
        &self.nodes
    }

    /// Look up a node.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&EndpointNode> {
        self.nodes.get(id)
    }

    /// Coordinates of a node.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of range.
    #[must_use]
    pub fn point(&self, id: NodeId) -> Point {
        self.nodes[id].point
    }

    /// Outgoing edges of a node.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of range.
    #[must_use]
    pub fn neighbors(&self, id: NodeId) -> &[AdjacencyEntry] {
        &self.adjacency[id]
    }

    /// Number of adjacency entries of a node (its own edge included).
    #[must_use]
    pub fn degree(&self, id: NodeId) -> usize {
        self.adjacency[id].len()
    }

    /// Euclidean distance between two nodes' points.
    #[must_use]
    pub fn distance(&self, a: NodeId, b: NodeId) -> f64 {
        self.point(a).distance(self.point(b))
    }

    /// Whether two nodes lie strictly within the graph's tolerance.
    #[must_use]
    pub fn within_tolerance(&self, a: NodeId, b: NodeId) -> bool {
        self.distance(a, b) < self.tolerance
    }

    /// Number of directed proximity entries (each undirected proximity
    /// edge counts twice).
    #[must_use]
    pub fn proximity_edge_count(&self) -> usize {
        self.adjacency
            .iter()
            .flatten()
            .filter(|e| e.kind == EdgeKind::Proximity)
            .count()
    }

    /// Nodes with exactly one adjacency entry: fragment endpoints that
    /// touch no other fragment.
    pub fn dead_ends(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.node_count()).filter(|&n| self.degree(n) == 1)
    }
}
