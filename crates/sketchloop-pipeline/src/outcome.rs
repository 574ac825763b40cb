//! Batch results of one stitching run.
//!
//! Every discovered curve gets its own outcome carrying either its data
//! or the error that made it unusable, so one bad curve never hides the
//! others. Fragments that ended up in no curve are reported as
//! unassigned groups.

use std::collections::BTreeMap;

use petgraph::unionfind::UnionFind;
use serde::{Deserialize, Serialize};

use crate::classify::{ShapeFit, ShapeLabel};
use crate::graph::{EdgeKind, EndpointGraph};
use crate::regularize::RegularizedShape;
use crate::types::{ClassificationError, CurveError, FragmentId, FragmentSet, NodeId, Polyline};

/// A reconstructed closed curve with its classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosedCurve {
    /// Stitched points, in traversal order.
    pub curve: Polyline,
    /// Label from the classifier, or why it could not label the curve.
    pub label: Result<ShapeLabel, ClassificationError>,
    /// Ideal circle or approximated polygon behind the label, when the
    /// classifier derives one.
    pub fit: Option<ShapeFit>,
    /// Idealized polygon, for labels selected for regularization.
    pub regularized: Option<RegularizedShape>,
}

/// Outcome of one discovered cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosedCurveOutcome {
    pub fragments: FragmentSet,
    pub nodes: Vec<NodeId>,
    pub result: Result<ClosedCurve, CurveError>,
}

/// Outcome of one discovered open path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenCurveOutcome {
    pub fragments: FragmentSet,
    pub nodes: Vec<NodeId>,
    pub result: Result<Polyline, CurveError>,
}

/// Fragments in no closed or open curve, connected through proximity
/// edges among themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnassignedGroup {
    pub fragments: FragmentSet,
}

/// Everything a run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StitchResult {
    /// One entry per distinct cycle, in discovery order.
    pub closed: Vec<ClosedCurveOutcome>,
    /// One entry per distinct open path, in discovery order.
    pub open: Vec<OpenCurveOutcome>,
    /// Leftover fragments, ordered by their smallest id.
    pub unassigned: Vec<UnassignedGroup>,
    /// Whether the depth bound cut any search short.
    pub truncated: bool,
}

impl StitchResult {
    /// Successfully reconstructed closed curves.
    pub fn closed_curves(&self) -> impl Iterator<Item = &ClosedCurve> {
        self.closed.iter().filter_map(|o| o.result.as_ref().ok())
    }

    /// Successfully reconstructed open curves.
    pub fn open_curves(&self) -> impl Iterator<Item = &Polyline> {
        self.open.iter().filter_map(|o| o.result.as_ref().ok())
    }

    /// Classified closed curves keyed by label.
    ///
    /// Curves that failed reconstruction or classification are left
    /// out.
    #[must_use]
    pub fn closed_by_label(&self) -> BTreeMap<ShapeLabel, Vec<&ClosedCurve>> {
        let mut by_label: BTreeMap<ShapeLabel, Vec<&ClosedCurve>> = BTreeMap::new();
        for curve in self.closed_curves() {
            if let Ok(label) = &curve.label {
                by_label.entry(label.clone()).or_default().push(curve);
            }
        }
        by_label
    }

    /// Number of curves that failed reconstruction.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.closed.iter().filter(|o| o.result.is_err()).count()
            + self.open.iter().filter(|o| o.result.is_err()).count()
    }
}

/// Group the fragments not covered by any of `covered` into connected
/// components over the proximity edges of `graph`.
#[must_use]
pub fn group_unassigned<'a, I>(graph: &EndpointGraph, covered: I) -> Vec<UnassignedGroup>
where
    I: IntoIterator<Item = &'a FragmentSet>,
{
    let fragment_count = graph.node_count() / 2;
    let mut assigned = vec![false; fragment_count];
    for set in covered {
        for id in set.iter() {
            if let Some(slot) = assigned.get_mut(id) {
                *slot = true;
            }
        }
    }

    let mut components = UnionFind::<FragmentId>::new(fragment_count);
    for node in 0..graph.node_count() {
        let a = EndpointGraph::fragment_of(node);
        if assigned[a] {
            continue;
        }
        for entry in graph.neighbors(node) {
            if entry.kind == EdgeKind::Proximity && !assigned[entry.fragment] {
                components.union(a, entry.fragment);
            }
        }
    }

    let mut groups: BTreeMap<FragmentId, Vec<FragmentId>> = BTreeMap::new();
    for id in (0..fragment_count).filter(|&id| !assigned[id]) {
        groups.entry(components.find(id)).or_default().push(id);
    }
    let mut groups: Vec<UnassignedGroup> = groups
        .into_values()
        .map(|ids| UnassignedGroup {
            fragments: ids.into_iter().collect(),
        })
        .collect();
    groups.sort_by_key(|g| g.fragments.iter().next());
    groups
}
