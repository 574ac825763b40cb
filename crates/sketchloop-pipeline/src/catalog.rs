//! Deduplicated collections of discovered curves.
//!
//! Both enumerators find the same curve many times (from every start
//! node, in both directions). A [`CurveCatalog`] keeps the first
//! traversal found for each distinct [`FragmentSet`] and drops the rest.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::types::{FragmentSet, NodeId};

/// One distinct curve: the fragments it uses and a representative node
/// traversal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredCurve {
    /// Fragments the curve walks along.
    pub fragments: FragmentSet,
    /// First traversal found. Closed curves repeat the start node at
    /// the end.
    pub nodes: Vec<NodeId>,
}

/// Curves keyed by fragment set, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurveCatalog {
    curves: Vec<DiscoveredCurve>,
    #[serde(skip)]
    seen: HashSet<FragmentSet>,
    truncated: bool,
}

impl CurveCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a curve unless its fragment set is empty or already known.
    ///
    /// Returns `true` if the curve was added.
    pub fn insert(&mut self, fragments: FragmentSet, nodes: Vec<NodeId>) -> bool {
        if fragments.is_empty() || self.seen.contains(&fragments) {
            return false;
        }
        self.seen.insert(fragments.clone());
        self.curves.push(DiscoveredCurve { fragments, nodes });
        true
    }

    /// Whether a curve over exactly these fragments has been recorded.
    #[must_use]
    pub fn contains(&self, fragments: &FragmentSet) -> bool {
        self.seen.contains(fragments)
    }

    /// Note that the depth bound cut at least one search short.
    pub const fn mark_truncated(&mut self) {
        self.truncated = true;
    }

    /// Whether the depth bound cut any search short, in which case some
    /// curves may be missing.
    #[must_use]
    pub const fn truncated(&self) -> bool {
        self.truncated
    }

    /// Number of distinct curves.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.curves.len()
    }

    /// Returns `true` if nothing was recorded.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }

    /// Curves in discovery order.
    #[must_use]
    pub fn curves(&self) -> &[DiscoveredCurve] {
        &self.curves
    }

    /// Consume the catalog, returning the curves in discovery order.
    #[must_use]
    pub fn into_curves(self) -> Vec<DiscoveredCurve> {
        self.curves
    }
}
