use crate::strain::{EdgeRole, StrainId, StrainRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A parent→child relation materialized in the visible graph. Identity is
/// the (source, target) pair; the role is carried metadata, not identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineageEdge {
    pub source: StrainId,
    pub target: StrainId,
    #[serde(default)]
    pub role: EdgeRole,
}

impl LineageEdge {
    pub fn new(source: &str, target: &str, role: EdgeRole) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
            role,
        }
    }

    pub fn same_pair(&self, source: &str, target: &str) -> bool {
        self.source == source && self.target == target
    }
}

/// Which records are currently revealed, which edges run between them, and
/// which record (if any) is the focal selection. Mutated only through the
/// operations below; all of them are total and duplicate-safe.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphState {
    pub loaded: HashSet<StrainId>,
    pub edges: Vec<LineageEdge>,
    pub focal: Option<StrainId>,
}

impl GraphState {
    pub fn is_loaded(&self, id: &str) -> bool {
        self.loaded.contains(id)
    }

    /// Idempotent; re-adding a loaded record changes nothing.
    pub fn add_node(&mut self, record: &StrainRecord) {
        self.loaded.insert(record.id.clone());
    }

    /// Deduplicated by (source, target). Endpoints are not validated here;
    /// callers add nodes before their incident edges within one batch.
    pub fn add_edge(&mut self, edge: LineageEdge) {
        if !self.has_edge(&edge.source, &edge.target) {
            self.edges.push(edge);
        }
    }

    pub fn has_edge(&self, source: &str, target: &str) -> bool {
        self.edges.iter().any(|e| e.same_pair(source, target))
    }

    /// Wholesale replacement of the materialized view; clears the focal
    /// selection.
    pub fn reset(&mut self, loaded: HashSet<StrainId>, edges: Vec<LineageEdge>) {
        self.loaded = loaded;
        self.edges = edges;
        self.focal = None;
    }

    pub fn node_count(&self) -> usize {
        self.loaded.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Every edge endpoint must be a loaded node. Holds after any sequence
    /// of operations as long as callers add nodes before edges.
    pub fn has_dangling_edges(&self) -> bool {
        self.edges
            .iter()
            .any(|e| !self.is_loaded(&e.source) || !self.is_loaded(&e.target))
    }
}
