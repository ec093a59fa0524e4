use crate::catalog::StrainCatalog;
use crate::graph_state::{GraphState, LineageEdge};
use crate::strain::{Confidence, StrainId, StrainRecord};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayoutDirection {
    /// Parents ranked above their offspring (the source app's "BT" layout).
    AncestorsAbove,
    AncestorsBelow,
}

/// Layout parameters handed to the rendering collaborator with every
/// re-layout request. Opaque to the engine; defaults are the source app's
/// dagre settings. Sizing is always passed through here, never read from
/// ambient environment state.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub direction: LayoutDirection,
    pub node_spacing: f32,
    pub rank_spacing: f32,
    pub padding: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            direction: LayoutDirection::AncestorsAbove,
            node_spacing: 80.0,
            rank_spacing: 120.0,
            padding: 50.0,
        }
    }
}

/// The rendering collaborator. The engine calls `render` with each applied
/// delta, `layout` at most once per batch, `fit_view` after a reset, and
/// `selection_changed` whenever the focal record changes (with the full
/// record, verification payload included, for a detail panel).
///
/// All methods default to no-ops; the engine is fire-and-forget and never
/// depends on the collaborator having done anything.
pub trait LineageView {
    fn render(&mut self, _nodes_added: &[StrainRecord], _edges_added: &[LineageEdge]) {}
    fn layout(&mut self, _config: &LayoutConfig) {}
    fn fit_view(&mut self) {}
    fn selection_changed(&mut self, _selected: Option<&StrainRecord>) {}
}

/// A view that ignores every notification.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullView;

impl LineageView for NullView {}

/// Records every notification, making "layout settled" observable to tests
/// without any timing dependence.
#[derive(Clone, Debug, Default)]
pub struct RecordingView {
    pub rendered_nodes: Vec<StrainId>,
    pub rendered_edges: Vec<(StrainId, StrainId)>,
    pub render_calls: usize,
    pub layout_calls: usize,
    pub fit_view_calls: usize,
    pub selections: Vec<Option<StrainId>>,
}

impl LineageView for RecordingView {
    fn render(&mut self, nodes_added: &[StrainRecord], edges_added: &[LineageEdge]) {
        self.render_calls += 1;
        self.rendered_nodes
            .extend(nodes_added.iter().map(|n| n.id.clone()));
        self.rendered_edges.extend(
            edges_added
                .iter()
                .map(|e| (e.source.clone(), e.target.clone())),
        );
    }

    fn layout(&mut self, _config: &LayoutConfig) {
        self.layout_calls += 1;
    }

    fn fit_view(&mut self) {
        self.fit_view_calls += 1;
    }

    fn selection_changed(&mut self, selected: Option<&StrainRecord>) {
        self.selections.push(selected.map(|r| r.id.clone()));
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StrainSummary {
    pub id: StrainId,
    pub label: String,
    pub confidence: Confidence,
}

/// The header line of the source UI ("N strains loaded") plus a sorted
/// listing of the materialized records.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GraphSummary {
    pub strains_loaded: usize,
    pub edge_count: usize,
    pub focal: Option<StrainId>,
    pub strains: Vec<StrainSummary>,
}

pub fn summarize_graph(state: &GraphState, catalog: &StrainCatalog) -> GraphSummary {
    let mut strains: Vec<StrainSummary> = state
        .loaded
        .iter()
        .filter_map(|id| catalog.lookup(id))
        .map(|record| StrainSummary {
            id: record.id.clone(),
            label: record.label.clone(),
            confidence: record.confidence,
        })
        .collect();
    strains.sort_by(|a, b| a.id.cmp(&b.id));

    GraphSummary {
        strains_loaded: state.node_count(),
        edge_count: state.edge_count(),
        focal: state.focal.clone(),
        strains,
    }
}
