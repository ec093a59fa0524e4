use crate::catalog::StrainCatalog;
use crate::expansion::{expand, induced_edges};
use crate::graph_state::{GraphState, LineageEdge};
use crate::render::{LayoutConfig, LineageView};
use crate::strain::{StrainId, StrainRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub type EventId = String;
pub type SessionId = String;

/// External inputs to the engine, one at a time. `NodeSelected` focuses a
/// record and reveals its not-yet-loaded relatives; `BackgroundTapped`
/// clears the focal selection only; `ResetRequested` restores the canonical
/// initial view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SessionEvent {
    NodeSelected { id: StrainId },
    BackgroundTapped,
    ResetRequested,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionScript {
    pub session_id: SessionId,
    pub events: Vec<SessionEvent>,
}

/// What one event did. Every event is a total function: problems surface as
/// `warnings`, never as an error to the caller. `selected` carries the full
/// record, opaque verification payload included, for a detail panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventOutcome {
    pub event_id: EventId,
    pub focal: Option<StrainId>,
    pub selected: Option<StrainRecord>,
    pub nodes_added: Vec<StrainId>,
    pub edges_added: Vec<LineageEdge>,
    pub warnings: Vec<String>,
    pub messages: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    pub session_id: SessionId,
    pub event: SessionEvent,
    pub outcome: EventOutcome,
}

/// Session-start configuration: which ids are materialized at start (and
/// restored on reset), and the layout parameters passed through to the
/// rendering collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub initial: Vec<StrainId>,
    pub layout: LayoutConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            initial: vec!["dd".to_string(), "melon".to_string(), "sundae".to_string()],
            layout: LayoutConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capabilities {
    pub protocol_version: String,
    pub supported_events: Vec<String>,
    pub deterministic_event_log: bool,
}

pub trait Engine {
    fn apply(&mut self, event: SessionEvent, view: &mut dyn LineageView) -> EventOutcome;
    fn apply_script(&mut self, script: SessionScript, view: &mut dyn LineageView)
    -> Vec<EventOutcome>;
    fn snapshot(&self) -> &GraphState;
}

/// The selection state machine and reset controller in one place: owns the
/// graph state, drives the expansion resolver, journals every event, and
/// notifies the rendering collaborator at most once per applied batch.
#[derive(Debug, Clone)]
pub struct LineageEngine {
    catalog: StrainCatalog,
    layout: LayoutConfig,
    initial_loaded: HashSet<StrainId>,
    initial_edges: Vec<LineageEdge>,
    state: GraphState,
    journal: Vec<EventRecord>,
    event_counter: u64,
    construction_warnings: Vec<String>,
}

impl LineageEngine {
    /// Builds a session over an injected catalog. Initial ids that name no
    /// catalog record are dropped with a warning, so `loaded` is a subset
    /// of the catalog from the first moment on; the canonical initial view
    /// is computed once here and reused verbatim by every reset.
    pub fn new(catalog: StrainCatalog, config: SessionConfig) -> Self {
        let mut construction_warnings = vec![];
        let mut initial_ids: Vec<StrainId> = vec![];
        for id in &config.initial {
            if !catalog.contains(id) {
                construction_warnings.push(format!(
                    "Initial strain id '{id}' is not in the catalog and was dropped"
                ));
                continue;
            }
            if !initial_ids.contains(id) {
                initial_ids.push(id.clone());
            }
        }

        let initial_loaded: HashSet<StrainId> = initial_ids.iter().cloned().collect();
        let initial_edges = induced_edges(&initial_ids, &catalog);
        let mut state = GraphState::default();
        state.reset(initial_loaded.clone(), initial_edges.clone());

        Self {
            catalog,
            layout: config.layout,
            initial_loaded,
            initial_edges,
            state,
            journal: vec![],
            event_counter: 0,
            construction_warnings,
        }
    }

    pub fn with_builtin_catalog() -> Self {
        Self::new(StrainCatalog::default(), SessionConfig::default())
    }

    pub fn capabilities() -> Capabilities {
        Capabilities {
            protocol_version: "v1".to_string(),
            supported_events: vec![
                "NodeSelected".to_string(),
                "BackgroundTapped".to_string(),
                "ResetRequested".to_string(),
            ],
            deterministic_event_log: true,
        }
    }

    pub fn state(&self) -> &GraphState {
        &self.state
    }

    pub fn catalog(&self) -> &StrainCatalog {
        &self.catalog
    }

    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    pub fn event_log(&self) -> &[EventRecord] {
        &self.journal
    }

    pub fn construction_report(&self) -> &[String] {
        &self.construction_warnings
    }

    fn next_event_id(&mut self) -> EventId {
        self.event_counter += 1;
        format!("ev-{}", self.event_counter)
    }

    fn empty_outcome(&mut self) -> EventOutcome {
        EventOutcome {
            event_id: self.next_event_id(),
            focal: self.state.focal.clone(),
            selected: None,
            nodes_added: vec![],
            edges_added: vec![],
            warnings: vec![],
            messages: vec![],
        }
    }

    fn apply_internal(&mut self, event: SessionEvent, view: &mut dyn LineageView) -> EventOutcome {
        match event {
            SessionEvent::NodeSelected { id } => self.handle_select(&id, view),
            SessionEvent::BackgroundTapped => {
                let mut outcome = self.empty_outcome();
                self.state.focal = None;
                outcome.focal = None;
                outcome.messages.push("Selection cleared".to_string());
                view.selection_changed(None);
                outcome
            }
            SessionEvent::ResetRequested => {
                let mut outcome = self.empty_outcome();
                self.state
                    .reset(self.initial_loaded.clone(), self.initial_edges.clone());
                outcome.focal = None;
                outcome.messages.push(format!(
                    "Restored initial view ({} strains, {} edges)",
                    self.state.node_count(),
                    self.state.edge_count()
                ));
                view.layout(&self.layout);
                view.fit_view();
                view.selection_changed(None);
                outcome
            }
        }
    }

    fn handle_select(&mut self, id: &str, view: &mut dyn LineageView) -> EventOutcome {
        let mut outcome = self.empty_outcome();
        let Some(record) = self.catalog.lookup(id).cloned() else {
            // Non-fatal: focal and graph stay as they were, no view call.
            outcome
                .warnings
                .push(format!("Unknown strain id '{id}', selection ignored"));
            return outcome;
        };

        let delta = expand(id, &self.state, &self.catalog);
        for node in &delta.nodes {
            self.state.add_node(node);
        }
        for edge in &delta.edges {
            self.state.add_edge(edge.clone());
        }
        self.state.focal = Some(id.to_string());

        outcome.focal = Some(id.to_string());
        outcome.selected = Some(record.clone());
        outcome.nodes_added = delta.nodes.iter().map(|n| n.id.clone()).collect();
        outcome.edges_added = delta.edges.clone();
        for dangling in &delta.dangling {
            outcome.warnings.push(format!(
                "Skipped dangling reference '{dangling}' while expanding '{id}'"
            ));
        }
        if delta.is_empty() {
            outcome
                .messages
                .push(format!("Nothing new to reveal for '{id}'"));
        } else {
            outcome.messages.push(format!(
                "Revealed {} strains and {} edges for '{id}'",
                delta.nodes.len(),
                delta.edges.len()
            ));
            view.render(&delta.nodes, &delta.edges);
            view.layout(&self.layout);
        }
        // Re-selecting the focal record still re-notifies the detail panel;
        // a harmless re-entrant call the collaborator may use to re-center.
        view.selection_changed(Some(&record));
        outcome
    }
}

impl Engine for LineageEngine {
    fn apply(&mut self, event: SessionEvent, view: &mut dyn LineageView) -> EventOutcome {
        let session_id = "interactive".to_string();
        let outcome = self.apply_internal(event.clone(), view);
        self.journal.push(EventRecord {
            session_id,
            event,
            outcome: outcome.clone(),
        });
        outcome
    }

    fn apply_script(
        &mut self,
        script: SessionScript,
        view: &mut dyn LineageView,
    ) -> Vec<EventOutcome> {
        let mut outcomes = Vec::new();
        for event in &script.events {
            let outcome = self.apply_internal(event.clone(), view);
            self.journal.push(EventRecord {
                session_id: script.session_id.clone(),
                event: event.clone(),
                outcome: outcome.clone(),
            });
            outcomes.push(outcome);
        }
        outcomes
    }

    fn snapshot(&self) -> &GraphState {
        &self.state
    }
}
