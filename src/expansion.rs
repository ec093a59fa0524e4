use crate::catalog::StrainCatalog;
use crate::graph_state::{GraphState, LineageEdge};
use crate::strain::{EdgeRole, StrainId, StrainRecord};
use std::collections::HashSet;

/// What one expansion would add to the graph. `nodes` come before their
/// incident `edges` when applied; `dangling` lists referenced ids with no
/// catalog record, for a collaborator to log.
#[derive(Clone, Debug, Default)]
pub struct ExpansionDelta {
    pub nodes: Vec<StrainRecord>,
    pub edges: Vec<LineageEdge>,
    pub dangling: Vec<StrainId>,
}

impl ExpansionDelta {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

/// Computes the delta for focusing `focal_id`: not-yet-loaded parents first,
/// in declared order, then not-yet-loaded children. Pure; the caller applies
/// the result through `GraphState`.
///
/// Parent edges carry the focal record's declared role for that parent;
/// child edges are always `normal` (role metadata exists only on the parent
/// side of a record).
pub fn expand(focal_id: &str, state: &GraphState, catalog: &StrainCatalog) -> ExpansionDelta {
    let mut delta = ExpansionDelta::default();
    let Some(focal) = catalog.lookup(focal_id) else {
        return delta; // Unknown focal id, nothing to reveal.
    };

    // Ids appended in this batch count as loaded so one delta never carries
    // duplicate nodes or edges.
    let mut batch: HashSet<&str> = HashSet::new();
    if !state.is_loaded(focal_id) {
        // Focal records normally arrive loaded (selection happens on a
        // visible node), but an API caller can focus any catalog id; the
        // record itself leads the batch so no emitted edge can dangle.
        delta.nodes.push(focal.clone());
        batch.insert(focal_id);
    }

    for parent_id in &focal.parents {
        if state.is_loaded(parent_id) || batch.contains(parent_id.as_str()) {
            continue;
        }
        let Some(parent) = catalog.lookup(parent_id) else {
            delta.dangling.push(parent_id.clone());
            continue;
        };
        delta.nodes.push(parent.clone());
        batch.insert(parent_id);
        delta
            .edges
            .push(LineageEdge::new(parent_id, focal_id, focal.parent_role(parent_id)));
    }

    for child_id in &focal.children {
        if state.is_loaded(child_id) || batch.contains(child_id.as_str()) {
            continue;
        }
        let Some(child) = catalog.lookup(child_id) else {
            delta.dangling.push(child_id.clone());
            continue;
        };
        delta.nodes.push(child.clone());
        batch.insert(child_id);
        delta
            .edges
            .push(LineageEdge::new(focal_id, child_id, EdgeRole::Normal));
    }

    delta
}

/// Edges induced between the given ids by their declared relations, for the
/// canonical initial view. Parent edges first per member, declared order,
/// deduplicated by pair; same role rule as expansion.
pub fn induced_edges(ids: &[StrainId], catalog: &StrainCatalog) -> Vec<LineageEdge> {
    let members: HashSet<&str> = ids.iter().map(String::as_str).collect();
    let mut edges: Vec<LineageEdge> = vec![];
    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut push = |edges: &mut Vec<LineageEdge>, edge: LineageEdge| {
        if seen.insert((edge.source.clone(), edge.target.clone())) {
            edges.push(edge);
        }
    };

    for id in ids {
        let Some(record) = catalog.lookup(id) else {
            continue;
        };
        for parent_id in &record.parents {
            if members.contains(parent_id.as_str()) {
                push(
                    &mut edges,
                    LineageEdge::new(parent_id, id, record.parent_role(parent_id)),
                );
            }
        }
        for child_id in &record.children {
            if members.contains(child_id.as_str()) {
                push(&mut edges, LineageEdge::new(id, child_id, EdgeRole::Normal));
            }
        }
    }
    edges
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn catalog() -> StrainCatalog {
        StrainCatalog::default()
    }

    fn initial_state(ids: &[&str]) -> GraphState {
        let loaded: HashSet<String> = ids.iter().map(|s| s.to_string()).collect();
        let id_vec: Vec<String> = ids.iter().map(|s| s.to_string()).collect();
        let edges = induced_edges(&id_vec, &catalog());
        let mut state = GraphState::default();
        state.reset(loaded, edges);
        state
    }

    #[test]
    fn test_unknown_focal_id_yields_empty_delta() {
        let state = initial_state(&["dd", "melon", "sundae"]);
        let delta = expand("no_such_strain", &state, &catalog());
        assert!(delta.is_empty());
        assert!(delta.dangling.is_empty());
    }

    #[test]
    fn test_fully_loaded_focal_yields_empty_delta() {
        // dd's parents are sundae and melon, both already in the view.
        let state = initial_state(&["dd", "melon", "sundae"]);
        let delta = expand("dd", &state, &catalog());
        assert!(delta.is_empty());
    }

    #[test]
    fn test_melon_expansion_adds_two_parents() {
        let state = initial_state(&["dd", "melon", "sundae"]);
        let delta = expand("melon", &state, &catalog());
        assert_eq!(delta.nodes.len(), 2);
        assert_eq!(delta.edges.len(), 2);
        assert_eq!(delta.nodes[0].id, "watermelon_zkitt");
        assert_eq!(delta.nodes[1].id, "lemon_tree");
        for edge in &delta.edges {
            assert_eq!(edge.target, "melon");
            assert_eq!(edge.role, EdgeRole::Normal);
        }
    }

    #[test]
    fn test_fpog_expansion_classifies_roles() {
        let mut state = initial_state(&["dd", "melon", "sundae"]);
        let sundae_delta = expand("sundae", &state, &catalog());
        for node in &sundae_delta.nodes {
            state.add_node(node);
        }
        for edge in sundae_delta.edges {
            state.add_edge(edge);
        }

        let delta = expand("fpog", &state, &catalog());
        let role_of = |source: &str| {
            delta
                .edges
                .iter()
                .find(|e| e.source == source && e.target == "fpog")
                .map(|e| e.role)
        };
        assert_eq!(role_of("green_ribbon"), Some(EdgeRole::F1Component));
        assert_eq!(role_of("gdp"), Some(EdgeRole::F1Component));
        assert_eq!(role_of("tahoe_alien"), Some(EdgeRole::FinalCross));
    }

    #[test]
    fn test_parents_before_children_in_declared_order() {
        // gdp has parents [mendo_purps, skunk_afghani] and children
        // [fpog, cherry_pie]; with nothing but gdp loaded, the delta must
        // keep both declaration orders, ancestors first.
        let mut state = GraphState::default();
        let loaded: HashSet<String> = ["gdp".to_string()].into_iter().collect();
        state.reset(loaded, vec![]);
        let delta = expand("gdp", &state, &catalog());
        let ids: Vec<&str> = delta.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["mendo_purps", "skunk_afghani", "fpog", "cherry_pie"]);
        assert!(delta.edges[0].same_pair("mendo_purps", "gdp"));
        assert!(delta.edges[2].same_pair("gdp", "fpog"));
    }

    #[test]
    fn test_dangling_references_are_skipped_and_reported() {
        // sour_diesel's parents chemdog_91 and super_skunk have no records;
        // its child lemon_tree does.
        let mut state = GraphState::default();
        let loaded: HashSet<String> = ["sour_diesel".to_string()].into_iter().collect();
        state.reset(loaded, vec![]);
        let delta = expand("sour_diesel", &state, &catalog());
        assert_eq!(delta.dangling, vec!["chemdog_91", "super_skunk"]);
        assert_eq!(delta.nodes.len(), 1);
        assert_eq!(delta.nodes[0].id, "lemon_tree");
        assert_eq!(delta.edges.len(), 1);
        assert!(delta.edges[0].same_pair("sour_diesel", "lemon_tree"));
    }

    #[test]
    fn test_unloaded_focal_leads_its_own_batch() {
        let state = initial_state(&["dd", "melon", "sundae"]);
        let delta = expand("gdp", &state, &catalog());
        assert_eq!(delta.nodes[0].id, "gdp");
        // Applying nodes before edges leaves nothing dangling.
        let mut applied = state.clone();
        for node in &delta.nodes {
            applied.add_node(node);
        }
        for edge in delta.edges {
            applied.add_edge(edge);
        }
        assert!(!applied.has_dangling_edges());
    }

    #[test]
    fn test_repeated_reference_within_one_delta() {
        let json = r#"[
            {"id": "twin", "label": "Twin Cross", "type": "documented",
             "parents": ["base", "base"]},
            {"id": "base", "label": "Base", "type": "documented"}
        ]"#;
        let synthetic = StrainCatalog::from_json_str(json).unwrap();
        let mut state = GraphState::default();
        let loaded: HashSet<String> = ["twin".to_string()].into_iter().collect();
        state.reset(loaded, vec![]);
        let delta = expand("twin", &state, &synthetic);
        assert_eq!(delta.nodes.len(), 1);
        assert_eq!(delta.edges.len(), 1);
    }

    #[test]
    fn test_expand_is_pure() {
        let state = initial_state(&["dd", "melon", "sundae"]);
        let before_nodes = state.node_count();
        let before_edges = state.edge_count();
        let _ = expand("melon", &state, &catalog());
        assert_eq!(state.node_count(), before_nodes);
        assert_eq!(state.edge_count(), before_edges);
    }

    #[test]
    fn test_induced_edges_for_initial_set() {
        let ids: Vec<String> = ["dd", "melon", "sundae"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let edges = induced_edges(&ids, &catalog());
        assert_eq!(edges.len(), 2);
        assert!(edges.iter().any(|e| e.same_pair("sundae", "dd")));
        assert!(edges.iter().any(|e| e.same_pair("melon", "dd")));
        for edge in &edges {
            assert_eq!(edge.role, EdgeRole::Normal);
        }
    }
}
