use crate::catalog::StrainCatalog;
use crate::graph_state::GraphState;
use crate::render::{LayoutConfig, LayoutDirection};
use crate::strain::{Confidence, EdgeRole};
use itertools::Itertools;
use std::collections::HashMap;
use svg::Document;
use svg::node::element::{Circle, Line, Polygon, Text};

const FONT: &str = "system-ui, -apple-system, sans-serif";
const BACKGROUND: &str = "#09090b";

/// A `LineageView` stand-in for headless use: renders the currently loaded
/// subgraph as a layered SVG, styled like the interactive app (node size and
/// fill by confidence tier, dashed grey F1-component edges, thick green
/// final-cross edges). Deterministic for a given state and layout.
pub fn export_lineage_svg(
    state: &GraphState,
    catalog: &StrainCatalog,
    layout: &LayoutConfig,
) -> String {
    let ranks = structural_ranks(state);
    let max_rank = ranks.values().copied().max().unwrap_or(0);

    // Row-major positions: one row per rank, members sorted by id. The
    // `generation` hint is deliberately ignored; ranks come from the loaded
    // edges alone.
    let rows: HashMap<usize, Vec<String>> = ranks
        .iter()
        .map(|(id, rank)| (*rank, id.clone()))
        .into_group_map()
        .into_iter()
        .map(|(rank, mut ids)| {
            ids.sort();
            (rank, ids)
        })
        .collect();

    let column_width = layout.node_spacing + 90.0;
    let widest_row = rows.values().map(Vec::len).max().unwrap_or(0);
    let width = (widest_row as f32) * column_width + 2.0 * layout.padding;
    let height = (max_rank as f32 + 1.0) * layout.rank_spacing + 2.0 * layout.padding + 40.0;

    let mut positions: HashMap<String, (f32, f32)> = HashMap::new();
    for (rank, ids) in &rows {
        let row_width = ids.len() as f32 * column_width;
        let x0 = (width - row_width) / 2.0 + column_width / 2.0;
        let display_rank = match layout.direction {
            LayoutDirection::AncestorsAbove => *rank,
            LayoutDirection::AncestorsBelow => max_rank - *rank,
        };
        let y = layout.padding + 40.0 + display_rank as f32 * layout.rank_spacing;
        for (idx, id) in ids.iter().enumerate() {
            positions.insert(id.clone(), (x0 + idx as f32 * column_width, y));
        }
    }

    let mut doc = Document::new()
        .set("viewBox", (0, 0, width, height))
        .set("width", width)
        .set("height", height)
        .set("style", format!("background:{BACKGROUND}"));

    doc = doc.add(
        Text::new("Strain Lineage")
            .set("x", 24)
            .set("y", 34)
            .set("font-family", FONT)
            .set("font-size", 22)
            .set("font-weight", 700)
            .set("fill", "#34d399"),
    );

    for edge in &state.edges {
        let (Some(&(fx, fy)), Some(&(tx, ty))) =
            (positions.get(&edge.source), positions.get(&edge.target))
        else {
            continue;
        };
        let (stroke, stroke_width, opacity, dasharray) = match edge.role {
            EdgeRole::Normal => ("#52525b", 3.0, 1.0, "none"),
            EdgeRole::F1Component => ("#71717a", 2.0, 0.6, "6,4"),
            EdgeRole::FinalCross => ("#10b981", 4.0, 1.0, "none"),
        };
        let mut line = Line::new()
            .set("x1", fx)
            .set("y1", fy)
            .set("x2", tx)
            .set("y2", ty)
            .set("stroke", stroke)
            .set("stroke-width", stroke_width)
            .set("opacity", opacity);
        if dasharray != "none" {
            line = line.set("stroke-dasharray", dasharray);
        }
        doc = doc.add(line);
        doc = doc.add(arrow_head(fx, fy, tx, ty, stroke, opacity));
    }

    let sorted_ids = state.loaded.iter().sorted();
    for id in sorted_ids {
        let Some(&(x, y)) = positions.get(id) else {
            continue;
        };
        let Some(record) = catalog.lookup(id) else {
            continue;
        };
        let (fill, radius, opacity) = match record.confidence {
            Confidence::Verified => ("#34d399", 30.0, 1.0),
            Confidence::Documented => ("#10b981", 24.0, 0.85),
            Confidence::Undocumented => ("#71717a", 21.0, 0.5),
        };
        let mut circle = Circle::new()
            .set("cx", x)
            .set("cy", y)
            .set("r", radius)
            .set("fill", fill)
            .set("opacity", opacity);
        circle = if state.focal.as_deref() == Some(id.as_str()) {
            circle.set("stroke", "#fbbf24").set("stroke-width", 4)
        } else {
            match record.confidence {
                Confidence::Verified => circle.set("stroke", "#ffffff").set("stroke-width", 5),
                Confidence::Documented => circle,
                Confidence::Undocumented => circle
                    .set("stroke", "#a1a1aa")
                    .set("stroke-width", 2)
                    .set("stroke-dasharray", "4,3"),
            }
        };
        doc = doc.add(circle);

        doc = doc
            .add(
                Text::new(record.label.clone())
                    .set("x", x)
                    .set("y", y + radius + 16.0)
                    .set("text-anchor", "middle")
                    .set("font-family", FONT)
                    .set("font-size", 13)
                    .set("font-weight", 600)
                    .set("fill", "#ffffff"),
            )
            .add(
                Text::new(record.confidence.as_str())
                    .set("x", x)
                    .set("y", y + radius + 30.0)
                    .set("text-anchor", "middle")
                    .set("font-family", FONT)
                    .set("font-size", 10)
                    .set("fill", "#a1a1aa"),
            );
    }

    doc.to_string()
}

fn arrow_head(fx: f32, fy: f32, tx: f32, ty: f32, fill: &str, opacity: f32) -> Polygon {
    let (dx, dy) = (tx - fx, ty - fy);
    let len = (dx * dx + dy * dy).sqrt().max(1.0);
    let (ux, uy) = (dx / len, dy / len);
    // Tip sits just outside the largest node radius.
    let (tip_x, tip_y) = (tx - ux * 34.0, ty - uy * 34.0);
    let (bx, by) = (tip_x - ux * 10.0, tip_y - uy * 10.0);
    let (px, py) = (-uy, ux);
    let points = format!(
        "{:.1},{:.1} {:.1},{:.1} {:.1},{:.1}",
        tip_x,
        tip_y,
        bx + px * 5.0,
        by + py * 5.0,
        bx - px * 5.0,
        by - py * 5.0
    );
    Polygon::new()
        .set("points", points)
        .set("fill", fill)
        .set("opacity", opacity)
}

/// Longest loaded-parent chain per node, derived from the materialized
/// edges. Roots (no loaded parent) sit at rank 0; a back edge in malformed
/// data is ignored rather than recursed into.
fn structural_ranks(state: &GraphState) -> HashMap<String, usize> {
    let mut parents: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in &state.edges {
        parents
            .entry(edge.target.as_str())
            .or_default()
            .push(edge.source.as_str());
    }

    fn rank_of<'a>(
        id: &'a str,
        parents: &HashMap<&'a str, Vec<&'a str>>,
        memo: &mut HashMap<&'a str, usize>,
        visiting: &mut Vec<&'a str>,
    ) -> usize {
        if let Some(&rank) = memo.get(id) {
            return rank;
        }
        if visiting.contains(&id) {
            return 0;
        }
        visiting.push(id);
        let rank = parents
            .get(id)
            .map(|ps| {
                ps.iter()
                    .map(|p| rank_of(p, parents, memo, visiting) + 1)
                    .max()
                    .unwrap_or(0)
            })
            .unwrap_or(0);
        visiting.pop();
        memo.insert(id, rank);
        rank
    }

    let mut memo: HashMap<&str, usize> = HashMap::new();
    for id in &state.loaded {
        let mut visiting = vec![];
        rank_of(id.as_str(), &parents, &mut memo, &mut visiting);
    }
    memo.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Engine, LineageEngine, SessionEvent};
    use crate::render::NullView;

    fn engine_after(selections: &[&str]) -> LineageEngine {
        let mut engine = LineageEngine::with_builtin_catalog();
        for id in selections {
            engine.apply(
                SessionEvent::NodeSelected { id: id.to_string() },
                &mut NullView,
            );
        }
        engine
    }

    #[test]
    fn test_initial_view_svg_contains_all_three_strains() {
        let engine = engine_after(&[]);
        let svg = export_lineage_svg(engine.state(), engine.catalog(), engine.layout());
        assert!(svg.contains("Devil Driver"));
        assert!(svg.contains("Melonade"));
        assert!(svg.contains("Sundae Driver"));
    }

    #[test]
    fn test_role_styling_appears_after_fpog_expansion() {
        let engine = engine_after(&["sundae", "fpog"]);
        let svg = export_lineage_svg(engine.state(), engine.catalog(), engine.layout());
        // final_cross edges are thick green, f1_component edges dashed.
        assert!(svg.contains("stroke=\"#10b981\""));
        assert!(svg.contains("stroke-dasharray=\"6,4\""));
    }

    #[test]
    fn test_export_is_deterministic() {
        let a = {
            let engine = engine_after(&["melon", "sundae"]);
            export_lineage_svg(engine.state(), engine.catalog(), engine.layout())
        };
        let b = {
            let engine = engine_after(&["melon", "sundae"]);
            export_lineage_svg(engine.state(), engine.catalog(), engine.layout())
        };
        assert_eq!(a, b);
    }

    #[test]
    fn test_ranks_follow_loaded_edges() {
        let engine = engine_after(&["sundae"]);
        let ranks = structural_ranks(engine.state());
        // fpog and grape_pie feed sundae, which feeds dd.
        assert_eq!(ranks["fpog"], 0);
        assert_eq!(ranks["grape_pie"], 0);
        assert_eq!(ranks["sundae"], 1);
        assert_eq!(ranks["dd"], 2);
    }

    #[test]
    fn test_focal_node_is_highlighted() {
        let engine = engine_after(&["melon"]);
        let svg = export_lineage_svg(engine.state(), engine.catalog(), engine.layout());
        assert!(svg.contains("#fbbf24"));
    }
}
