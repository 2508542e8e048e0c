//! Reasoning Context Builder: renders an entity's neighborhood
//! and top reasoning paths as compact text for a RAG consumer, grounded on
//! the reference system's `reason_about_entity` rendering.

use crate::reasoner::{explore_paths, neighbors};
use mkg_core::GraphStore;
use std::fmt::Write as _;

/// Relations/paths below this confidence are never shown, independent of
/// `depth`.
const CONTEXT_THRESHOLD: f64 = 0.3;

/// Renders a structured text block about `entity_name`, or a "not found"
/// marker if the graph has no such node.
pub fn render_context(graph: &GraphStore, entity_name: &str, depth: u32) -> String {
    let Some(node) = graph.get_node(entity_name) else {
        return format!("Entity '{entity_name}' not found in graph.");
    };

    let mut out = String::new();
    let _ = writeln!(out, "## Entity: {}", node.display_label);
    let _ = writeln!(out, "Type: {}", node.entity_type);
    let description = if node.description.is_empty() {
        "No description"
    } else {
        &node.description
    };
    let _ = writeln!(out, "Description: {description}");
    let _ = writeln!(out, "Confidence: {:.2}\n", node.confidence);

    let _ = writeln!(out, "### Direct Connections:");
    let mut direct = neighbors(graph, entity_name, CONTEXT_THRESHOLD);
    direct.sort_by(|a, b| b.confidence.partial_cmp(&a.confidence).unwrap_or(std::cmp::Ordering::Equal));
    if direct.is_empty() {
        let _ = writeln!(out, "- No direct connections found");
    } else {
        for conn in direct.iter().take(5) {
            let _ = writeln!(out, "- {} → {} (conf: {:.2})", conn.relation, conn.node, conn.confidence);
            if !conn.evidence.is_empty() {
                let snippet: String = conn.evidence.chars().take(100).collect();
                let _ = writeln!(out, "  Evidence: {snippet}...");
            }
        }
    }

    if depth > 1 {
        let _ = writeln!(out, "\n### Reasoning Paths:");
        let mut paths = explore_paths(graph, entity_name, depth, CONTEXT_THRESHOLD);
        paths.sort_by(|a, b| b.confidence.partial_cmp(&a.confidence).unwrap_or(std::cmp::Ordering::Equal));
        if paths.is_empty() {
            let _ = writeln!(out, "- No multi-hop paths found");
        } else {
            for path in paths.iter().take(5) {
                let mut rendered = String::new();
                for step in &path.steps {
                    let _ = write!(rendered, "{} [{}] → ", step.from, step.relation);
                }
                if let Some(last) = path.steps.last() {
                    let _ = write!(rendered, "{}", last.to);
                }
                let _ = writeln!(out, "- {rendered} (conf: {:.2})", path.confidence);
            }
        }
    }

    out
}
