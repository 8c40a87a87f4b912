pub mod check;
pub mod edit;
pub mod export;
pub mod list;
pub mod new;
pub mod play;
pub mod show;
pub mod trigger;

use std::path::Path;

use cq_core::storage;
use cq_core::{DialogueGraph, FsStore, LoadOptions, NodeId, sanitize_name};
use strsim::jaro_winkler;

/// Minimum similarity for a name to be offered as a suggestion.
const SUGGEST_THRESHOLD: f64 = 0.6;

/// Load a saved graph from `dir`.
fn load_graph(dir: &Path, name: &str) -> Result<DialogueGraph, String> {
    let store = FsStore::new(dir);
    storage::load(&store, name, &LoadOptions::default()).map_err(|e| e.to_string())
}

/// Save a graph into `dir` and report what was written.
fn save_graph(dir: &Path, graph: &DialogueGraph) -> Result<(), String> {
    let mut store = FsStore::new(dir);
    let report = storage::save(&mut store, graph).map_err(|e| e.to_string())?;
    tracing::debug!(
        written = report.written.len(),
        removed = report.removed.len(),
        "graph saved"
    );
    Ok(())
}

/// Resolve a node by name, suggesting close matches on a miss.
fn find_node(graph: &DialogueGraph, name: &str) -> Result<NodeId, String> {
    let clean = sanitize_name(name);
    if let Some(node) = graph.find_by_name(&clean) {
        return Ok(node.id);
    }

    let suggestions = suggest_nodes(graph, &clean, 3);
    if suggestions.is_empty() {
        Err(format!("node not found: \"{name}\""))
    } else {
        Err(format!(
            "node not found: \"{name}\" (did you mean: {}?)",
            suggestions.join(", ")
        ))
    }
}

/// Node names ranked by prefix, substring, then fuzzy similarity.
fn suggest_nodes(graph: &DialogueGraph, partial: &str, limit: usize) -> Vec<String> {
    let partial_lower = partial.to_lowercase();
    let mut suggestions: Vec<(String, f64)> = graph
        .nodes()
        .iter()
        .filter_map(|node| {
            let name_lower = node.name.to_lowercase();
            if partial_lower.is_empty() {
                None
            } else if name_lower.starts_with(&partial_lower) {
                Some((node.name.clone(), 2.0))
            } else if name_lower.contains(&partial_lower) {
                Some((node.name.clone(), 1.0))
            } else {
                let score = jaro_winkler(&partial_lower, &name_lower);
                (score >= SUGGEST_THRESHOLD).then(|| (node.name.clone(), score))
            }
        })
        .collect();

    suggestions.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    suggestions.dedup_by(|a, b| a.0 == b.0);
    suggestions.truncate(limit);
    suggestions.into_iter().map(|(name, _)| name).collect()
}

/// Label for a node's group column.
fn group_label(graph: &DialogueGraph, node: &cq_core::Node) -> String {
    node.group
        .and_then(|id| graph.group(id))
        .map(|g| g.name.clone())
        .unwrap_or_else(|| "—".to_string())
}
