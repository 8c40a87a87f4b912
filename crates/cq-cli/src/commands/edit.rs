//! Editing commands: each loads the graph, applies one change, and saves.

use std::path::Path;

use cq_core::{NodeKind, Position, sanitize_name};

pub fn add_node(
    dir: &Path,
    graph_name: &str,
    name: &str,
    kind: &str,
    text: Option<&str>,
    group: Option<&str>,
) -> Result<(), String> {
    let kind = NodeKind::parse(kind)
        .ok_or_else(|| format!("unknown node kind: \"{kind}\". Use: single, multiple"))?;
    let mut graph = super::load_graph(dir, graph_name)?;

    let id = graph.create_node(name, kind, Position::default());
    if let Some(text) = text {
        graph.set_node_text(id, text).map_err(|e| e.to_string())?;
    }
    if let Some(group_name) = group {
        let group_id = match graph.find_group_by_name(&sanitize_name(group_name)) {
            Some(existing) => existing.id,
            None => graph.create_group(group_name, Position::default()),
        };
        graph.set_group(id, Some(group_id)).map_err(|e| e.to_string())?;
    }

    let node_name = graph.node(id).map(|n| n.name.clone()).unwrap_or_default();
    super::save_graph(dir, &graph)?;

    println!("  Added {kind} node '{node_name}' to '{}'", graph.file_name);
    Ok(())
}

pub fn add_choice(dir: &Path, graph_name: &str, node: &str, text: Option<&str>) -> Result<(), String> {
    let mut graph = super::load_graph(dir, graph_name)?;
    let id = super::find_node(&graph, node)?;

    let index = graph.add_choice(id, text).map_err(|e| e.to_string())?;
    super::save_graph(dir, &graph)?;

    println!("  Added choice {} to '{}'", index + 1, sanitize_name(node));
    Ok(())
}

/// Link choice `choice` (1-based) of `node` to `target`, or unlink it.
pub fn link(
    dir: &Path,
    graph_name: &str,
    node: &str,
    choice: usize,
    target: Option<&str>,
) -> Result<(), String> {
    let mut graph = super::load_graph(dir, graph_name)?;
    let id = super::find_node(&graph, node)?;
    let index = choice
        .checked_sub(1)
        .ok_or_else(|| "choices are numbered from 1".to_string())?;

    match target {
        Some(target) => {
            let target_id = super::find_node(&graph, target)?;
            graph.link(id, index, target_id).map_err(|e| e.to_string())?;
            super::save_graph(dir, &graph)?;
            println!("  Linked '{}' choice {choice} -> '{}'", sanitize_name(node), sanitize_name(target));
        }
        None => {
            graph.unlink(id, index).map_err(|e| e.to_string())?;
            super::save_graph(dir, &graph)?;
            println!("  Unlinked '{}' choice {choice}", sanitize_name(node));
        }
    }
    Ok(())
}

pub fn remove_node(dir: &Path, graph_name: &str, node: &str) -> Result<(), String> {
    let mut graph = super::load_graph(dir, graph_name)?;
    let id = super::find_node(&graph, node)?;

    let incoming = graph.incoming(id).len();
    let removed = graph.remove_node(id).map_err(|e| e.to_string())?;
    super::save_graph(dir, &graph)?;

    println!("  Removed '{}'", removed.name);
    if incoming > 0 {
        println!("  {incoming} choice(s) now unlinked");
    }
    Ok(())
}
