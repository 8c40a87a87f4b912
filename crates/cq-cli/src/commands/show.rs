use std::path::Path;

use colored::Colorize;

pub fn run(dir: &Path, graph_name: &str, name: &str) -> Result<(), String> {
    let graph = super::load_graph(dir, graph_name)?;
    let id = super::find_node(&graph, name)?;
    let node = graph
        .node(id)
        .ok_or_else(|| format!("node not found: \"{name}\""))?;

    println!("  {} [{}]", node.name.bold(), node.kind.to_string().dimmed());
    if let Some(group) = node.group.and_then(|g| graph.group(g)) {
        println!("  group:      {}", group.name);
    }
    if graph.start() == Some(id) {
        println!("  start:      yes");
    } else if graph.is_starting_node(id) {
        println!("  start:      entry point");
    }
    println!();

    if !node.text.is_empty() {
        for line in node.text.lines() {
            println!("  {}", line.trim());
        }
        println!();
    }

    println!("  {}", "Choices:".bold());
    for (i, choice) in node.choices.iter().enumerate() {
        let target = choice
            .target
            .and_then(|t| graph.node(t))
            .map(|t| t.name.clone())
            .unwrap_or_else(|| "(end)".dimmed().to_string());
        println!("    {}. {} -> {target}", i + 1, choice.text);
    }

    let incoming = graph.incoming(id);
    if !incoming.is_empty() {
        println!();
        println!("  {}", "Reached from:".bold());
        for (source, index) in incoming {
            if let Some(source) = graph.node(source) {
                println!("    {} (choice {})", source.name, index + 1);
            }
        }
    }

    Ok(())
}
