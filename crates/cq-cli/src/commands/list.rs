use std::path::Path;

use comfy_table::{ContentArrangement, Table};

pub fn run(dir: &Path, name: &str, starting_only: bool) -> Result<(), String> {
    let graph = super::load_graph(dir, name)?;

    let nodes: Vec<_> = graph
        .nodes()
        .iter()
        .filter(|n| !starting_only || graph.is_starting_node(n.id))
        .collect();

    if nodes.is_empty() {
        println!("  No nodes found.");
        return Ok(());
    }

    let start = graph.start();
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Name", "Kind", "Group", "Choices", "Start"]);

    for node in &nodes {
        let start_mark = if start == Some(node.id) {
            "start"
        } else if graph.is_starting_node(node.id) {
            "entry"
        } else {
            ""
        };
        table.add_row(vec![
            node.name.clone(),
            node.kind.to_string(),
            super::group_label(&graph, node),
            node.choices.len().to_string(),
            start_mark.to_string(),
        ]);
    }

    println!("{table}");
    println!();
    println!("  {} nodes", nodes.len());

    Ok(())
}
