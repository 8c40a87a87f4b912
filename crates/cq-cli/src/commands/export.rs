use std::fmt::Write as _;
use std::path::Path;

use cq_core::container::{DialogueEntry, DialogueRef};
use cq_core::{DialogueContainer, record};

pub fn run(dir: &Path, name: &str, format: &str, output: Option<&Path>) -> Result<(), String> {
    let graph = super::load_graph(dir, name)?;

    let content = match format {
        "json" => {
            let container = DialogueContainer::from_graph(&graph);
            serde_json::to_string_pretty(&container)
                .map_err(|e| format!("JSON serialization error: {e}"))?
        }
        "graph" => record::to_json(&graph).map_err(|e| e.to_string())?,
        "markdown" | "md" => export_markdown(&DialogueContainer::from_graph(&graph)),
        _ => {
            return Err(format!(
                "unsupported format: \"{format}\". Use: json, graph, markdown"
            ));
        }
    };

    if let Some(path) = output {
        std::fs::write(path, &content)
            .map_err(|e| format!("cannot write to {}: {e}", path.display()))?;
        println!("  Exported to {}", path.display());
    } else {
        print!("{content}");
        if !content.ends_with('\n') {
            println!();
        }
    }

    Ok(())
}

/// Render a container as a readable script: one section per group, one
/// heading per dialogue, choices as a list.
fn export_markdown(container: &DialogueContainer) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {}\n", container.file_name);

    if !container.ungrouped_dialogues.is_empty() {
        out.push_str("## Ungrouped\n\n");
        for entry in &container.ungrouped_dialogues {
            write_entry(&mut out, entry);
        }
    }

    for group in &container.groups {
        let _ = writeln!(out, "## {}\n", group.group_name);
        for entry in &group.dialogues {
            write_entry(&mut out, entry);
        }
    }

    out
}

fn write_entry(out: &mut String, entry: &DialogueEntry) {
    let marker = if entry.is_starting_dialogue { " (start)" } else { "" };
    let _ = writeln!(out, "### {}{marker}\n", entry.name);

    if !entry.text.is_empty() {
        let _ = writeln!(out, "{}\n", entry.text.trim());
    }

    for choice in &entry.choices {
        let target = choice
            .next_dialogue
            .as_ref()
            .map(reference_label)
            .unwrap_or_else(|| "end".to_string());
        let _ = writeln!(out, "- {} → {target}", choice.text);
    }
    out.push('\n');
}

fn reference_label(reference: &DialogueRef) -> String {
    match &reference.group {
        Some(group) => format!("{group}/{}", reference.name),
        None => reference.name.clone(),
    }
}
