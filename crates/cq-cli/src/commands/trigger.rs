use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use cq_core::FsStore;
use cq_logic::{VariableNames, VariableStore, load_modifiers};
use cq_runtime::{DialogueSession, DialogueTrigger, SessionConfig};

pub fn run(
    dir: &Path,
    trigger_path: &Path,
    vars: Option<&Path>,
    apply: Option<&Path>,
) -> Result<(), String> {
    let trigger = DialogueTrigger::load(trigger_path).map_err(|e| e.to_string())?;

    let store = match vars {
        Some(path) => {
            let names = VariableNames::load(path).map_err(|e| e.to_string())?;
            VariableStore::from_names(&names)
        }
        None => VariableStore::new(),
    };
    let mut session = DialogueSession::with_store(store, SessionConfig::default());

    if let Some(path) = apply {
        let modifiers = load_modifiers(path).map_err(|e| e.to_string())?;
        let applied = session.apply_all(&modifiers);
        println!("  Applied {applied}/{} modifiers", modifiers.len());
    }

    if !session.store().is_empty() {
        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["Variable", "Type", "Value"]);
        for (key, value) in session.store().iter() {
            table.add_row(vec![key.to_string(), value.kind().to_string(), value.to_string()]);
        }
        println!("{table}");
    }

    let Some(entry) = trigger.resolve(session.store()).cloned() else {
        println!("  No dialogue selected.");
        return Ok(());
    };
    println!("  Entry: {}", entry.to_string().bold());

    session
        .load_graph(&FsStore::new(dir), &entry.graph)
        .map_err(|e| e.to_string())?;
    let node = session.start_entry(entry).map_err(|e| e.to_string())?;
    println!("  Start: {}", node.name.bold());
    for line in node.text.lines() {
        println!("  {}", line.trim());
    }

    Ok(())
}
