use std::path::Path;

use cq_core::storage::{self, BlobStore};
use cq_core::{DialogueGraph, FsStore, sanitize_name};

pub fn run(dir: &Path, name: &str) -> Result<(), String> {
    let file = sanitize_name(name);
    if file.is_empty() {
        return Err(format!("invalid graph name: \"{name}\""));
    }

    let store = FsStore::new(dir);
    let existing = store
        .read(&storage::graph_key(&file))
        .map_err(|e| e.to_string())?;
    if existing.is_some() {
        return Err(format!("graph \"{file}\" already exists"));
    }

    let graph = DialogueGraph::new(&file);
    super::save_graph(dir, &graph)?;

    println!("  Created graph '{file}' in {}", dir.display());
    Ok(())
}
