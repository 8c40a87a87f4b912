//! Blob storage and the save/load boundary.
//!
//! Everything persisted goes through a [`BlobStore`] keyed by `/`-separated
//! paths. A save writes the graph file plus the derived runtime assets:
//!
//! ```text
//! graphs/{file}.json
//! dialogues/{file}/{file}.json                              container
//! dialogues/{file}/global/dialogues/{name}.json             ungrouped dialogue
//! dialogues/{file}/groups/{group}/{group}.json              group
//! dialogues/{file}/groups/{group}/dialogues/{name}.json     grouped dialogue
//! ```
//!
//! Assets left behind by a previous save (renamed or removed nodes and
//! groups) are deleted using the bookkeeping stored in the old graph file.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::container::{DialogueContainer, DialogueEntry};
use crate::error::{CqError, CqResult};
use crate::graph::DialogueGraph;
use crate::names::sanitize_name;
use crate::record::{GraphFile, LoadOptions};

/// A flat key/value store of byte blobs.
pub trait BlobStore {
    /// Read a blob. `Ok(None)` when the key is absent.
    fn read(&self, key: &str) -> CqResult<Option<Vec<u8>>>;

    /// Write a blob, replacing any previous value.
    fn write(&mut self, key: &str, bytes: &[u8]) -> CqResult<()>;

    /// Delete a blob. Returns whether it existed.
    fn delete(&mut self, key: &str) -> CqResult<bool>;

    /// Delete every blob whose key starts with `prefix`. Returns how many went.
    fn delete_prefix(&mut self, prefix: &str) -> CqResult<usize>;
}

/// Blob store backed by a directory. Keys map to relative file paths.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Store rooted at `root`. The directory is created lazily on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

fn io_err(key: &str) -> impl FnOnce(io::Error) -> CqError + '_ {
    move |source| CqError::Io {
        key: key.to_string(),
        source,
    }
}

fn count_files(dir: &Path) -> io::Result<usize> {
    let mut count = 0;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            count += count_files(&entry.path())?;
        } else {
            count += 1;
        }
    }
    Ok(count)
}

impl BlobStore for FsStore {
    fn read(&self, key: &str) -> CqResult<Option<Vec<u8>>> {
        match fs::read(self.path(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_err(key)(e)),
        }
    }

    fn write(&mut self, key: &str, bytes: &[u8]) -> CqResult<()> {
        let path = self.path(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err(key))?;
        }
        fs::write(&path, bytes).map_err(io_err(key))
    }

    fn delete(&mut self, key: &str) -> CqResult<bool> {
        match fs::remove_file(self.path(key)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_err(key)(e)),
        }
    }

    fn delete_prefix(&mut self, prefix: &str) -> CqResult<usize> {
        // Prefixes used here always name a directory.
        let dir = self.path(prefix.trim_end_matches('/'));
        if !dir.is_dir() {
            return Ok(0);
        }
        let count = count_files(&dir).map_err(io_err(prefix))?;
        fs::remove_dir_all(&dir).map_err(io_err(prefix))?;
        Ok(count)
    }
}

/// In-memory blob store, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    blobs: BTreeMap<String, Vec<u8>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// All keys, sorted.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.blobs.keys().map(String::as_str)
    }

    /// Whether `key` is present.
    pub fn contains(&self, key: &str) -> bool {
        self.blobs.contains_key(key)
    }
}

impl BlobStore for MemoryStore {
    fn read(&self, key: &str) -> CqResult<Option<Vec<u8>>> {
        Ok(self.blobs.get(key).cloned())
    }

    fn write(&mut self, key: &str, bytes: &[u8]) -> CqResult<()> {
        self.blobs.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    fn delete(&mut self, key: &str) -> CqResult<bool> {
        Ok(self.blobs.remove(key).is_some())
    }

    fn delete_prefix(&mut self, prefix: &str) -> CqResult<usize> {
        let before = self.blobs.len();
        self.blobs.retain(|k, _| !k.starts_with(prefix));
        Ok(before - self.blobs.len())
    }
}

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

/// Key of the graph file.
pub fn graph_key(file: &str) -> String {
    format!("graphs/{file}.json")
}

/// Key of the runtime container asset.
pub fn container_key(file: &str) -> String {
    format!("dialogues/{file}/{file}.json")
}

/// Key of an ungrouped dialogue asset.
pub fn ungrouped_dialogue_key(file: &str, name: &str) -> String {
    format!("dialogues/{file}/global/dialogues/{name}.json")
}

/// Folder prefix holding everything of one group.
pub fn group_prefix(file: &str, group: &str) -> String {
    format!("dialogues/{file}/groups/{group}/")
}

/// Key of a group asset.
pub fn group_key(file: &str, group: &str) -> String {
    format!("{}{group}.json", group_prefix(file, group))
}

/// Key of a grouped dialogue asset.
pub fn grouped_dialogue_key(file: &str, group: &str, name: &str) -> String {
    format!("{}dialogues/{name}.json", group_prefix(file, group))
}

// ---------------------------------------------------------------------------
// Save / load
// ---------------------------------------------------------------------------

/// Persisted group asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupAsset {
    /// Group name.
    pub group_name: String,
}

/// What a save touched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveReport {
    /// Keys written.
    pub written: Vec<String>,
    /// Stale keys or folder prefixes removed.
    pub removed: Vec<String>,
}

fn encode<T: Serialize>(key: &str, value: &T) -> CqResult<Vec<u8>> {
    serde_json::to_vec_pretty(value).map_err(|source| CqError::Corrupt {
        key: key.to_string(),
        source,
    })
}

fn put<T: Serialize>(
    store: &mut impl BlobStore,
    report: &mut SaveReport,
    key: String,
    value: &T,
) -> CqResult<()> {
    let bytes = encode(&key, value)?;
    store.write(&key, &bytes)?;
    tracing::debug!(key = %key, bytes = bytes.len(), "wrote asset");
    report.written.push(key);
    Ok(())
}

/// Save a graph and its derived assets, removing assets a previous save left
/// behind.
///
/// Refused with [`CqError::Validation`] when a node or group name is empty or
/// duplicated, since assets are keyed by name.
pub fn save(store: &mut impl BlobStore, graph: &DialogueGraph) -> CqResult<SaveReport> {
    let file = sanitize_name(&graph.file_name);
    if file.is_empty() {
        return Err(CqError::InvalidFileName(graph.file_name.clone()));
    }

    let blocking: Vec<String> = graph
        .validate()
        .iter()
        .filter(|i| i.blocks_save())
        .map(ToString::to_string)
        .collect();
    if !blocking.is_empty() {
        return Err(CqError::Validation(blocking.join("; ")));
    }
    let unsafe_name = graph
        .nodes()
        .iter()
        .map(|n| n.name.as_str())
        .chain(graph.groups().iter().map(|g| g.name.as_str()))
        .find(|name| !is_key_segment(name));
    if let Some(name) = unsafe_name {
        return Err(CqError::Validation(format!("{name:?} is not a valid asset name")));
    }

    let mut report = SaveReport::default();
    let current = GraphFile::from_graph(graph);

    if let Some(previous) = read_previous(store, &file)? {
        reconcile(store, &mut report, &file, &previous, &current)?;
    }

    let container = DialogueContainer::from_graph(graph);
    for group in &container.groups {
        let asset = GroupAsset {
            group_name: group.group_name.clone(),
        };
        put(store, &mut report, group_key(&file, &group.group_name), &asset)?;
        for dialogue in &group.dialogues {
            put(
                store,
                &mut report,
                grouped_dialogue_key(&file, &group.group_name, &dialogue.name),
                dialogue,
            )?;
        }
    }
    for dialogue in &container.ungrouped_dialogues {
        put(store, &mut report, ungrouped_dialogue_key(&file, &dialogue.name), dialogue)?;
    }
    put(store, &mut report, container_key(&file), &container)?;
    put(store, &mut report, graph_key(&file), &current)?;

    Ok(report)
}

fn read_previous(store: &impl BlobStore, file: &str) -> CqResult<Option<GraphFile>> {
    let key = graph_key(file);
    let Some(bytes) = store.read(&key)? else {
        return Ok(None);
    };
    match serde_json::from_slice(&bytes) {
        Ok(previous) => Ok(Some(previous)),
        Err(e) => {
            tracing::warn!(key = %key, error = %e, "previous graph file unreadable, skipping cleanup");
            Ok(None)
        }
    }
}

fn reconcile(
    store: &mut impl BlobStore,
    report: &mut SaveReport,
    file: &str,
    previous: &GraphFile,
    current: &GraphFile,
) -> CqResult<()> {
    let groups: BTreeSet<&str> = current.old_group_names.iter().map(String::as_str).collect();

    for group in &previous.old_group_names {
        if !is_key_segment(group) {
            tracing::warn!(group = %group, "ignoring unsafe group name in previous graph file");
            continue;
        }
        if !groups.contains(group.as_str()) {
            let prefix = group_prefix(file, group);
            let count = store.delete_prefix(&prefix)?;
            tracing::debug!(prefix = %prefix, count, "removed stale group");
            report.removed.push(prefix);
            continue;
        }
        let names: BTreeSet<&str> = current
            .old_names_in_group(group)
            .iter()
            .map(String::as_str)
            .collect();
        for name in previous.old_names_in_group(group) {
            if !is_key_segment(name) {
                tracing::warn!(group = %group, name = %name, "ignoring unsafe dialogue name in previous graph file");
                continue;
            }
            if !names.contains(name.as_str()) {
                let key = grouped_dialogue_key(file, group, name);
                if store.delete(&key)? {
                    tracing::debug!(key = %key, "removed stale dialogue");
                    report.removed.push(key);
                }
            }
        }
    }

    let ungrouped: BTreeSet<&str> = current
        .old_ungrouped_node_names
        .iter()
        .map(String::as_str)
        .collect();
    for name in &previous.old_ungrouped_node_names {
        if !is_key_segment(name) {
            tracing::warn!(name = %name, "ignoring unsafe dialogue name in previous graph file");
            continue;
        }
        if !ungrouped.contains(name.as_str()) {
            let key = ungrouped_dialogue_key(file, name);
            if store.delete(&key)? {
                tracing::debug!(key = %key, "removed stale dialogue");
                report.removed.push(key);
            }
        }
    }
    Ok(())
}

/// Whether `name` can stand alone as one segment of an asset key.
fn is_key_segment(name: &str) -> bool {
    !name.is_empty() && sanitize_name(name) == name
}

/// Load a graph by file name.
///
/// Fails with [`CqError::GraphNotFound`] when nothing is stored under the name
/// and [`CqError::Corrupt`] when the stored JSON cannot be decoded. A partial
/// graph is never returned.
pub fn load(store: &impl BlobStore, file_name: &str, options: &LoadOptions) -> CqResult<DialogueGraph> {
    let file = sanitize_name(file_name);
    let key = graph_key(&file);
    let bytes = store
        .read(&key)?
        .ok_or_else(|| CqError::GraphNotFound(file_name.to_string()))?;
    let record: GraphFile = decode(&key, &bytes)?;
    record.into_graph(options)
}

/// Load the runtime container asset of a saved graph.
pub fn load_container(store: &impl BlobStore, file_name: &str) -> CqResult<DialogueContainer> {
    let file = sanitize_name(file_name);
    let key = container_key(&file);
    let bytes = store
        .read(&key)?
        .ok_or_else(|| CqError::GraphNotFound(file_name.to_string()))?;
    decode(&key, &bytes)
}

/// Load one dialogue asset. `Ok(None)` when it was never saved.
pub fn load_dialogue(
    store: &impl BlobStore,
    file_name: &str,
    group: Option<&str>,
    name: &str,
) -> CqResult<Option<DialogueEntry>> {
    let file = sanitize_name(file_name);
    let name = sanitize_name(name);
    let key = match group {
        Some(group) => grouped_dialogue_key(&file, &sanitize_name(group), &name),
        None => ungrouped_dialogue_key(&file, &name),
    };
    match store.read(&key)? {
        Some(bytes) => decode(&key, &bytes).map(Some),
        None => Ok(None),
    }
}

fn decode<T: for<'de> Deserialize<'de>>(key: &str, bytes: &[u8]) -> CqResult<T> {
    serde_json::from_slice(bytes).map_err(|source| CqError::Corrupt {
        key: key.to_string(),
        source,
    })
}
