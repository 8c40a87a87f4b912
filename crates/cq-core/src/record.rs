//! Persisted graph records.
//!
//! A [`GraphFile`] is the on-disk shape of a [`DialogueGraph`]: IDs are plain
//! strings, choice targets are resolved in a separate pass on load, and the
//! `old*` fields remember which asset names the previous save produced.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{CqError, CqResult};
use crate::graph::DialogueGraph;
use crate::group::Group;
use crate::id::{GroupId, NodeId};
use crate::names::sanitize_name;
use crate::node::{Choice, Node, NodeKind, Position};

/// What to do when a choice target does not resolve to a node in the file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DanglingPolicy {
    /// Log a warning and leave the choice unlinked.
    #[default]
    Unlink,
    /// Refuse the file with [`CqError::DanglingReference`].
    Fail,
}

/// Options controlling how a graph file is turned back into a graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadOptions {
    /// Handling of unresolved choice targets.
    pub dangling: DanglingPolicy,
}

impl LoadOptions {
    /// Set the dangling-reference policy.
    pub fn with_dangling(mut self, dangling: DanglingPolicy) -> Self {
        self.dangling = dangling;
        self
    }
}

/// Persisted choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceRecord {
    /// Display text.
    pub text: String,
    /// Target node ID; `None` or an empty string means unlinked.
    #[serde(default)]
    pub target_node_id: Option<String>,
}

/// Persisted node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    /// Node ID (UUID).
    pub id: String,
    /// Node name.
    pub name: String,
    /// Body text.
    #[serde(default)]
    pub text: String,
    /// Node kind.
    pub kind: NodeKind,
    /// Owning group ID, if any.
    #[serde(default)]
    pub group_id: Option<String>,
    /// Ordered choices.
    #[serde(default)]
    pub choices: Vec<ChoiceRecord>,
    /// Editor position.
    #[serde(default)]
    pub position: Position,
}

/// Persisted group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRecord {
    /// Group ID (UUID).
    pub id: String,
    /// Group name.
    pub name: String,
    /// Editor position.
    #[serde(default)]
    pub position: Position,
}

/// The persisted form of a whole graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphFile {
    /// Name the graph is saved under.
    pub file_name: String,
    /// All nodes.
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    /// All groups.
    #[serde(default)]
    pub groups: Vec<GroupRecord>,
    /// Group names written by the save that produced this file.
    #[serde(default)]
    pub old_group_names: Vec<String>,
    /// Grouped node names, keyed by group name, written by that save.
    #[serde(default)]
    pub old_grouped_node_names: BTreeMap<String, Vec<String>>,
    /// Ungrouped node names written by that save.
    #[serde(default)]
    pub old_ungrouped_node_names: Vec<String>,
    /// Designated start node, when one was set explicitly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_node_id: Option<String>,
}

impl GraphFile {
    /// Build the persisted form of `graph`. The `old*` fields record the names
    /// this save produces, so the next save can find what went stale.
    pub fn from_graph(graph: &DialogueGraph) -> Self {
        let nodes = graph
            .nodes()
            .iter()
            .map(|n| NodeRecord {
                id: n.id.to_full_string(),
                name: n.name.clone(),
                text: n.text.clone(),
                kind: n.kind,
                group_id: n.group.map(|g| g.to_full_string()),
                choices: n
                    .choices
                    .iter()
                    .map(|c| ChoiceRecord {
                        text: c.text.clone(),
                        target_node_id: c.target.map(|t| t.to_full_string()),
                    })
                    .collect(),
                position: n.position,
            })
            .collect();

        let groups = graph
            .groups()
            .iter()
            .map(|g| GroupRecord {
                id: g.id.to_full_string(),
                name: g.name.clone(),
                position: g.position,
            })
            .collect();

        let mut old_grouped_node_names = BTreeMap::new();
        for group in graph.groups() {
            let names: Vec<String> = graph.group_members(group.id).map(|n| n.name.clone()).collect();
            old_grouped_node_names.insert(group.name.clone(), names);
        }

        Self {
            file_name: graph.file_name.clone(),
            nodes,
            groups,
            old_group_names: graph.groups().iter().map(|g| g.name.clone()).collect(),
            old_grouped_node_names,
            old_ungrouped_node_names: graph
                .nodes()
                .iter()
                .filter(|n| n.group.is_none())
                .map(|n| n.name.clone())
                .collect(),
            start_node_id: graph.designated_start().map(|id| id.to_full_string()),
        }
    }

    /// Rebuild a graph. Node and group IDs must parse; choice targets are
    /// resolved afterwards according to `options`.
    pub fn into_graph(self, options: &LoadOptions) -> CqResult<DialogueGraph> {
        let mut graph = DialogueGraph::new(&self.file_name);
        // Keep the stored name even if it would sanitize differently.
        graph.file_name = self.file_name;

        for record in self.groups {
            require_clean("group", &record.name)?;
            let group = Group {
                id: GroupId::parse(&record.id)?,
                name: record.name,
                position: record.position,
            };
            graph.insert_group(group)?;
        }

        let mut ids = Vec::with_capacity(self.nodes.len());
        for record in &self.nodes {
            require_clean("node", &record.name)?;
            ids.push(NodeId::parse(&record.id)?);
        }
        let known: HashSet<NodeId> = ids.iter().copied().collect();

        for (record, id) in self.nodes.into_iter().zip(ids) {
            let group = match unset(record.group_id.as_deref()) {
                None => None,
                Some(raw) => match GroupId::parse(raw) {
                    Ok(g) if graph.group(g).is_some() => Some(g),
                    _ => {
                        tracing::warn!(node = %record.name, group = raw, "unknown group, node left ungrouped");
                        None
                    }
                },
            };

            let mut choices = Vec::with_capacity(record.choices.len());
            for (index, choice) in record.choices.into_iter().enumerate() {
                let target = resolve_target(
                    &record.name,
                    index,
                    choice.target_node_id.as_deref(),
                    &known,
                    options,
                )?;
                choices.push(Choice {
                    text: choice.text,
                    target,
                });
            }

            graph.insert_node(Node {
                id,
                name: record.name,
                text: record.text,
                kind: record.kind,
                choices,
                group,
                position: record.position,
            })?;
        }

        if let Some(raw) = unset(self.start_node_id.as_deref()) {
            match NodeId::parse(raw) {
                Ok(id) if graph.contains(id) => graph.set_start(id)?,
                _ => tracing::warn!(start = raw, "designated start node not found, falling back"),
            }
        }

        Ok(graph)
    }

    /// Names of the grouped dialogue assets this file recorded for `group`.
    pub fn old_names_in_group(&self, group: &str) -> &[String] {
        self.old_grouped_node_names
            .get(group)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Names become storage key segments, so a stored name must already be in
/// sanitized form.
fn require_clean(what: &str, name: &str) -> CqResult<()> {
    if sanitize_name(name) != name {
        return Err(CqError::Validation(format!("{what} name {name:?} is not a valid asset name")));
    }
    Ok(())
}

fn unset(raw: Option<&str>) -> Option<&str> {
    raw.filter(|s| !s.is_empty())
}

fn resolve_target(
    node: &str,
    choice: usize,
    raw: Option<&str>,
    known: &HashSet<NodeId>,
    options: &LoadOptions,
) -> CqResult<Option<NodeId>> {
    let Some(raw) = unset(raw) else {
        return Ok(None);
    };
    match NodeId::parse(raw) {
        Ok(id) if known.contains(&id) => Ok(Some(id)),
        _ => match options.dangling {
            DanglingPolicy::Unlink => {
                tracing::error!(node, choice, target = raw, "dangling choice target, unlinking");
                Ok(None)
            }
            DanglingPolicy::Fail => Err(CqError::DanglingReference {
                node: node.to_string(),
                choice,
                target: raw.to_string(),
            }),
        },
    }
}

/// Serialize a graph to pretty JSON.
pub fn to_json(graph: &DialogueGraph) -> CqResult<String> {
    serde_json::to_string_pretty(&GraphFile::from_graph(graph)).map_err(|source| CqError::Corrupt {
        key: graph.file_name.clone(),
        source,
    })
}

/// Parse a graph from JSON. `key` names the source in errors.
pub fn from_json(key: &str, json: &str, options: &LoadOptions) -> CqResult<DialogueGraph> {
    let file: GraphFile = serde_json::from_str(json).map_err(|source| CqError::Corrupt {
        key: key.to_string(),
        source,
    })?;
    file.into_graph(options)
}
