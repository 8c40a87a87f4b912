//! Runtime container asset: the graph flattened for play-mode consumption.
//!
//! Dialogues are addressed by name (and group name), since that is how their
//! per-dialogue assets are keyed on disk.

use serde::{Deserialize, Serialize};

use crate::graph::DialogueGraph;
use crate::id::NodeId;
use crate::node::{Node, NodeKind};

/// Name-based reference to a dialogue inside a container.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogueRef {
    /// Group name, or `None` for an ungrouped dialogue.
    #[serde(default)]
    pub group: Option<String>,
    /// Dialogue name.
    pub name: String,
}

impl DialogueRef {
    /// Reference an ungrouped dialogue.
    pub fn ungrouped(name: impl Into<String>) -> Self {
        Self {
            group: None,
            name: name.into(),
        }
    }

    /// Reference a dialogue inside `group`.
    pub fn grouped(group: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            group: Some(group.into()),
            name: name.into(),
        }
    }
}

/// A choice as seen at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryChoice {
    /// Display text.
    pub text: String,
    /// Dialogue this choice leads to, if any.
    #[serde(default)]
    pub next_dialogue: Option<DialogueRef>,
}

/// One dialogue, denormalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogueEntry {
    /// Dialogue name.
    pub name: String,
    /// Body text.
    pub text: String,
    /// Ordered choices.
    pub choices: Vec<EntryChoice>,
    /// Node kind.
    pub kind: NodeKind,
    /// Whether no choice in the graph leads here.
    pub is_starting_dialogue: bool,
}

/// A named group of dialogues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerGroup {
    /// Group name.
    pub group_name: String,
    /// Dialogues in the group, in creation order.
    pub dialogues: Vec<DialogueEntry>,
}

/// Everything needed to play a graph without the authoring model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogueContainer {
    /// Graph file name.
    pub file_name: String,
    /// Grouped dialogues.
    pub groups: Vec<ContainerGroup>,
    /// Dialogues outside any group.
    pub ungrouped_dialogues: Vec<DialogueEntry>,
}

impl DialogueContainer {
    /// Flatten a graph into a container.
    pub fn from_graph(graph: &DialogueGraph) -> Self {
        let reference = |id: NodeId| -> Option<DialogueRef> {
            let node = graph.node(id)?;
            Some(DialogueRef {
                group: node
                    .group
                    .and_then(|g| graph.group(g))
                    .map(|g| g.name.clone()),
                name: node.name.clone(),
            })
        };
        let entry = |node: &Node| DialogueEntry {
            name: node.name.clone(),
            text: node.text.clone(),
            choices: node
                .choices
                .iter()
                .map(|c| EntryChoice {
                    text: c.text.clone(),
                    next_dialogue: c.target.and_then(reference),
                })
                .collect(),
            kind: node.kind,
            is_starting_dialogue: graph.is_starting_node(node.id),
        };

        Self {
            file_name: graph.file_name.clone(),
            groups: graph
                .groups()
                .iter()
                .map(|g| ContainerGroup {
                    group_name: g.name.clone(),
                    dialogues: graph.group_members(g.id).map(entry).collect(),
                })
                .collect(),
            ungrouped_dialogues: graph
                .nodes()
                .iter()
                .filter(|n| n.group.is_none())
                .map(entry)
                .collect(),
        }
    }

    /// Names of all groups.
    pub fn group_names(&self) -> Vec<&str> {
        self.groups.iter().map(|g| g.group_name.as_str()).collect()
    }

    /// Dialogue names in `group`, optionally only starting dialogues.
    /// Empty when the group does not exist.
    pub fn grouped_dialogue_names(&self, group: &str, starting_only: bool) -> Vec<&str> {
        match self.groups.iter().find(|g| g.group_name == group) {
            Some(g) => names(&g.dialogues, starting_only),
            None => {
                tracing::warn!(group, "no such dialogue group");
                Vec::new()
            }
        }
    }

    /// Ungrouped dialogue names, optionally only starting dialogues.
    pub fn ungrouped_dialogue_names(&self, starting_only: bool) -> Vec<&str> {
        names(&self.ungrouped_dialogues, starting_only)
    }

    /// Look up a dialogue by reference.
    pub fn find(&self, reference: &DialogueRef) -> Option<&DialogueEntry> {
        let pool = match &reference.group {
            Some(group) => &self.groups.iter().find(|g| &g.group_name == group)?.dialogues,
            None => &self.ungrouped_dialogues,
        };
        pool.iter().find(|d| d.name == reference.name)
    }

    /// Total number of dialogues.
    pub fn len(&self) -> usize {
        self.ungrouped_dialogues.len() + self.groups.iter().map(|g| g.dialogues.len()).sum::<usize>()
    }

    /// Whether the container holds no dialogues.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn names(dialogues: &[DialogueEntry], starting_only: bool) -> Vec<&str> {
    dialogues
        .iter()
        .filter(|d| !starting_only || d.is_starting_dialogue)
        .map(|d| d.name.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Position;

    fn container() -> DialogueContainer {
        let mut graph = DialogueGraph::new("Inn");
        let intro = graph.create_group("Intro", Position::default());
        let a = graph.create_node("Hello", NodeKind::SingleChoice, Position::default());
        let b = graph.create_node("Menu", NodeKind::MultipleChoice, Position::default());
        let c = graph.create_node("Rumour", NodeKind::SingleChoice, Position::default());
        graph.set_group(a, Some(intro)).unwrap();
        graph.set_group(b, Some(intro)).unwrap();
        graph.link(a, 0, b).unwrap();
        graph.link(b, 0, c).unwrap();
        DialogueContainer::from_graph(&graph)
    }

    #[test]
    fn groups_and_ungrouped_are_split() {
        let c = container();
        assert_eq!(c.group_names(), vec!["Intro"]);
        assert_eq!(c.grouped_dialogue_names("Intro", false), vec!["Hello", "Menu"]);
        assert_eq!(c.ungrouped_dialogue_names(false), vec!["Rumour"]);
        assert_eq!(c.len(), 3);
    }

    #[test]
    fn starting_only_filters() {
        let c = container();
        assert_eq!(c.grouped_dialogue_names("Intro", true), vec!["Hello"]);
        assert!(c.ungrouped_dialogue_names(true).is_empty());
        assert!(c.grouped_dialogue_names("Nope", false).is_empty());
    }

    #[test]
    fn choices_reference_by_name() {
        let c = container();
        let menu = c.find(&DialogueRef::grouped("Intro", "Menu")).unwrap();
        assert_eq!(
            menu.choices[0].next_dialogue,
            Some(DialogueRef::ungrouped("Rumour"))
        );
        let rumour = c.find(&DialogueRef::ungrouped("Rumour")).unwrap();
        assert!(rumour.choices[0].next_dialogue.is_none());
        assert!(!rumour.is_starting_dialogue);
        assert!(c.find(&DialogueRef::ungrouped("Hello")).is_none());
    }
}
