use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

use crate::error::{CqError, CqResult};
use crate::group::Group;
use crate::id::{GroupId, NodeId};
use crate::names::{Duplicate, DuplicateReport, DuplicateScope, clashes, sanitize_name};
use crate::node::{Choice, MULTIPLE_CHOICE_TEXT, Node, NodeKind, Position};

/// A dialogue graph. Owns all nodes and groups.
///
/// Nodes live in one vector in creation order; choices refer to other nodes
/// by [`NodeId`], resolved through an ID index.
#[derive(Debug, Clone)]
pub struct DialogueGraph {
    /// File name the graph is saved under.
    pub file_name: String,
    nodes: Vec<Node>,
    groups: Vec<Group>,
    start: Option<NodeId>,

    // Indexes
    by_id: HashMap<NodeId, usize>,
}

impl DialogueGraph {
    /// Create an empty graph. The file name is sanitized.
    pub fn new(file_name: &str) -> Self {
        Self {
            file_name: sanitize_name(file_name),
            nodes: Vec::new(),
            groups: Vec::new(),
            start: None,
            by_id: HashMap::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Nodes
    // -----------------------------------------------------------------------

    /// Create a node with a fresh ID and the kind's initial choices.
    pub fn create_node(&mut self, name: &str, kind: NodeKind, position: Position) -> NodeId {
        let node = Node::new(sanitize_name(name), kind, position);
        let id = node.id;
        self.by_id.insert(id, self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Insert a fully built node, keeping its ID. Choice targets are not checked.
    pub fn insert_node(&mut self, node: Node) -> CqResult<NodeId> {
        if self.by_id.contains_key(&node.id) {
            return Err(CqError::Validation(format!("node id {} used twice", node.id)));
        }
        if let Some(group) = node.group {
            if self.group(group).is_none() {
                return Err(CqError::GroupNotFound(group));
            }
        }
        let id = node.id;
        self.by_id.insert(id, self.nodes.len());
        self.nodes.push(node);
        Ok(id)
    }

    /// Remove a node. Every choice that pointed at it becomes unlinked.
    pub fn remove_node(&mut self, id: NodeId) -> CqResult<Node> {
        let index = self.by_id.get(&id).copied().ok_or(CqError::NodeNotFound(id))?;
        let node = self.nodes.remove(index);
        self.reindex();

        for other in &mut self.nodes {
            for choice in &mut other.choices {
                if choice.target == Some(id) {
                    choice.target = None;
                }
            }
        }
        if self.start == Some(id) {
            self.start = None;
        }
        Ok(node)
    }

    fn reindex(&mut self) {
        self.by_id = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id, i))
            .collect();
    }

    /// Get a node by ID.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.by_id.get(&id).map(|&i| &self.nodes[i])
    }

    /// Get a mutable node by ID.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        match self.by_id.get(&id) {
            Some(&i) => Some(&mut self.nodes[i]),
            None => None,
        }
    }

    fn require_mut(&mut self, id: NodeId) -> CqResult<&mut Node> {
        self.node_mut(id).ok_or(CqError::NodeNotFound(id))
    }

    /// All nodes in creation order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Whether the graph contains `id`.
    pub fn contains(&self, id: NodeId) -> bool {
        self.by_id.contains_key(&id)
    }

    /// First node with the given name (exact match).
    pub fn find_by_name(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// Rename a node. The name is sanitized.
    pub fn rename_node(&mut self, id: NodeId, name: &str) -> CqResult<()> {
        self.require_mut(id)?.name = sanitize_name(name);
        Ok(())
    }

    /// Replace a node's body text.
    pub fn set_node_text(&mut self, id: NodeId, text: impl Into<String>) -> CqResult<()> {
        self.require_mut(id)?.text = text.into();
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Choices
    // -----------------------------------------------------------------------

    /// Append an unlinked choice to a multiple-choice node.
    pub fn add_choice(&mut self, id: NodeId, text: Option<&str>) -> CqResult<usize> {
        let node = self.require_mut(id)?;
        if !node.kind.accepts_new_choices() {
            tracing::warn!(node = %node.name, "cannot add a choice to a single-choice node");
            return Err(CqError::SingleChoiceFixed(id));
        }
        node.choices
            .push(Choice::new(text.unwrap_or(MULTIPLE_CHOICE_TEXT)));
        Ok(node.choices.len() - 1)
    }

    /// Remove a choice. The last remaining choice of a node cannot be removed.
    pub fn remove_choice(&mut self, id: NodeId, index: usize) -> CqResult<Choice> {
        let node = self.require_mut(id)?;
        let count = node.choices.len();
        if index >= count {
            return Err(CqError::InvalidChoiceIndex { index, count });
        }
        if count == 1 {
            tracing::warn!(node = %node.name, "refusing to remove the only choice");
            return Err(CqError::LastChoice(id));
        }
        Ok(node.choices.remove(index))
    }

    /// Replace the text of a choice.
    pub fn set_choice_text(&mut self, id: NodeId, index: usize, text: impl Into<String>) -> CqResult<()> {
        let choice = self.choice_mut(id, index)?;
        choice.text = text.into();
        Ok(())
    }

    /// Point a choice at `target`, which must belong to this graph.
    pub fn link(&mut self, id: NodeId, index: usize, target: NodeId) -> CqResult<()> {
        if !self.contains(target) {
            return Err(CqError::NodeNotFound(target));
        }
        self.choice_mut(id, index)?.target = Some(target);
        Ok(())
    }

    /// Clear a choice's target. Returns the previous target, if any.
    pub fn unlink(&mut self, id: NodeId, index: usize) -> CqResult<Option<NodeId>> {
        Ok(self.choice_mut(id, index)?.target.take())
    }

    fn choice_mut(&mut self, id: NodeId, index: usize) -> CqResult<&mut Choice> {
        let node = self.require_mut(id)?;
        let count = node.choices.len();
        node.choices
            .get_mut(index)
            .ok_or(CqError::InvalidChoiceIndex { index, count })
    }

    /// Total number of choices across all nodes.
    pub fn choice_count(&self) -> usize {
        self.nodes.iter().map(|n| n.choices.len()).sum()
    }

    // -----------------------------------------------------------------------
    // Groups
    // -----------------------------------------------------------------------

    /// Create a group. The name is sanitized.
    pub fn create_group(&mut self, name: &str, position: Position) -> GroupId {
        let group = Group::new(sanitize_name(name), position);
        let id = group.id;
        self.groups.push(group);
        id
    }

    /// Insert a fully built group, keeping its ID.
    pub fn insert_group(&mut self, group: Group) -> CqResult<GroupId> {
        if self.group(group.id).is_some() {
            return Err(CqError::Validation(format!("group id {} used twice", group.id)));
        }
        let id = group.id;
        self.groups.push(group);
        Ok(id)
    }

    /// Remove a group. Its members become ungrouped.
    pub fn remove_group(&mut self, id: GroupId) -> CqResult<Group> {
        let index = self
            .groups
            .iter()
            .position(|g| g.id == id)
            .ok_or(CqError::GroupNotFound(id))?;
        for node in &mut self.nodes {
            if node.group == Some(id) {
                node.group = None;
            }
        }
        Ok(self.groups.remove(index))
    }

    /// Get a group by ID.
    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }

    /// First group with the given name.
    pub fn find_group_by_name(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// All groups in creation order.
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Move a node into a group, or out of any group with `None`.
    pub fn set_group(&mut self, id: NodeId, group: Option<GroupId>) -> CqResult<()> {
        if let Some(g) = group {
            if self.group(g).is_none() {
                return Err(CqError::GroupNotFound(g));
            }
        }
        self.require_mut(id)?.group = group;
        Ok(())
    }

    /// Nodes belonging to `group`, in creation order.
    pub fn group_members(&self, group: GroupId) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(move |n| n.group == Some(group))
    }

    // -----------------------------------------------------------------------
    // Structure
    // -----------------------------------------------------------------------

    /// Choices pointing at `id`, as `(source node, choice index)` pairs.
    pub fn incoming(&self, id: NodeId) -> Vec<(NodeId, usize)> {
        self.nodes
            .iter()
            .flat_map(|n| {
                n.choices
                    .iter()
                    .enumerate()
                    .filter(move |(_, c)| c.target == Some(id))
                    .map(move |(i, _)| (n.id, i))
            })
            .collect()
    }

    fn linked_targets(&self) -> HashSet<NodeId> {
        self.nodes.iter().flat_map(|n| n.targets()).collect()
    }

    /// A node is a starting node iff no choice in the graph targets it.
    pub fn is_starting_node(&self, id: NodeId) -> bool {
        self.contains(id) && !self.nodes.iter().any(|n| n.targets().any(|t| t == id))
    }

    /// All starting nodes in creation order.
    pub fn starting_nodes(&self) -> Vec<&Node> {
        let targets = self.linked_targets();
        self.nodes
            .iter()
            .filter(|n| !targets.contains(&n.id))
            .collect()
    }

    /// The node a fresh playthrough begins at.
    ///
    /// The designated start if one was set, otherwise the first starting node.
    pub fn start(&self) -> Option<NodeId> {
        match self.start {
            Some(id) if self.contains(id) => Some(id),
            _ => self.starting_nodes().first().map(|n| n.id),
        }
    }

    /// The explicitly designated start node, if any.
    pub fn designated_start(&self) -> Option<NodeId> {
        self.start
    }

    /// Designate the start node.
    pub fn set_start(&mut self, id: NodeId) -> CqResult<()> {
        if !self.contains(id) {
            return Err(CqError::NodeNotFound(id));
        }
        self.start = Some(id);
        Ok(())
    }

    /// Clear the designated start; [`start`](Self::start) falls back to the first starting node.
    pub fn clear_start(&mut self) {
        self.start = None;
    }

    /// Every node reachable from `from`, including itself. Cycles are fine.
    pub fn reachable_from(&self, from: NodeId) -> HashSet<NodeId> {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::new();
        if self.contains(from) {
            queue.push_back(from);
        }
        while let Some(id) = queue.pop_front() {
            if !seen.insert(id) {
                continue;
            }
            if let Some(node) = self.node(id) {
                queue.extend(node.targets().filter(|t| !seen.contains(t)));
            }
        }
        seen
    }

    // -----------------------------------------------------------------------
    // Integrity
    // -----------------------------------------------------------------------

    /// Name clashes: ungrouped nodes by name, grouped nodes by (group, name),
    /// and groups by name. Advisory only.
    pub fn find_duplicate_names(&self) -> DuplicateReport {
        let mut duplicates = Vec::new();

        let ungrouped = clashes(
            self.nodes
                .iter()
                .filter(|n| n.group.is_none())
                .map(|n| (n.name.clone(), n.id)),
        );
        for (name, nodes) in ungrouped {
            duplicates.push(Duplicate {
                scope: DuplicateScope::Ungrouped,
                name,
                nodes,
                groups: Vec::new(),
            });
        }

        for group in &self.groups {
            let grouped = clashes(self.group_members(group.id).map(|n| (n.name.clone(), n.id)));
            for (name, nodes) in grouped {
                duplicates.push(Duplicate {
                    scope: DuplicateScope::Group(group.name.clone()),
                    name,
                    nodes,
                    groups: Vec::new(),
                });
            }
        }

        let groups = clashes(self.groups.iter().map(|g| (g.name.clone(), g.id)));
        for (name, groups) in groups {
            duplicates.push(Duplicate {
                scope: DuplicateScope::Groups,
                name,
                nodes: Vec::new(),
                groups,
            });
        }

        DuplicateReport { duplicates }
    }

    /// Authoring problems found in the graph.
    pub fn validate(&self) -> Vec<GraphIssue> {
        let mut issues = Vec::new();

        for node in &self.nodes {
            if node.name.is_empty() {
                issues.push(GraphIssue::EmptyNodeName { node: node.id });
            }
            if node.choices.is_empty() {
                issues.push(GraphIssue::NoChoices {
                    name: node.name.clone(),
                });
            } else if node.kind == NodeKind::SingleChoice && node.choices.len() != 1 {
                issues.push(GraphIssue::SingleChoiceArity {
                    name: node.name.clone(),
                    count: node.choices.len(),
                });
            }
        }
        for group in &self.groups {
            if group.name.is_empty() {
                issues.push(GraphIssue::EmptyGroupName { group: group.id });
            }
        }
        for duplicate in self.find_duplicate_names().duplicates {
            issues.push(GraphIssue::DuplicateName(duplicate));
        }

        match self.start() {
            None if !self.nodes.is_empty() => issues.push(GraphIssue::NoStartingNode),
            None => {}
            Some(start) => {
                // Every starting node is an entry point, not only the designated one.
                let mut reachable = self.reachable_from(start);
                for entry in self.starting_nodes() {
                    reachable.extend(self.reachable_from(entry.id));
                }
                for node in &self.nodes {
                    if !reachable.contains(&node.id) {
                        issues.push(GraphIssue::Unreachable {
                            name: node.name.clone(),
                        });
                    }
                }
            }
        }

        issues
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of groups.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }
}

/// A problem reported by [`DialogueGraph::validate`].
#[derive(Debug, Clone, PartialEq)]
pub enum GraphIssue {
    /// A node has an empty name.
    EmptyNodeName {
        /// The offending node.
        node: NodeId,
    },
    /// A group has an empty name.
    EmptyGroupName {
        /// The offending group.
        group: GroupId,
    },
    /// A name is used more than once in its scope.
    DuplicateName(Duplicate),
    /// Every node is the target of some choice, so nothing can start.
    NoStartingNode,
    /// A node has no choices at all.
    NoChoices {
        /// Node name.
        name: String,
    },
    /// A single-choice node carries other than one choice.
    SingleChoiceArity {
        /// Node name.
        name: String,
        /// Number of choices found.
        count: usize,
    },
    /// A node cannot be reached from any starting node.
    Unreachable {
        /// Node name.
        name: String,
    },
}

impl GraphIssue {
    /// Errors make the graph unsaveable or unplayable; everything else is a warning.
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyNodeName { .. }
                | Self::EmptyGroupName { .. }
                | Self::DuplicateName(_)
                | Self::NoStartingNode
        )
    }

    /// Name problems. Assets are keyed by name, so these refuse a save.
    pub fn blocks_save(&self) -> bool {
        matches!(
            self,
            Self::EmptyNodeName { .. } | Self::EmptyGroupName { .. } | Self::DuplicateName(_)
        )
    }
}

impl fmt::Display for GraphIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyNodeName { node } => write!(f, "node {node} has an empty name"),
            Self::EmptyGroupName { group } => write!(f, "group {group} has an empty name"),
            Self::DuplicateName(d) => match &d.scope {
                DuplicateScope::Ungrouped => {
                    write!(f, "{} ungrouped nodes are named \"{}\"", d.nodes.len(), d.name)
                }
                DuplicateScope::Group(group) => write!(
                    f,
                    "{} nodes in group \"{group}\" are named \"{}\"",
                    d.nodes.len(),
                    d.name
                ),
                DuplicateScope::Groups => {
                    write!(f, "{} groups are named \"{}\"", d.groups.len(), d.name)
                }
            },
            Self::NoStartingNode => write!(f, "no starting node (every node has an incoming link)"),
            Self::NoChoices { name } => write!(f, "node \"{name}\" has no choices"),
            Self::SingleChoiceArity { name, count } => {
                write!(f, "single-choice node \"{name}\" has {count} choices")
            }
            Self::Unreachable { name } => write!(f, "node \"{name}\" is unreachable"),
        }
    }
}
