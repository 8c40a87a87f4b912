//! Name sanitization and duplicate detection.

use std::collections::BTreeMap;

use crate::id::{GroupId, NodeId};

/// Strip whitespace and special characters, keeping alphanumerics and `_`.
pub fn sanitize_name(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect()
}

/// The scope in which a name clash was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DuplicateScope {
    /// Two or more ungrouped nodes share a name.
    Ungrouped,
    /// Two or more nodes in the same group share a name.
    Group(String),
    /// Two or more groups share a name.
    Groups,
}

/// One clashing name and everything that carries it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Duplicate {
    /// Where the clash was found.
    pub scope: DuplicateScope,
    /// The shared name.
    pub name: String,
    /// Nodes carrying the name (empty for group clashes).
    pub nodes: Vec<NodeId>,
    /// Groups carrying the name (empty for node clashes).
    pub groups: Vec<GroupId>,
}

/// All name clashes in a graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuplicateReport {
    /// Individual clashes, ordered by scope then name.
    pub duplicates: Vec<Duplicate>,
}

impl DuplicateReport {
    /// Whether no clashes were found.
    pub fn is_empty(&self) -> bool {
        self.duplicates.is_empty()
    }

    /// Number of clashing names.
    pub fn len(&self) -> usize {
        self.duplicates.len()
    }

    /// Whether `node` is involved in any clash.
    pub fn involves_node(&self, node: NodeId) -> bool {
        self.duplicates.iter().any(|d| d.nodes.contains(&node))
    }
}

/// Collect names seen more than once. Keys keep first-seen values in order.
pub(crate) fn clashes<K: Ord + Clone, V: Clone>(
    items: impl IntoIterator<Item = (K, V)>,
) -> BTreeMap<K, Vec<V>> {
    let mut seen: BTreeMap<K, Vec<V>> = BTreeMap::new();
    for (key, value) in items {
        seen.entry(key).or_default().push(value);
    }
    seen.retain(|_, values| values.len() > 1);
    seen
}
