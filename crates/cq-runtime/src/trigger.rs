//! Triggerable dialogues: a fixed entry point, or a router choosing between
//! nested triggers.

use std::fmt;
use std::path::Path;

use cq_logic::{LogicError, VariableStore};
use serde::{Deserialize, Serialize};

use crate::error::RuntimeResult;
use crate::router::ConditionalRouter;

/// A graph, and optionally a node in it by name. Without a node the graph's
/// start node is used.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryPoint {
    /// Graph file name.
    pub graph: String,
    /// Node name inside the graph.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<String>,
}

impl EntryPoint {
    /// Enter `graph` at its start node.
    pub fn graph(graph: impl Into<String>) -> Self {
        Self {
            graph: graph.into(),
            node: None,
        }
    }

    /// Enter `graph` at the node named `node`.
    pub fn node(graph: impl Into<String>, node: impl Into<String>) -> Self {
        Self {
            graph: graph.into(),
            node: Some(node.into()),
        }
    }
}

impl fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.node {
            Some(node) => write!(f, "{}/{node}", self.graph),
            None => write!(f, "{}", self.graph),
        }
    }
}

/// Something that starts a dialogue.
///
/// ```json
/// {"type": "conditional", "mode": "all",
///  "conditions": [{"type": "bool", "key": "met", "comparison": "is", "value": true}],
///  "onTrue": {"type": "single", "graph": "Inn", "node": "Welcome"},
///  "onFalse": {"type": "single", "graph": "Inn"}}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DialogueTrigger {
    /// Always the same entry point.
    Single(EntryPoint),
    /// Choose between two nested triggers.
    Conditional(Box<ConditionalRouter<DialogueTrigger>>),
}

impl DialogueTrigger {
    /// Follow routers down to an entry point. `None` when a router selects a
    /// branch with nothing set.
    pub fn resolve(&self, store: &VariableStore) -> Option<&EntryPoint> {
        match self {
            Self::Single(entry) => Some(entry),
            Self::Conditional(router) => router.select(store)?.resolve(store),
        }
    }

    /// Parse a trigger from JSON.
    pub fn from_json(json: &str) -> RuntimeResult<Self> {
        serde_json::from_str(json).map_err(|e| LogicError::from(e).into())
    }

    /// Read a trigger file.
    pub fn load(path: &Path) -> RuntimeResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| LogicError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }
}

impl From<EntryPoint> for DialogueTrigger {
    fn from(entry: EntryPoint) -> Self {
        Self::Single(entry)
    }
}
