use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CqError, CqResult};

/// Stable identifier of a dialogue node. Assigned at creation and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Generate a new random node ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a node ID from its persisted string form.
    pub fn parse(s: &str) -> CqResult<Self> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| CqError::InvalidId(s.to_string()))
    }

    /// Full hyphenated form, as persisted.
    pub fn to_full_string(&self) -> String {
        self.0.to_string()
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// Identifier of an organizational node group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub Uuid);

impl GroupId {
    /// Generate a new random group ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a group ID from its persisted string form.
    pub fn parse(s: &str) -> CqResult<Self> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| CqError::InvalidId(s.to_string()))
    }

    /// Full hyphenated form, as persisted.
    pub fn to_full_string(&self) -> String {
        self.0.to_string()
    }
}

impl Default for GroupId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}
