use serde::{Deserialize, Serialize};

use crate::id::GroupId;
use crate::node::Position;

/// Cosmetic cluster of nodes. Has no effect on traversal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    /// Stable identifier.
    pub id: GroupId,
    /// Display name; also the folder name of the group's assets.
    pub name: String,
    /// Editor position.
    pub position: Position,
}

impl Group {
    /// Create a group with a fresh ID.
    pub fn new(name: impl Into<String>, position: Position) -> Self {
        Self {
            id: GroupId::new(),
            name: name.into(),
            position,
        }
    }
}
