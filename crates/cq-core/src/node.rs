use std::fmt;

use serde::{Deserialize, Serialize};

use crate::id::{GroupId, NodeId};

/// Default text of the choice a single-choice node starts with.
pub const SINGLE_CHOICE_TEXT: &str = "Next Dialogue";
/// Default text of choices added to a multiple-choice node.
pub const MULTIPLE_CHOICE_TEXT: &str = "New Choice";

/// Editor canvas position. Cosmetic only; never affects traversal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate.
    pub y: f32,
}

impl Position {
    /// Create a position from coordinates.
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// How a node presents and consumes its outgoing choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// Exactly one choice, followed automatically on advance.
    SingleChoice,
    /// One or more choices presented to the player.
    MultipleChoice,
}

impl NodeKind {
    /// The choices a freshly created node of this kind starts with.
    pub fn initial_choices(self) -> Vec<Choice> {
        match self {
            Self::SingleChoice => vec![Choice::new(SINGLE_CHOICE_TEXT)],
            Self::MultipleChoice => vec![Choice::new(MULTIPLE_CHOICE_TEXT)],
        }
    }

    /// Whether choices can be appended after creation.
    pub fn accepts_new_choices(self) -> bool {
        matches!(self, Self::MultipleChoice)
    }

    /// The choice actually followed when the player picks `requested`.
    ///
    /// Single-choice nodes ignore the request and always follow choice 0.
    pub fn followed_choice(self, requested: usize) -> usize {
        match self {
            Self::SingleChoice => 0,
            Self::MultipleChoice => requested,
        }
    }

    /// Parse a kind from user input (`single`, `multiple`, or the full names).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "single" | "singlechoice" | "single_choice" | "single-choice" => {
                Some(Self::SingleChoice)
            }
            "multiple" | "multi" | "multiplechoice" | "multiple_choice" | "multiple-choice" => {
                Some(Self::MultipleChoice)
            }
            _ => None,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SingleChoice => write!(f, "single"),
            Self::MultipleChoice => write!(f, "multiple"),
        }
    }
}

/// One outgoing edge of a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    /// Text shown for this option.
    pub text: String,
    /// Node this choice leads to. `None` ends the dialogue branch.
    pub target: Option<NodeId>,
}

impl Choice {
    /// Create an unlinked choice.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            target: None,
        }
    }

    /// Create a choice linked to `target`.
    pub fn to(text: impl Into<String>, target: NodeId) -> Self {
        Self {
            text: text.into(),
            target: Some(target),
        }
    }
}

/// A single dialogue beat: text plus its outgoing choices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Stable identifier.
    pub id: NodeId,
    /// Human identifier; should be unique within its scope but is not enforced.
    pub name: String,
    /// Body text.
    pub text: String,
    /// Choice behaviour.
    pub kind: NodeKind,
    /// Ordered outgoing choices. Order is display order.
    pub choices: Vec<Choice>,
    /// Organizational group, if any.
    pub group: Option<GroupId>,
    /// Editor position.
    pub position: Position,
}

impl Node {
    /// Create a node with a fresh ID and the kind's initial choices.
    pub fn new(name: impl Into<String>, kind: NodeKind, position: Position) -> Self {
        Self::with_id(NodeId::new(), name, kind, position)
    }

    /// Create a node with a pre-assigned ID, as done when loading records.
    pub fn with_id(id: NodeId, name: impl Into<String>, kind: NodeKind, position: Position) -> Self {
        Self {
            id,
            name: name.into(),
            text: String::new(),
            kind,
            choices: kind.initial_choices(),
            group: None,
            position,
        }
    }

    /// Set the body text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Whether following `choice` leads nowhere.
    ///
    /// A node without choices is always terminal. An out-of-range index on a
    /// multiple-choice node is not terminal; it is an invalid request.
    pub fn is_terminal(&self, choice: usize) -> bool {
        if self.choices.is_empty() {
            return true;
        }
        let index = self.kind.followed_choice(choice);
        match self.choices.get(index) {
            Some(c) => c.target.is_none(),
            None => false,
        }
    }

    /// IDs of all nodes this node links to, in choice order.
    pub fn targets(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.choices.iter().filter_map(|c| c.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_choice_starts_with_one_choice() {
        let node = Node::new("Greeting", NodeKind::SingleChoice, Position::default());
        assert_eq!(node.choices.len(), 1);
        assert_eq!(node.choices[0].text, SINGLE_CHOICE_TEXT);
        assert!(node.choices[0].target.is_none());
    }

    #[test]
    fn multiple_choice_starts_with_one_choice() {
        let node = Node::new("Question", NodeKind::MultipleChoice, Position::default());
        assert_eq!(node.choices.len(), 1);
        assert_eq!(node.choices[0].text, MULTIPLE_CHOICE_TEXT);
    }

    #[test]
    fn single_choice_ignores_requested_index() {
        assert_eq!(NodeKind::SingleChoice.followed_choice(3), 0);
        assert_eq!(NodeKind::MultipleChoice.followed_choice(3), 3);
    }

    #[test]
    fn terminal_detection() {
        let target = NodeId::new();
        let mut node = Node::new("Q", NodeKind::MultipleChoice, Position::default());
        node.choices = vec![Choice::to("Yes", target), Choice::new("No")];

        assert!(!node.is_terminal(0));
        assert!(node.is_terminal(1));
        assert!(!node.is_terminal(7));

        node.choices.clear();
        assert!(node.is_terminal(0));
    }

    #[test]
    fn kind_parse_accepts_short_and_long_forms() {
        assert_eq!(NodeKind::parse("single"), Some(NodeKind::SingleChoice));
        assert_eq!(NodeKind::parse("MultipleChoice"), Some(NodeKind::MultipleChoice));
        assert_eq!(NodeKind::parse("multi"), Some(NodeKind::MultipleChoice));
        assert_eq!(NodeKind::parse("branching"), None);
    }
}
