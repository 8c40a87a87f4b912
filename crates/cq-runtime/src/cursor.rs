//! Traversal over a loaded graph with back-navigation.
//!
//! A [`DialogueCursor`] holds only IDs; every call borrows the graph it walks.
//! That lets a session keep one cursor per entry point next to the graphs
//! they point into.

use cq_core::{DialogueGraph, Node, NodeId};

use crate::error::{RuntimeError, RuntimeResult};

/// Where a cursor stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    /// The next `advance` yields the entry node.
    NotStarted,
    /// Positioned on a node.
    AtNode(NodeId),
    /// The last `advance` found no way forward from this node.
    Ended(NodeId),
}

/// Pull-based traversal pointer over a [`DialogueGraph`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueCursor {
    entry: Option<NodeId>,
    current: Option<NodeId>,
    first_call: bool,
    history: Vec<NodeId>,
    ended: bool,
}

impl DialogueCursor {
    /// Cursor entering at the graph's start node.
    pub fn new(graph: &DialogueGraph) -> Self {
        Self {
            entry: None,
            current: graph.start(),
            first_call: true,
            history: Vec::new(),
            ended: false,
        }
    }

    /// Cursor entering at a specific node.
    pub fn with_entry(node: NodeId) -> Self {
        Self {
            entry: Some(node),
            current: Some(node),
            first_call: true,
            history: Vec::new(),
            ended: false,
        }
    }

    fn entry_of(&self, graph: &DialogueGraph) -> Option<NodeId> {
        self.entry.or_else(|| graph.start())
    }

    /// Move forward and return the node arrived at.
    ///
    /// The first call returns the entry node without consuming a choice.
    /// Afterwards, `Ok(None)` means the current node is terminal for `choice`;
    /// position and history are left as they were. Single-choice nodes always
    /// follow their one choice.
    pub fn advance<'g>(&mut self, graph: &'g DialogueGraph, choice: usize) -> RuntimeResult<Option<&'g Node>> {
        if self.first_call {
            let entry = self.entry_of(graph).ok_or(RuntimeError::NoStartingNode)?;
            let node = lookup(graph, entry)?;
            self.current = Some(entry);
            self.first_call = false;
            self.ended = false;
            return Ok(Some(node));
        }

        let id = self.current.ok_or(RuntimeError::NoStartingNode)?;
        let node = lookup(graph, id)?;

        if node.is_terminal(choice) {
            tracing::debug!(node = %node.name, choice, "reached end of dialogue");
            self.ended = true;
            return Ok(None);
        }

        let index = node.kind.followed_choice(choice);
        let count = node.choices.len();
        let Some(target) = node.choices.get(index).and_then(|c| c.target) else {
            tracing::error!(node = %node.name, index, count, "invalid choice index");
            return Err(RuntimeError::InvalidChoiceIndex { index, count });
        };
        let next = lookup(graph, target)?;

        self.history.push(id);
        self.current = Some(target);
        Ok(Some(next))
    }

    /// The node the cursor stands on, without moving. Before the first
    /// advance this is the entry node.
    pub fn current<'g>(&self, graph: &'g DialogueGraph) -> Option<&'g Node> {
        self.current
            .or_else(|| self.entry_of(graph))
            .and_then(|id| graph.node(id))
    }

    /// Whether following `choice` from the current node leads nowhere.
    pub fn is_terminal(&self, graph: &DialogueGraph, choice: usize) -> bool {
        self.current(graph).is_none_or(|n| n.is_terminal(choice))
    }

    /// Whether the current node offers the player a real choice.
    pub fn has_choices(&self, graph: &DialogueGraph) -> bool {
        self.current(graph).is_some_and(|n| n.choices.len() > 1)
    }

    /// Texts of the current node's choices, or `None` when there is nothing
    /// to choose between.
    pub fn choice_texts<'g>(&self, graph: &'g DialogueGraph) -> Option<Vec<&'g str>> {
        let node = self.current(graph)?;
        if node.choices.len() <= 1 {
            tracing::warn!(node = %node.name, "asked for choices but there is nothing to choose");
            return None;
        }
        Some(node.choices.iter().map(|c| c.text.as_str()).collect())
    }

    /// Step back to the previously visited node.
    ///
    /// Returns `None` and stays put when there is no history.
    pub fn go_back<'g>(&mut self, graph: &'g DialogueGraph) -> Option<&'g Node> {
        let Some(previous) = self.history.pop() else {
            tracing::warn!("no dialogue history to go back to");
            return None;
        };
        self.current = Some(previous);
        self.ended = false;
        graph.node(previous)
    }

    /// Rewind to the entry node. The next `advance` yields it again.
    pub fn reset(&mut self, graph: &DialogueGraph) {
        self.history.clear();
        self.first_call = true;
        self.ended = false;
        self.current = self.entry_of(graph);
    }

    /// Visited nodes, oldest first. Does not include the current node.
    pub fn history(&self) -> &[NodeId] {
        &self.history
    }

    /// Whether the next `advance` is the first call.
    pub fn is_start(&self) -> bool {
        self.first_call
    }

    /// Current state.
    pub fn state(&self) -> CursorState {
        match (self.first_call, self.current) {
            (true, _) | (false, None) => CursorState::NotStarted,
            (false, Some(id)) if self.ended => CursorState::Ended(id),
            (false, Some(id)) => CursorState::AtNode(id),
        }
    }
}

fn lookup(graph: &DialogueGraph, id: NodeId) -> RuntimeResult<&Node> {
    graph
        .node(id)
        .ok_or_else(|| RuntimeError::NodeNotFound(id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cq_core::{NodeKind, Position};

    /// A → B → C, all single-choice; C is terminal.
    fn line() -> (DialogueGraph, NodeId, NodeId, NodeId) {
        let mut graph = DialogueGraph::new("Line");
        let a = graph.create_node("A", NodeKind::SingleChoice, Position::default());
        let b = graph.create_node("B", NodeKind::SingleChoice, Position::default());
        let c = graph.create_node("C", NodeKind::SingleChoice, Position::default());
        graph.link(a, 0, b).unwrap();
        graph.link(b, 0, c).unwrap();
        (graph, a, b, c)
    }

    #[test]
    fn first_call_returns_start_without_history() {
        let (graph, a, b, _) = line();
        let mut cursor = DialogueCursor::new(&graph);
        assert_eq!(cursor.state(), CursorState::NotStarted);

        assert_eq!(cursor.advance(&graph, 0).unwrap().unwrap().id, a);
        assert!(cursor.history().is_empty());
        assert_eq!(cursor.state(), CursorState::AtNode(a));

        assert_eq!(cursor.advance(&graph, 0).unwrap().unwrap().id, b);
        assert_eq!(cursor.history(), &[a]);
    }

    #[test]
    fn terminal_advance_does_not_move() {
        let (graph, _, _, c) = line();
        let mut cursor = DialogueCursor::new(&graph);
        for _ in 0..3 {
            cursor.advance(&graph, 0).unwrap();
        }
        assert_eq!(cursor.current(&graph).unwrap().id, c);
        assert!(cursor.is_terminal(&graph, 0));

        let history = cursor.history().to_vec();
        assert!(cursor.advance(&graph, 0).unwrap().is_none());
        assert_eq!(cursor.current(&graph).unwrap().id, c);
        assert_eq!(cursor.history(), history.as_slice());
        assert_eq!(cursor.state(), CursorState::Ended(c));
    }

    #[test]
    fn back_navigation_round_trip() {
        let (graph, a, b, _) = line();
        let mut cursor = DialogueCursor::new(&graph);
        for _ in 0..3 {
            cursor.advance(&graph, 0).unwrap();
        }
        assert_eq!(cursor.go_back(&graph).unwrap().id, b);
        assert_eq!(cursor.go_back(&graph).unwrap().id, a);
        assert!(cursor.go_back(&graph).is_none());
        assert_eq!(cursor.current(&graph).unwrap().id, a);
    }

    #[test]
    fn advance_after_back_reenters_fresh() {
        let (graph, _, b, c) = line();
        let mut cursor = DialogueCursor::new(&graph);
        for _ in 0..3 {
            cursor.advance(&graph, 0).unwrap();
        }
        cursor.go_back(&graph);
        assert_eq!(cursor.current(&graph).unwrap().id, b);
        assert_eq!(cursor.advance(&graph, 0).unwrap().unwrap().id, c);
        assert_eq!(cursor.history().len(), 2);
    }

    #[test]
    fn invalid_choice_leaves_state() {
        let mut graph = DialogueGraph::new("Fork");
        let q = graph.create_node("Q", NodeKind::MultipleChoice, Position::default());
        let yes = graph.create_node("Yes", NodeKind::SingleChoice, Position::default());
        let no = graph.create_node("No", NodeKind::SingleChoice, Position::default());
        graph.link(q, 0, yes).unwrap();
        graph.add_choice(q, Some("No")).unwrap();
        graph.link(q, 1, no).unwrap();

        let mut cursor = DialogueCursor::new(&graph);
        cursor.advance(&graph, 0).unwrap();
        assert!(cursor.has_choices(&graph));
        assert_eq!(cursor.choice_texts(&graph).unwrap(), vec!["New Choice", "No"]);

        // Out of range on a multiple-choice node is not terminal.
        assert!(!cursor.is_terminal(&graph, 5));
        let err = cursor.advance(&graph, 5).unwrap_err();
        assert!(matches!(err, RuntimeError::InvalidChoiceIndex { index: 5, count: 2 }));
        assert_eq!(cursor.current(&graph).unwrap().id, q);
        assert!(cursor.history().is_empty());

        assert_eq!(cursor.advance(&graph, 1).unwrap().unwrap().id, no);
    }

    #[test]
    fn single_choice_ignores_index() {
        let (graph, _, b, _) = line();
        let mut cursor = DialogueCursor::new(&graph);
        cursor.advance(&graph, 0).unwrap();
        assert!(!cursor.has_choices(&graph));
        assert!(cursor.choice_texts(&graph).is_none());
        assert_eq!(cursor.advance(&graph, 9).unwrap().unwrap().id, b);
    }

    #[test]
    fn reset_rearms_first_call() {
        let (graph, a, _, _) = line();
        let mut cursor = DialogueCursor::new(&graph);
        cursor.advance(&graph, 0).unwrap();
        cursor.advance(&graph, 0).unwrap();

        cursor.reset(&graph);
        assert!(cursor.is_start());
        assert!(cursor.history().is_empty());
        assert_eq!(cursor.current(&graph).unwrap().id, a);
        assert_eq!(cursor.advance(&graph, 0).unwrap().unwrap().id, a);
    }

    #[test]
    fn with_entry_starts_mid_graph() {
        let (graph, _, b, c) = line();
        let mut cursor = DialogueCursor::with_entry(b);
        assert_eq!(cursor.advance(&graph, 0).unwrap().unwrap().id, b);
        assert_eq!(cursor.advance(&graph, 0).unwrap().unwrap().id, c);
        cursor.reset(&graph);
        assert_eq!(cursor.current(&graph).unwrap().id, b);
    }

    #[test]
    fn no_start_is_an_error() {
        let mut graph = DialogueGraph::new("Loop");
        let a = graph.create_node("A", NodeKind::SingleChoice, Position::default());
        graph.link(a, 0, a).unwrap();
        let mut cursor = DialogueCursor::new(&graph);
        assert!(matches!(
            cursor.advance(&graph, 0),
            Err(RuntimeError::NoStartingNode)
        ));
    }

    #[test]
    fn cycles_are_walkable() {
        let (mut graph, a, _, c) = line();
        let start = graph.create_node("Start", NodeKind::SingleChoice, Position::default());
        graph.link(start, 0, a).unwrap();
        graph.link(c, 0, a).unwrap();
        let mut cursor = DialogueCursor::new(&graph);
        assert_eq!(cursor.advance(&graph, 0).unwrap().unwrap().id, start);
        for _ in 0..10 {
            assert!(cursor.advance(&graph, 0).unwrap().is_some());
        }
        assert_eq!(cursor.history().len(), 10);
    }
}
