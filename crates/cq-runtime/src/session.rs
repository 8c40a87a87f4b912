//! Play sessions: graphs, variables, and cursors owned together.

use std::collections::HashMap;

use cq_core::storage::{self, BlobStore};
use cq_core::{DialogueGraph, Node, sanitize_name};
use cq_logic::{Modifier, VariableNames, VariableStore, apply_all};

use crate::config::SessionConfig;
use crate::cursor::DialogueCursor;
use crate::error::{RuntimeError, RuntimeResult};
use crate::trigger::{DialogueTrigger, EntryPoint};

/// A play session.
///
/// Owns the variable store, the loaded graphs, and one cursor per entry
/// point that has been started. At most one dialogue is active at a time.
#[derive(Debug)]
pub struct DialogueSession {
    store: VariableStore,
    config: SessionConfig,
    graphs: HashMap<String, DialogueGraph>,
    cursors: HashMap<EntryPoint, DialogueCursor>,
    active: Option<EntryPoint>,
}

impl DialogueSession {
    /// Create a session with variables initialized from `names`.
    pub fn new(names: &VariableNames, config: SessionConfig) -> Self {
        Self::with_store(VariableStore::from_names(names), config)
    }

    /// Create a session around an existing store.
    pub fn with_store(store: VariableStore, config: SessionConfig) -> Self {
        Self {
            store,
            config,
            graphs: HashMap::new(),
            cursors: HashMap::new(),
            active: None,
        }
    }

    /// Session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Session variables.
    pub fn store(&self) -> &VariableStore {
        &self.store
    }

    /// Mutable session variables.
    pub fn store_mut(&mut self) -> &mut VariableStore {
        &mut self.store
    }

    // -----------------------------------------------------------------------
    // Graph library
    // -----------------------------------------------------------------------

    /// Add a graph, keyed by its sanitized file name. Replaces any graph of
    /// that name and drops cursors into the old one.
    pub fn add_graph(&mut self, graph: DialogueGraph) {
        let name = sanitize_name(&graph.file_name);
        self.cursors.retain(|entry, _| entry.graph != name);
        if self.active.as_ref().is_some_and(|e| e.graph == name) {
            self.active = None;
        }
        tracing::debug!(graph = %name, nodes = graph.node_count(), "graph added to session");
        self.graphs.insert(name, graph);
    }

    /// Load a graph from storage using the session's load options.
    pub fn load_graph(&mut self, store: &impl BlobStore, file_name: &str) -> RuntimeResult<()> {
        let graph = storage::load(store, file_name, &self.config.load_options)?;
        self.add_graph(graph);
        Ok(())
    }

    /// A loaded graph by file name.
    pub fn graph(&self, name: &str) -> Option<&DialogueGraph> {
        self.graphs.get(&sanitize_name(name))
    }

    /// Names of all loaded graphs, sorted.
    pub fn graph_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.graphs.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    // -----------------------------------------------------------------------
    // Playback
    // -----------------------------------------------------------------------

    /// Resolve `trigger` against the session variables and start the
    /// selected dialogue. `Ok(None)` when the trigger selects nothing.
    pub fn start(&mut self, trigger: &DialogueTrigger) -> RuntimeResult<Option<&Node>> {
        let Some(entry) = trigger.resolve(&self.store).cloned() else {
            return Ok(None);
        };
        self.start_entry(entry).map(Some)
    }

    /// Start (or, without `reset_on_start`, resume) the dialogue at `entry`
    /// and return its current node. Graph and node names are matched in
    /// sanitized form, the same way they are stored.
    pub fn start_entry(&mut self, entry: EntryPoint) -> RuntimeResult<&Node> {
        let entry = EntryPoint {
            graph: sanitize_name(&entry.graph),
            node: entry.node.as_deref().map(sanitize_name),
        };
        let graph = self
            .graphs
            .get(&entry.graph)
            .ok_or_else(|| RuntimeError::GraphNotLoaded(entry.graph.clone()))?;

        let resume = !self.config.reset_on_start && self.cursors.contains_key(&entry);
        if !resume {
            let cursor = match &entry.node {
                Some(name) => {
                    let node = graph
                        .find_by_name(name)
                        .ok_or_else(|| RuntimeError::NodeNotFound(format!("{}/{name}", entry.graph)))?;
                    DialogueCursor::with_entry(node.id)
                }
                None => DialogueCursor::new(graph),
            };
            self.cursors.insert(entry.clone(), cursor);
        }
        tracing::debug!(%entry, resume, "dialogue started");

        let cursor = self
            .cursors
            .get_mut(&entry)
            .ok_or(RuntimeError::NoActiveDialogue)?;
        let node = if cursor.is_start() {
            cursor.advance(graph, 0)?
        } else {
            cursor.current(graph)
        };
        self.active = Some(entry);
        node.ok_or(RuntimeError::NoStartingNode)
    }

    fn active_parts(&mut self) -> RuntimeResult<(&DialogueGraph, &mut DialogueCursor)> {
        let entry = self.active.as_ref().ok_or(RuntimeError::NoActiveDialogue)?;
        let graph = self
            .graphs
            .get(&entry.graph)
            .ok_or_else(|| RuntimeError::GraphNotLoaded(entry.graph.clone()))?;
        let cursor = self
            .cursors
            .get_mut(entry)
            .ok_or(RuntimeError::NoActiveDialogue)?;
        Ok((graph, cursor))
    }

    /// Advance the active dialogue. `Ok(None)` at the end.
    pub fn advance(&mut self, choice: usize) -> RuntimeResult<Option<&Node>> {
        let (graph, cursor) = self.active_parts()?;
        cursor.advance(graph, choice)
    }

    /// Step the active dialogue back one node.
    pub fn go_back(&mut self) -> RuntimeResult<Option<&Node>> {
        let (graph, cursor) = self.active_parts()?;
        Ok(cursor.go_back(graph))
    }

    /// Restart the active dialogue from its entry node.
    pub fn restart(&mut self) -> RuntimeResult<()> {
        let (graph, cursor) = self.active_parts()?;
        cursor.reset(graph);
        Ok(())
    }

    /// The active dialogue's current node.
    pub fn current(&self) -> Option<&Node> {
        let entry = self.active.as_ref()?;
        let graph = self.graphs.get(&entry.graph)?;
        self.cursors.get(entry)?.current(graph)
    }

    /// The active dialogue's cursor.
    pub fn cursor(&self) -> Option<&DialogueCursor> {
        self.cursors.get(self.active.as_ref()?)
    }

    /// Whether following `choice` would end the active dialogue.
    pub fn is_terminal(&self, choice: usize) -> bool {
        match (self.active.as_ref(), self.cursor()) {
            (Some(entry), Some(cursor)) => self
                .graphs
                .get(&entry.graph)
                .is_none_or(|graph| cursor.is_terminal(graph, choice)),
            _ => true,
        }
    }

    /// The running dialogue's entry point.
    pub fn active(&self) -> Option<&EntryPoint> {
        self.active.as_ref()
    }

    /// Stop the active dialogue. Its cursor is kept for resuming.
    pub fn end(&mut self) {
        if let Some(entry) = self.active.take() {
            tracing::debug!(%entry, "dialogue ended");
        }
    }

    /// Apply one modifier to the session variables. Failures are logged.
    pub fn apply(&mut self, modifier: &Modifier) -> bool {
        modifier.apply_logged(&mut self.store)
    }

    /// Apply modifiers in order. Returns how many succeeded.
    pub fn apply_all(&mut self, modifiers: &[Modifier]) -> usize {
        apply_all(modifiers, &mut self.store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cq_core::{MemoryStore, NodeKind, Position};
    use cq_logic::{BoolComparison, BoolOperation, Condition, ConditionMode, IntOperation};

    use crate::router::ConditionalRouter;

    fn inn() -> DialogueGraph {
        let mut graph = DialogueGraph::new("Inn");
        let hello = graph.create_node("Hello", NodeKind::SingleChoice, Position::default());
        let menu = graph.create_node("Menu", NodeKind::MultipleChoice, Position::default());
        let ale = graph.create_node("Ale", NodeKind::SingleChoice, Position::default());
        let welcome = graph.create_node("WelcomeBack", NodeKind::SingleChoice, Position::default());
        graph.link(hello, 0, menu).unwrap();
        graph.link(menu, 0, ale).unwrap();
        graph.add_choice(menu, Some("Leave")).unwrap();
        graph.link(welcome, 0, menu).unwrap();
        graph
    }

    fn session(config: SessionConfig) -> DialogueSession {
        let names = VariableNames::new().with_bool("met").with_int("gold");
        let mut session = DialogueSession::new(&names, config);
        session.add_graph(inn());
        session
    }

    fn returning_trigger() -> DialogueTrigger {
        DialogueTrigger::Conditional(Box::new(
            ConditionalRouter::new(ConditionMode::All)
                .with_condition(Condition::bool("met", BoolComparison::Is, true))
                .if_true(DialogueTrigger::from(EntryPoint::node("Inn", "WelcomeBack")))
                .if_false(DialogueTrigger::from(EntryPoint::graph("Inn"))),
        ))
    }

    #[test]
    fn trigger_selects_entry() {
        let mut s = session(SessionConfig::default());
        let trigger = returning_trigger();
        assert_eq!(s.start(&trigger).unwrap().unwrap().name, "Hello");

        s.apply(&Modifier::bool("met", BoolOperation::Set, true));
        assert_eq!(s.start(&trigger).unwrap().unwrap().name, "WelcomeBack");
        assert_eq!(s.active(), Some(&EntryPoint::node("Inn", "WelcomeBack")));
    }

    #[test]
    fn play_through_to_end() {
        let mut s = session(SessionConfig::default());
        s.start_entry(EntryPoint::graph("Inn")).unwrap();
        assert_eq!(s.advance(0).unwrap().unwrap().name, "Menu");
        assert!(!s.is_terminal(0));
        assert!(s.is_terminal(1));
        assert!(s.advance(1).unwrap().is_none());
        assert_eq!(s.current().unwrap().name, "Menu");
        assert_eq!(s.advance(0).unwrap().unwrap().name, "Ale");
        assert_eq!(s.go_back().unwrap().unwrap().name, "Menu");
    }

    #[test]
    fn reset_on_start_restarts() {
        let mut s = session(SessionConfig::default());
        s.start_entry(EntryPoint::graph("Inn")).unwrap();
        s.advance(0).unwrap();
        s.end();
        assert!(s.current().is_none());
        assert_eq!(s.start_entry(EntryPoint::graph("Inn")).unwrap().name, "Hello");
    }

    #[test]
    fn resume_when_not_resetting() {
        let mut s = session(SessionConfig::default().with_reset_on_start(false));
        s.start_entry(EntryPoint::graph("Inn")).unwrap();
        s.advance(0).unwrap();
        s.end();
        assert_eq!(s.start_entry(EntryPoint::graph("Inn")).unwrap().name, "Menu");
        assert_eq!(s.cursor().unwrap().history().len(), 1);
    }

    #[test]
    fn restart_rewinds_active() {
        let mut s = session(SessionConfig::default());
        s.start_entry(EntryPoint::graph("Inn")).unwrap();
        s.advance(0).unwrap();
        s.restart().unwrap();
        assert_eq!(s.advance(0).unwrap().unwrap().name, "Hello");
    }

    #[test]
    fn errors_without_active_dialogue() {
        let mut s = session(SessionConfig::default());
        assert!(matches!(s.advance(0), Err(RuntimeError::NoActiveDialogue)));
        assert!(matches!(s.go_back(), Err(RuntimeError::NoActiveDialogue)));
        assert!(s.is_terminal(0));
    }

    #[test]
    fn unknown_graph_and_node() {
        let mut s = session(SessionConfig::default());
        assert!(matches!(
            s.start_entry(EntryPoint::graph("Castle")),
            Err(RuntimeError::GraphNotLoaded(_))
        ));
        assert!(matches!(
            s.start_entry(EntryPoint::node("Inn", "Nobody")),
            Err(RuntimeError::NodeNotFound(_))
        ));
        assert!(s.active().is_none());
    }

    #[test]
    fn trigger_with_missing_branch_starts_nothing() {
        let mut s = session(SessionConfig::default());
        let trigger = DialogueTrigger::Conditional(Box::new(
            ConditionalRouter::new(ConditionMode::All)
                .with_condition(Condition::bool("met", BoolComparison::Is, true))
                .if_true(DialogueTrigger::from(EntryPoint::graph("Inn"))),
        ));
        assert!(s.start(&trigger).unwrap().is_none());
        assert!(s.active().is_none());
    }

    #[test]
    fn apply_all_counts_successes() {
        let mut s = session(SessionConfig::default());
        let applied = s.apply_all(&[
            Modifier::int("gold", IntOperation::Add, 5),
            Modifier::int("gold", IntOperation::Divide, 0),
            Modifier::int("silver", IntOperation::Add, 1),
        ]);
        assert_eq!(applied, 1);
        assert_eq!(s.store().get_int("gold").unwrap(), 5);
    }

    #[test]
    fn load_graph_from_storage() {
        let mut blobs = MemoryStore::new();
        storage::save(&mut blobs, &inn()).unwrap();

        let mut s = DialogueSession::new(&VariableNames::new(), SessionConfig::default());
        s.load_graph(&blobs, "Inn").unwrap();
        assert_eq!(s.graph_names(), vec!["Inn"]);
        assert_eq!(s.start_entry(EntryPoint::graph("Inn")).unwrap().name, "Hello");
        assert!(matches!(
            s.load_graph(&blobs, "Castle"),
            Err(RuntimeError::Core(_))
        ));
    }

    #[test]
    fn entry_names_match_in_sanitized_form() {
        let mut blobs = MemoryStore::new();
        let mut graph = inn();
        graph.file_name = "My Inn".to_string();
        storage::save(&mut blobs, &graph).unwrap();

        let mut s = DialogueSession::new(&VariableNames::new(), SessionConfig::default());
        s.load_graph(&blobs, "My Inn").unwrap();
        assert!(s.graph("My Inn").is_some());
        assert_eq!(s.start_entry(EntryPoint::graph("My Inn")).unwrap().name, "Hello");
        assert_eq!(s.active(), Some(&EntryPoint::graph("MyInn")));
        assert_eq!(
            s.start_entry(EntryPoint::node("My Inn", "Welcome Back")).unwrap().name,
            "WelcomeBack"
        );
    }

    #[test]
    fn trigger_file_and_graph_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let mut fs_store = cq_core::FsStore::new(dir.path());
        storage::save(&mut fs_store, &inn()).unwrap();

        let trigger_path = dir.path().join("trigger.json");
        std::fs::write(&trigger_path, serde_json::to_string(&returning_trigger()).unwrap()).unwrap();
        let trigger = DialogueTrigger::load(&trigger_path).unwrap();

        let names = VariableNames::new().with_bool("met");
        let mut s = DialogueSession::new(&names, SessionConfig::default());
        s.load_graph(&fs_store, "Inn").unwrap();
        s.store_mut().set_bool("met", true);
        assert_eq!(s.start(&trigger).unwrap().unwrap().name, "WelcomeBack");
    }
}
