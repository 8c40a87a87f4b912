//! Error types for dialogue playback.

use cq_core::CqError;
use cq_logic::LogicError;
use thiserror::Error;

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Errors that can occur while playing a dialogue.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// No graph with this file name is loaded in the session.
    #[error("graph not loaded: \"{0}\"")]
    GraphNotLoaded(String),

    /// A node named or referenced by the caller does not exist.
    #[error("node not found: {0}")]
    NodeNotFound(String),

    /// `advance`/`go_back` was called with no dialogue running.
    #[error("no active dialogue")]
    NoActiveDialogue,

    /// The requested choice is outside the current node's choices.
    #[error("invalid choice index {index} (node has {count} choices)")]
    InvalidChoiceIndex {
        /// The requested index.
        index: usize,
        /// Number of choices on the current node.
        count: usize,
    },

    /// The graph has no starting node and no entry was designated.
    #[error("no starting node")]
    NoStartingNode,

    /// Graph model or storage error.
    #[error(transparent)]
    Core(#[from] CqError),

    /// Variable logic error.
    #[error(transparent)]
    Logic(#[from] LogicError),
}
