use crate::id::{GroupId, NodeId};

/// Alias for `Result<T, CqError>`.
pub type CqResult<T> = Result<T, CqError>;

/// Errors that can occur when editing, saving, or loading a dialogue graph.
#[derive(Debug, thiserror::Error)]
pub enum CqError {
    /// The requested node ID does not exist in the graph.
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    /// The requested group ID does not exist in the graph.
    #[error("group not found: {0}")]
    GroupNotFound(GroupId),

    /// A choice index is outside the node's choice list.
    #[error("invalid choice index {index} (node has {count} choices)")]
    InvalidChoiceIndex {
        /// The requested index.
        index: usize,
        /// Number of choices on the node.
        count: usize,
    },

    /// Single-choice nodes always keep exactly one choice.
    #[error("node {0} is single-choice and cannot gain choices")]
    SingleChoiceFixed(NodeId),

    /// Every node keeps at least one choice.
    #[error("cannot remove the last choice of node {0}")]
    LastChoice(NodeId),

    /// A recorded choice target does not name any node in the graph.
    #[error("dangling reference: choice {choice} of node \"{node}\" targets unknown node {target}")]
    DanglingReference {
        /// Name of the node owning the choice.
        node: String,
        /// Index of the choice within the node.
        choice: usize,
        /// The unresolved target ID as recorded.
        target: String,
    },

    /// A recorded identifier is not a valid UUID.
    #[error("invalid id: \"{0}\"")]
    InvalidId(String),

    /// A graph file name is empty once sanitized.
    #[error("invalid file name: \"{0}\"")]
    InvalidFileName(String),

    /// The graph failed a pre-save validation check.
    #[error("validation error: {0}")]
    Validation(String),

    /// No graph file was stored under the given name.
    #[error("graph not found: \"{0}\"")]
    GraphNotFound(String),

    /// The backing store failed to read or write a blob.
    #[error("storage error at {key}: {source}")]
    Io {
        /// Blob key that was being accessed.
        key: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A stored blob could not be decoded.
    #[error("corrupt asset at {key}: {source}")]
    Corrupt {
        /// Blob key that failed to decode.
        key: String,
        /// Underlying decode error.
        #[source]
        source: serde_json::Error,
    },
}
