//! Core types for Colloquy: the dialogue graph, its persisted records, and
//! asset storage.
//!
//! A [`DialogueGraph`] owns nodes and groups; choices refer to nodes by
//! [`NodeId`]. Graphs are saved through a [`BlobStore`] as JSON, alongside a
//! flattened [`DialogueContainer`] for play-mode consumers.

/// Runtime container asset derived from a graph.
pub mod container;
/// Error types used throughout the crate.
pub mod error;
/// The dialogue graph that owns nodes and groups.
pub mod graph;
/// Organizational node groups.
pub mod group;
/// Node and group identifiers.
pub mod id;
/// Name sanitization and duplicate detection.
pub mod names;
/// Nodes, choices, and node kinds.
pub mod node;
/// Persisted graph records and load options.
pub mod record;
/// Blob storage, save, and load.
pub mod storage;

/// Re-export container types.
pub use container::{DialogueContainer, DialogueEntry, DialogueRef};
/// Re-export error types.
pub use error::{CqError, CqResult};
/// Re-export graph types.
pub use graph::{DialogueGraph, GraphIssue};
/// Re-export group type.
pub use group::Group;
/// Re-export identifiers.
pub use id::{GroupId, NodeId};
/// Re-export name helpers.
pub use names::{DuplicateReport, sanitize_name};
/// Re-export node types.
pub use node::{Choice, Node, NodeKind, Position};
/// Re-export record types.
pub use record::{DanglingPolicy, GraphFile, LoadOptions};
/// Re-export storage types.
pub use storage::{BlobStore, FsStore, MemoryStore, SaveReport};
