//! Dialogue playback for Colloquy.
//!
//! A [`DialogueCursor`] walks a graph one node at a time. A
//! [`ConditionalRouter`] picks between two entry points from the session
//! variables, and a [`DialogueSession`] ties graphs, variables, and cursors
//! together for a host game loop to poll.

/// Session configuration.
pub mod config;
/// Traversal with back-navigation.
pub mod cursor;
/// Error types for dialogue playback.
pub mod error;
/// Condition-driven branching.
pub mod router;
/// Play sessions.
pub mod session;
/// Triggerable dialogues and entry points.
pub mod trigger;

pub use config::SessionConfig;
pub use cursor::{CursorState, DialogueCursor};
pub use error::{RuntimeError, RuntimeResult};
pub use router::{Branch, ConditionalRouter};
pub use session::DialogueSession;
pub use trigger::{DialogueTrigger, EntryPoint};
