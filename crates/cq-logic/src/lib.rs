//! Branching logic for Colloquy.
//!
//! A [`VariableStore`] holds typed session state. [`Condition`]s read it and
//! [`Modifier`]s write it. Nothing here is global: callers own the store and
//! pass it by reference.

/// Typed predicates and aggregate evaluation.
pub mod condition;
/// Error types for branching logic.
pub mod error;
/// Typed mutations.
pub mod modifier;
/// The variable store and its name manifest.
pub mod store;

pub use condition::{
    BoolComparison, Condition, ConditionMode, IntComparison, StringComparison, evaluate_all,
};
pub use error::{LogicError, LogicResult};
pub use modifier::{
    BoolOperation, IntOperation, Modifier, StringOperation, apply_all, load_modifiers, modifiers_from_json,
};
pub use store::{Value, VariableKind, VariableNames, VariableStore};
