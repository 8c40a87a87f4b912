//! Error types for branching logic.

use std::path::PathBuf;

use thiserror::Error;

use crate::store::VariableKind;

/// Result type for logic operations.
pub type LogicResult<T> = Result<T, LogicError>;

/// Errors raised while reading or mutating session variables.
#[derive(Debug, Error)]
pub enum LogicError {
    /// The variable was never declared or set.
    #[error("{kind} variable not found: \"{key}\"")]
    KeyNotFound {
        /// Which mapping was searched.
        kind: VariableKind,
        /// The missing key.
        key: String,
    },

    /// An integer modifier tried to divide by zero.
    #[error("division by zero on int variable \"{key}\"")]
    DivideByZero {
        /// Variable the modifier targeted.
        key: String,
    },

    /// A condition list was empty.
    #[error("empty condition list")]
    EmptyConditionList,

    /// A modifier carried an operation this build does not know.
    #[error("unknown {kind} operation on \"{key}\"")]
    UnknownOperation {
        /// Variable type of the modifier.
        kind: VariableKind,
        /// Variable the modifier targeted.
        key: String,
    },

    /// A manifest or modifier file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A manifest or modifier file is not valid JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
