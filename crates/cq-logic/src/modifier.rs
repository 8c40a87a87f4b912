//! Typed mutations of the variable store.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{LogicError, LogicResult};
use crate::store::{VariableKind, VariableStore};

/// Read-modify-write verbs for booleans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoolOperation {
    /// Replace with the operand.
    Set,
    /// Negate the current value; the operand is ignored.
    Toggle,
    /// `current && operand`
    And,
    /// `current || operand`
    Or,
    /// `current ^ operand`
    Xor,
    /// Unrecognized verb.
    #[serde(other)]
    Unknown,
}

/// Arithmetic verbs for integers. Overflow wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntOperation {
    /// Replace with the operand.
    Set,
    /// `current + operand`
    Add,
    /// `current - operand`
    Subtract,
    /// `current * operand`
    Multiply,
    /// `current / operand`, truncating toward zero.
    Divide,
    /// Unrecognized verb.
    #[serde(other)]
    Unknown,
}

/// Verbs for strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StringOperation {
    /// Replace with the operand.
    Set,
    /// Concatenate the operand.
    Append,
    /// Unrecognized verb.
    #[serde(other)]
    Unknown,
}

/// A typed mutation: variable key, verb, operand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Modifier {
    /// Mutate a boolean variable.
    Bool {
        /// Variable key.
        key: String,
        /// Verb.
        operation: BoolOperation,
        /// Operand; unused by `toggle`.
        #[serde(default)]
        value: bool,
    },
    /// Mutate an integer variable.
    Int {
        /// Variable key.
        key: String,
        /// Verb.
        operation: IntOperation,
        /// Operand.
        value: i32,
    },
    /// Mutate a string variable.
    String {
        /// Variable key.
        key: String,
        /// Verb.
        operation: StringOperation,
        /// Operand.
        value: String,
    },
}

impl Modifier {
    /// Boolean modifier.
    pub fn bool(key: impl Into<String>, operation: BoolOperation, value: bool) -> Self {
        Self::Bool {
            key: key.into(),
            operation,
            value,
        }
    }

    /// Integer modifier.
    pub fn int(key: impl Into<String>, operation: IntOperation, value: i32) -> Self {
        Self::Int {
            key: key.into(),
            operation,
            value,
        }
    }

    /// String modifier.
    pub fn string(key: impl Into<String>, operation: StringOperation, value: impl Into<String>) -> Self {
        Self::String {
            key: key.into(),
            operation,
            value: value.into(),
        }
    }

    /// The variable this modifier writes.
    pub fn key(&self) -> &str {
        match self {
            Self::Bool { key, .. } | Self::Int { key, .. } | Self::String { key, .. } => key,
        }
    }

    /// Apply to `store`. On any error the store is left untouched.
    pub fn apply(&self, store: &mut VariableStore) -> LogicResult<()> {
        match self {
            Self::Bool {
                key,
                operation,
                value,
            } => {
                let current = store.get_bool(key)?;
                let next = match operation {
                    BoolOperation::Set => *value,
                    BoolOperation::Toggle => !current,
                    BoolOperation::And => current && *value,
                    BoolOperation::Or => current || *value,
                    BoolOperation::Xor => current ^ *value,
                    BoolOperation::Unknown => return Err(unknown(VariableKind::Bool, key)),
                };
                store.set_bool(key.as_str(), next);
            }
            Self::Int {
                key,
                operation,
                value,
            } => {
                let current = store.get_int(key)?;
                let next = match operation {
                    IntOperation::Set => *value,
                    IntOperation::Add => current.wrapping_add(*value),
                    IntOperation::Subtract => current.wrapping_sub(*value),
                    IntOperation::Multiply => current.wrapping_mul(*value),
                    IntOperation::Divide => {
                        if *value == 0 {
                            return Err(LogicError::DivideByZero { key: key.clone() });
                        }
                        current.wrapping_div(*value)
                    }
                    IntOperation::Unknown => return Err(unknown(VariableKind::Int, key)),
                };
                store.set_int(key.as_str(), next);
            }
            Self::String {
                key,
                operation,
                value,
            } => {
                let current = store.get_string(key)?;
                let next = match operation {
                    StringOperation::Set => value.clone(),
                    StringOperation::Append => format!("{current}{value}"),
                    StringOperation::Unknown => return Err(unknown(VariableKind::String, key)),
                };
                store.set_string(key.as_str(), next);
            }
        }
        Ok(())
    }

    /// Apply, logging failures instead of returning them. Returns whether the
    /// store changed.
    pub fn apply_logged(&self, store: &mut VariableStore) -> bool {
        match self.apply(store) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, "modifier skipped");
                false
            }
        }
    }
}

fn unknown(kind: VariableKind, key: &str) -> LogicError {
    LogicError::UnknownOperation {
        kind,
        key: key.to_string(),
    }
}

/// Apply modifiers in order, logging and skipping any that fail.
/// Returns how many were applied.
pub fn apply_all(modifiers: &[Modifier], store: &mut VariableStore) -> usize {
    modifiers.iter().filter(|m| m.apply_logged(store)).count()
}

/// Parse a JSON array of modifiers.
pub fn modifiers_from_json(json: &str) -> LogicResult<Vec<Modifier>> {
    Ok(serde_json::from_str(json)?)
}

/// Read a JSON file holding an array of modifiers.
pub fn load_modifiers(path: &Path) -> LogicResult<Vec<Modifier>> {
    let json = std::fs::read_to_string(path).map_err(|source| LogicError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    modifiers_from_json(&json)
}
