//! Typed predicates over the variable store.

use serde::{Deserialize, Serialize};

use crate::error::{LogicError, LogicResult};
use crate::store::VariableStore;

/// Boolean combinators applied as `stored ⊕ literal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoolComparison {
    /// `stored == literal`
    Is,
    /// `stored && literal`
    And,
    /// `stored || literal`
    Or,
    /// `stored ^ literal`
    Xor,
    /// Unrecognized comparator; always false.
    #[serde(other)]
    Unknown,
}

impl BoolComparison {
    /// Apply the combinator.
    pub fn compare(self, stored: bool, literal: bool) -> bool {
        match self {
            Self::Is => stored == literal,
            Self::And => stored && literal,
            Self::Or => stored || literal,
            Self::Xor => stored ^ literal,
            Self::Unknown => false,
        }
    }
}

/// Integer ordering against a literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntComparison {
    /// `stored == literal`
    Equal,
    /// `stored != literal`
    NotEqual,
    /// `stored > literal`
    Greater,
    /// `stored >= literal`
    GreaterOrEqual,
    /// `stored < literal`
    Less,
    /// `stored <= literal`
    LessOrEqual,
    /// Unrecognized comparator; always false.
    #[serde(other)]
    Unknown,
}

impl IntComparison {
    /// Apply the comparison.
    pub fn compare(self, stored: i32, literal: i32) -> bool {
        match self {
            Self::Equal => stored == literal,
            Self::NotEqual => stored != literal,
            Self::Greater => stored > literal,
            Self::GreaterOrEqual => stored >= literal,
            Self::Less => stored < literal,
            Self::LessOrEqual => stored <= literal,
            Self::Unknown => false,
        }
    }
}

/// String tests against a literal. Case-sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StringComparison {
    /// Exact match.
    Equal,
    /// Not an exact match.
    NotEqual,
    /// Stored value contains the literal.
    Contains,
    /// Stored value starts with the literal.
    StartsWith,
    /// Stored value ends with the literal.
    EndsWith,
    /// Unrecognized comparator; always false.
    #[serde(other)]
    Unknown,
}

impl StringComparison {
    /// Apply the test.
    pub fn compare(self, stored: &str, literal: &str) -> bool {
        match self {
            Self::Equal => stored == literal,
            Self::NotEqual => stored != literal,
            Self::Contains => stored.contains(literal),
            Self::StartsWith => stored.starts_with(literal),
            Self::EndsWith => stored.ends_with(literal),
            Self::Unknown => false,
        }
    }
}

/// A typed predicate: variable key, comparator, literal.
///
/// Authored as JSON, e.g.
/// `{"type":"int","key":"gold","comparison":"greater_or_equal","value":5}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Condition {
    /// Test a boolean variable.
    Bool {
        /// Variable key.
        key: String,
        /// Combinator.
        comparison: BoolComparison,
        /// Literal operand.
        value: bool,
    },
    /// Test an integer variable.
    Int {
        /// Variable key.
        key: String,
        /// Ordering.
        comparison: IntComparison,
        /// Literal operand.
        value: i32,
    },
    /// Test a string variable.
    String {
        /// Variable key.
        key: String,
        /// String test.
        comparison: StringComparison,
        /// Literal operand.
        value: String,
    },
}

impl Condition {
    /// Boolean condition.
    pub fn bool(key: impl Into<String>, comparison: BoolComparison, value: bool) -> Self {
        Self::Bool {
            key: key.into(),
            comparison,
            value,
        }
    }

    /// Integer condition.
    pub fn int(key: impl Into<String>, comparison: IntComparison, value: i32) -> Self {
        Self::Int {
            key: key.into(),
            comparison,
            value,
        }
    }

    /// String condition.
    pub fn string(key: impl Into<String>, comparison: StringComparison, value: impl Into<String>) -> Self {
        Self::String {
            key: key.into(),
            comparison,
            value: value.into(),
        }
    }

    /// The variable this condition reads.
    pub fn key(&self) -> &str {
        match self {
            Self::Bool { key, .. } | Self::Int { key, .. } | Self::String { key, .. } => key,
        }
    }

    /// Evaluate strictly; a missing variable is an error.
    pub fn check(&self, store: &VariableStore) -> LogicResult<bool> {
        Ok(match self {
            Self::Bool {
                key,
                comparison,
                value,
            } => comparison.compare(store.get_bool(key)?, *value),
            Self::Int {
                key,
                comparison,
                value,
            } => comparison.compare(store.get_int(key)?, *value),
            Self::String {
                key,
                comparison,
                value,
            } => comparison.compare(store.get_string(key)?, value),
        })
    }

    /// Evaluate, treating a missing variable as not met. The failure is logged.
    pub fn evaluate(&self, store: &VariableStore) -> bool {
        match self.check(store) {
            Ok(met) => met,
            Err(e) => {
                tracing::error!(error = %e, "condition evaluated as false");
                false
            }
        }
    }
}

/// How a list of conditions combines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionMode {
    /// Every condition must hold. Stops at the first false.
    #[default]
    All,
    /// At least one condition must hold. Stops at the first true.
    Any,
}

/// Combine `conditions` under `mode`.
///
/// An empty list is an authoring gap and yields [`LogicError::EmptyConditionList`]
/// rather than a vacuous answer. Individual conditions use the lenient
/// [`Condition::evaluate`].
pub fn evaluate_all(conditions: &[Condition], mode: ConditionMode, store: &VariableStore) -> LogicResult<bool> {
    if conditions.is_empty() {
        return Err(LogicError::EmptyConditionList);
    }
    Ok(match mode {
        ConditionMode::All => conditions.iter().all(|c| c.evaluate(store)),
        ConditionMode::Any => conditions.iter().any(|c| c.evaluate(store)),
    })
}
