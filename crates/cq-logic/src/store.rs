//! Typed session variables.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{LogicError, LogicResult};

/// The three variable mappings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableKind {
    /// `name → bool`
    Bool,
    /// `name → int`
    Int,
    /// `name → string`
    String,
}

impl fmt::Display for VariableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => write!(f, "bool"),
            Self::Int => write!(f, "int"),
            Self::String => write!(f, "string"),
        }
    }
}

/// A stored value, as listed by [`VariableStore::iter`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i32),
    /// String value.
    String(String),
}

impl Value {
    /// The mapping this value lives in.
    pub fn kind(&self) -> VariableKind {
        match self {
            Self::Bool(_) => VariableKind::Bool,
            Self::Int(_) => VariableKind::Int,
            Self::String(_) => VariableKind::String,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::String(s) => write!(f, "\"{s}\""),
        }
    }
}

/// Declared variable names, one list per type.
///
/// Persisted as `{ "boolNames": [...], "intNames": [...], "stringNames": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableNames {
    /// Boolean variable names.
    #[serde(default)]
    pub bool_names: Vec<String>,
    /// Integer variable names.
    #[serde(default)]
    pub int_names: Vec<String>,
    /// String variable names.
    #[serde(default)]
    pub string_names: Vec<String>,
}

impl VariableNames {
    /// Empty manifest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a boolean name.
    pub fn with_bool(mut self, name: impl Into<String>) -> Self {
        self.bool_names.push(name.into());
        self
    }

    /// Add an integer name.
    pub fn with_int(mut self, name: impl Into<String>) -> Self {
        self.int_names.push(name.into());
        self
    }

    /// Add a string name.
    pub fn with_string(mut self, name: impl Into<String>) -> Self {
        self.string_names.push(name.into());
        self
    }

    /// Parse a manifest from JSON.
    pub fn from_json(json: &str) -> LogicResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a manifest file.
    pub fn load(path: &Path) -> LogicResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| LogicError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }
}

/// Session state read by conditions and written by modifiers.
///
/// Three independent mappings; a bool and an int may share a key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableStore {
    bools: BTreeMap<String, bool>,
    ints: BTreeMap<String, i32>,
    strings: BTreeMap<String, String>,
}

impl VariableStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store initialized from `names`.
    pub fn from_names(names: &VariableNames) -> Self {
        let mut store = Self::new();
        store.initialize(names);
        store
    }

    /// Replace all state with the declared names at their zero values.
    pub fn initialize(&mut self, names: &VariableNames) {
        self.clear();
        for name in &names.bool_names {
            self.bools.insert(name.clone(), false);
        }
        for name in &names.int_names {
            self.ints.insert(name.clone(), 0);
        }
        for name in &names.string_names {
            self.strings.insert(name.clone(), String::new());
        }
        tracing::debug!(
            bools = self.bools.len(),
            ints = self.ints.len(),
            strings = self.strings.len(),
            "variable store initialized"
        );
    }

    /// Empty all three mappings.
    pub fn clear(&mut self) {
        self.bools.clear();
        self.ints.clear();
        self.strings.clear();
    }

    /// Look up a boolean.
    pub fn get_bool(&self, key: &str) -> LogicResult<bool> {
        self.bools.get(key).copied().ok_or_else(|| missing(VariableKind::Bool, key))
    }

    /// Look up an integer.
    pub fn get_int(&self, key: &str) -> LogicResult<i32> {
        self.ints.get(key).copied().ok_or_else(|| missing(VariableKind::Int, key))
    }

    /// Look up a string.
    pub fn get_string(&self, key: &str) -> LogicResult<&str> {
        self.strings
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| missing(VariableKind::String, key))
    }

    /// Upsert a boolean.
    pub fn set_bool(&mut self, key: impl Into<String>, value: bool) {
        self.bools.insert(key.into(), value);
    }

    /// Upsert an integer.
    pub fn set_int(&mut self, key: impl Into<String>, value: i32) {
        self.ints.insert(key.into(), value);
    }

    /// Upsert a string.
    pub fn set_string(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.strings.insert(key.into(), value.into());
    }

    /// Whether `key` exists in the mapping for `kind`.
    pub fn contains(&self, kind: VariableKind, key: &str) -> bool {
        match kind {
            VariableKind::Bool => self.bools.contains_key(key),
            VariableKind::Int => self.ints.contains_key(key),
            VariableKind::String => self.strings.contains_key(key),
        }
    }

    /// Every variable, bools first, then ints, then strings; each sorted by key.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Value)> {
        let bools = self.bools.iter().map(|(k, v)| (k.as_str(), Value::Bool(*v)));
        let ints = self.ints.iter().map(|(k, v)| (k.as_str(), Value::Int(*v)));
        let strings = self
            .strings
            .iter()
            .map(|(k, v)| (k.as_str(), Value::String(v.clone())));
        bools.chain(ints).chain(strings)
    }

    /// Total number of variables across all mappings.
    pub fn len(&self) -> usize {
        self.bools.len() + self.ints.len() + self.strings.len()
    }

    /// Whether all mappings are empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn missing(kind: VariableKind, key: &str) -> LogicError {
    LogicError::KeyNotFound {
        kind,
        key: key.to_string(),
    }
}
