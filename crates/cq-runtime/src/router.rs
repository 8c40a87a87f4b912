//! Two-way branching on aggregate conditions.

use std::fmt;

use cq_logic::{Condition, ConditionMode, LogicError, VariableStore, evaluate_all};
use serde::{Deserialize, Serialize};

/// Which side of a router was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Branch {
    /// Conditions were met.
    True,
    /// Conditions were not met, or could not be evaluated.
    False,
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::True => write!(f, "true"),
            Self::False => write!(f, "false"),
        }
    }
}

/// Picks one of two handles by evaluating a condition list.
///
/// `H` is whatever the caller uses to name a dialogue entry point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionalRouter<H> {
    /// Conditions to evaluate.
    #[serde(default)]
    pub conditions: Vec<Condition>,
    /// How the conditions combine.
    #[serde(default)]
    pub mode: ConditionMode,
    /// Handle selected when the conditions hold.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_true: Option<H>,
    /// Handle selected otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_false: Option<H>,
}

impl<H> ConditionalRouter<H> {
    /// Router with no conditions and no handles.
    pub fn new(mode: ConditionMode) -> Self {
        Self {
            conditions: Vec::new(),
            mode,
            on_true: None,
            on_false: None,
        }
    }

    /// Add a condition.
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Set the handle for the true branch.
    pub fn if_true(mut self, handle: H) -> Self {
        self.on_true = Some(handle);
        self
    }

    /// Set the handle for the false branch.
    pub fn if_false(mut self, handle: H) -> Self {
        self.on_false = Some(handle);
        self
    }

    /// Evaluate the conditions. An empty list warns and routes to `False`.
    pub fn route(&self, store: &VariableStore) -> Branch {
        match evaluate_all(&self.conditions, self.mode, store) {
            Ok(true) => Branch::True,
            Ok(false) => Branch::False,
            Err(LogicError::EmptyConditionList) => {
                tracing::warn!("conditional dialogue has no conditions, taking the false branch");
                Branch::False
            }
            Err(e) => {
                tracing::error!(error = %e, "conditional dialogue failed, taking the false branch");
                Branch::False
            }
        }
    }

    /// The handle for `branch`, if one is set.
    pub fn handle(&self, branch: Branch) -> Option<&H> {
        match branch {
            Branch::True => self.on_true.as_ref(),
            Branch::False => self.on_false.as_ref(),
        }
    }

    /// Route and return the selected handle. A missing handle is logged and
    /// yields `None`.
    pub fn select(&self, store: &VariableStore) -> Option<&H> {
        let branch = self.route(store);
        let handle = self.handle(branch);
        if handle.is_none() {
            tracing::warn!(%branch, "no dialogue set for the selected branch");
        }
        handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cq_logic::{BoolComparison, IntComparison};

    fn store() -> VariableStore {
        let mut store = VariableStore::new();
        store.set_bool("met", true);
        store.set_int("gold", 3);
        store
    }

    #[test]
    fn routes_all_and_any() {
        let s = store();
        let router = ConditionalRouter::new(ConditionMode::All)
            .with_condition(Condition::bool("met", BoolComparison::Is, true))
            .with_condition(Condition::int("gold", IntComparison::GreaterOrEqual, 10))
            .if_true("rich")
            .if_false("poor");
        assert_eq!(router.route(&s), Branch::False);
        assert_eq!(router.select(&s), Some(&"poor"));

        let router = ConditionalRouter {
            mode: ConditionMode::Any,
            ..router
        };
        assert_eq!(router.route(&s), Branch::True);
        assert_eq!(router.select(&s), Some(&"rich"));
    }

    #[test]
    fn empty_conditions_take_false_branch() {
        let s = store();
        let router = ConditionalRouter::new(ConditionMode::All)
            .if_true("yes")
            .if_false("no");
        assert_eq!(router.route(&s), Branch::False);
        assert_eq!(router.select(&s), Some(&"no"));

        let router = ConditionalRouter { mode: ConditionMode::Any, ..router };
        assert_eq!(router.route(&s), Branch::False);
    }

    #[derive(Clone, Default)]
    struct Captured(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn empty_conditions_log_a_warning() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let router = ConditionalRouter::new(ConditionMode::All)
            .if_true("yes")
            .if_false("no");
        tracing::subscriber::with_default(subscriber, || {
            assert_eq!(router.route(&store()), Branch::False);
        });

        let logs = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(logs.contains("WARN"), "{logs}");
        assert!(logs.contains("no conditions"), "{logs}");
    }

    #[test]
    fn missing_handle_is_none() {
        let s = store();
        let router: ConditionalRouter<&str> = ConditionalRouter::new(ConditionMode::All)
            .with_condition(Condition::bool("met", BoolComparison::Is, true))
            .if_false("no");
        assert_eq!(router.route(&s), Branch::True);
        assert!(router.select(&s).is_none());
    }

    #[test]
    fn missing_variable_takes_false_branch() {
        let s = store();
        let router = ConditionalRouter::new(ConditionMode::All)
            .with_condition(Condition::int("silver", IntComparison::Equal, 0))
            .if_true(1)
            .if_false(2);
        assert_eq!(router.select(&s), Some(&2));
    }
}
