//! Configuration for a play session.

use cq_core::{DanglingPolicy, LoadOptions};

/// Configuration for a [`DialogueSession`](crate::DialogueSession).
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Restart a dialogue from its entry each time it is triggered. When
    /// false, re-triggering resumes where the player left off.
    pub reset_on_start: bool,
    /// How graphs are loaded from storage.
    pub load_options: LoadOptions,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            reset_on_start: true,
            load_options: LoadOptions::default(),
        }
    }
}

impl SessionConfig {
    /// Set whether triggering restarts a dialogue.
    pub fn with_reset_on_start(mut self, reset: bool) -> Self {
        self.reset_on_start = reset;
        self
    }

    /// Set the graph load options.
    pub fn with_load_options(mut self, options: LoadOptions) -> Self {
        self.load_options = options;
        self
    }

    /// Set the dangling-reference policy used when loading graphs.
    pub fn with_dangling(mut self, dangling: DanglingPolicy) -> Self {
        self.load_options.dangling = dangling;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let cfg = SessionConfig::default();
        assert!(cfg.reset_on_start);
        assert_eq!(cfg.load_options.dangling, DanglingPolicy::Unlink);
    }

    #[test]
    fn builder_methods() {
        let cfg = SessionConfig::default()
            .with_reset_on_start(false)
            .with_dangling(DanglingPolicy::Fail);
        assert!(!cfg.reset_on_start);
        assert_eq!(cfg.load_options.dangling, DanglingPolicy::Fail);
    }
}
