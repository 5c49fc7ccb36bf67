//! Session configuration.

use crate::matcher::MatchMode;
use crate::persist::{CorruptStorePolicy, DEFAULT_STORE_FILE};
use std::path::PathBuf;

/// When the session writes the store back to disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SavePolicy {
    /// Save after every mutation and again on exit.
    #[default]
    EveryMutation,
    /// Save only when the session ends.
    OnExit,
}

/// Configuration for opening a chat session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Location of the persisted intent store.
    pub store_path: PathBuf,

    /// How keywords are matched against input.
    pub match_mode: MatchMode,

    /// When mutations are flushed to disk.
    pub save_policy: SavePolicy,

    /// What to do with a store file that exists but cannot be parsed.
    pub corrupt_policy: CorruptStorePolicy,
}

impl SessionConfig {
    /// Create a config for the given store path with default policies.
    pub fn new(store_path: impl Into<PathBuf>) -> Self {
        Self {
            store_path: store_path.into(),
            match_mode: MatchMode::default(),
            save_policy: SavePolicy::default(),
            corrupt_policy: CorruptStorePolicy::default(),
        }
    }

    /// Set the keyword match mode.
    pub fn with_match_mode(mut self, mode: MatchMode) -> Self {
        self.match_mode = mode;
        self
    }

    /// Set when the store is saved.
    pub fn with_save_policy(mut self, policy: SavePolicy) -> Self {
        self.save_policy = policy;
        self
    }

    /// Set how a corrupt store file is handled.
    pub fn with_corrupt_policy(mut self, policy: CorruptStorePolicy) -> Self {
        self.corrupt_policy = policy;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new(DEFAULT_STORE_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();
        assert_eq!(config.store_path, PathBuf::from("intenciones.json"));
        assert_eq!(config.match_mode, MatchMode::Substring);
        assert_eq!(config.save_policy, SavePolicy::EveryMutation);
        assert_eq!(config.corrupt_policy, CorruptStorePolicy::Fail);
    }

    #[test]
    fn test_config_builder() {
        let config = SessionConfig::new("bot.json")
            .with_match_mode(MatchMode::WordBoundary)
            .with_save_policy(SavePolicy::OnExit)
            .with_corrupt_policy(CorruptStorePolicy::UseDefaults);

        assert_eq!(config.store_path, PathBuf::from("bot.json"));
        assert_eq!(config.match_mode, MatchMode::WordBoundary);
        assert_eq!(config.save_policy, SavePolicy::OnExit);
        assert_eq!(config.corrupt_policy, CorruptStorePolicy::UseDefaults);
    }
}
