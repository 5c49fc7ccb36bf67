//! Command line arguments.

use chatbot_core::{CorruptStorePolicy, MatchMode, SavePolicy, SessionConfig, DEFAULT_STORE_FILE};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// A chatbot that answers by keyword and learns new intents from you.
#[derive(Debug, Parser)]
#[command(name = "chatbot", version, about)]
pub struct Cli {
    /// Path of the JSON intent store
    #[arg(long, env = "CHATBOT_STORE", default_value = DEFAULT_STORE_FILE)]
    pub store: PathBuf,

    /// How keywords are matched against what you type
    #[arg(long, env = "CHATBOT_MATCH_MODE", value_enum, default_value_t = MatchModeArg::Substring)]
    pub match_mode: MatchModeArg,

    /// When learned changes are written to disk
    #[arg(long, env = "CHATBOT_SAVE_POLICY", value_enum, default_value_t = SavePolicyArg::EveryMutation)]
    pub save_policy: SavePolicyArg,

    /// Replace an unparseable store with the defaults (the bad file is kept as .corrupt)
    #[arg(long)]
    pub reset_corrupt: bool,

    /// Print the known intents and exit
    #[arg(long)]
    pub list: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MatchModeArg {
    /// Keyword anywhere in the text, even inside words
    Substring,
    /// Keyword must be a whole word or phrase
    WordBoundary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SavePolicyArg {
    /// Save after every change and on exit
    EveryMutation,
    /// Save only on exit
    OnExit,
}

impl From<MatchModeArg> for MatchMode {
    fn from(arg: MatchModeArg) -> Self {
        match arg {
            MatchModeArg::Substring => MatchMode::Substring,
            MatchModeArg::WordBoundary => MatchMode::WordBoundary,
        }
    }
}

impl From<SavePolicyArg> for SavePolicy {
    fn from(arg: SavePolicyArg) -> Self {
        match arg {
            SavePolicyArg::EveryMutation => SavePolicy::EveryMutation,
            SavePolicyArg::OnExit => SavePolicy::OnExit,
        }
    }
}

impl Cli {
    /// Build the session configuration these arguments describe.
    pub fn session_config(&self) -> SessionConfig {
        let corrupt_policy = if self.reset_corrupt {
            CorruptStorePolicy::UseDefaults
        } else {
            CorruptStorePolicy::Fail
        };

        SessionConfig::new(&self.store)
            .with_match_mode(self.match_mode.into())
            .with_save_policy(self.save_policy.into())
            .with_corrupt_policy(corrupt_policy)
    }
}
