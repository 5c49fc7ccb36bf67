//! ChatSession - the primary public API for a conversation.
//!
//! A session owns the intent store for its whole lifetime. It answers
//! turns through the matcher, applies teach/edit mutations to the store,
//! and writes the store back to disk according to its [`SavePolicy`].

use crate::config::{SavePolicy, SessionConfig};
use crate::matcher::{MatchMode, Matcher};
use crate::persist::{IntentFile, LoadSource, PersistError};
use crate::store::{IntentStore, StoreError};
use rand::Rng;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors from ChatSession operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// The outcome of one conversational turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// An intent matched and one of its responses was picked.
    Matched { intent: String, response: String },

    /// An intent matched but has no responses to give yet.
    NoResponse { intent: String },

    /// Nothing matched.
    NotUnderstood,
}

impl Reply {
    /// The matched intent, if any.
    pub fn intent(&self) -> Option<&str> {
        match self {
            Reply::Matched { intent, .. } | Reply::NoResponse { intent } => Some(intent.as_str()),
            Reply::NotUnderstood => None,
        }
    }

    /// The response text, if one was chosen.
    pub fn response(&self) -> Option<&str> {
        match self {
            Reply::Matched { response, .. } => Some(response.as_str()),
            _ => None,
        }
    }

    /// Whether the caller should fall back to "I don't understand".
    pub fn is_understood(&self) -> bool {
        matches!(self, Reply::Matched { .. })
    }
}

/// Whether a change reached disk.
#[derive(Debug)]
pub enum Durability {
    /// Written to the store file.
    Saved,
    /// Held in memory until the session closes.
    Deferred,
    /// The session has no backing file.
    InMemory,
    /// The write failed; the change only lives in memory.
    Failed(PersistError),
}

impl Durability {
    pub fn is_failed(&self) -> bool {
        matches!(self, Durability::Failed(_))
    }

    /// The write error, if the save failed.
    pub fn error(&self) -> Option<&PersistError> {
        match self {
            Durability::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// A conversation with a learning intent store.
#[derive(Debug)]
pub struct ChatSession {
    store: IntentStore,
    matcher: Matcher,
    file: Option<IntentFile>,
    save_policy: SavePolicy,
    load_source: LoadSource,
}

impl ChatSession {
    /// Open a session, loading the store named in `config`.
    ///
    /// A missing file yields the built-in defaults. An existing file that
    /// cannot be read is an error. A corrupt file is handled according to
    /// `config.corrupt_policy`.
    pub fn open(config: SessionConfig) -> Result<Self, SessionError> {
        let file = IntentFile::new(config.store_path);
        let (store, load_source) = file.load(config.corrupt_policy)?;

        Ok(Self {
            store,
            matcher: Matcher::new(config.match_mode),
            file: Some(file),
            save_policy: config.save_policy,
            load_source,
        })
    }

    /// Create a session that never touches disk.
    pub fn in_memory(store: IntentStore, mode: MatchMode) -> Self {
        Self {
            store,
            matcher: Matcher::new(mode),
            file: None,
            save_policy: SavePolicy::OnExit,
            load_source: LoadSource::Missing,
        }
    }

    /// Answer one line of user input.
    pub fn respond(&self, text: &str) -> Reply {
        self.respond_with_rng(text, &mut rand::thread_rng())
    }

    /// Answer with a specific RNG (useful for testing).
    pub fn respond_with_rng<R: Rng + ?Sized>(&self, text: &str, rng: &mut R) -> Reply {
        let Some(name) = self.matcher.match_intent(text, &self.store) else {
            return Reply::NotUnderstood;
        };

        let response = self
            .store
            .get(name)
            .and_then(|intent| intent.choose_response_with_rng(rng));

        match response {
            Some(response) => Reply::Matched {
                intent: name.to_string(),
                response: response.to_string(),
            },
            None => {
                debug!(intent = name, "matched intent has no responses");
                Reply::NoResponse {
                    intent: name.to_string(),
                }
            }
        }
    }

    /// Resolve text to an intent name without choosing a response.
    pub fn match_intent(&self, text: &str) -> Option<&str> {
        self.matcher.match_intent(text, &self.store)
    }

    /// Create an empty intent.
    pub fn create_intent(&mut self, name: &str) -> Result<Durability, SessionError> {
        self.store.create_intent(name)?;
        Ok(self.after_mutation())
    }

    /// Append a keyword to an existing intent.
    pub fn add_keyword(&mut self, name: &str, keyword: &str) -> Result<Durability, SessionError> {
        self.store.add_keyword(name, keyword)?;
        Ok(self.after_mutation())
    }

    /// Append a response to an existing intent.
    pub fn add_response(&mut self, name: &str, response: &str) -> Result<Durability, SessionError> {
        self.store.add_response(name, response)?;
        Ok(self.after_mutation())
    }

    /// Teach an intent: create it if needed, then add one keyword and one response.
    pub fn learn(&mut self, name: &str, keyword: &str, response: &str) -> Durability {
        let created = self.store.learn(name, keyword, response);
        debug!(intent = name, created, "learned intent");
        self.after_mutation()
    }

    /// Write the store to disk now.
    pub fn save(&self) -> Durability {
        let Some(file) = &self.file else {
            return Durability::InMemory;
        };

        match file.save(&self.store) {
            Ok(()) => Durability::Saved,
            Err(e) => {
                warn!(error = %e, "failed to save intent store");
                Durability::Failed(e)
            }
        }
    }

    /// End the session with a final save.
    pub fn close(self) -> Durability {
        self.save()
    }

    fn after_mutation(&self) -> Durability {
        match (self.save_policy, &self.file) {
            (_, None) => Durability::InMemory,
            (SavePolicy::EveryMutation, Some(_)) => self.save(),
            (SavePolicy::OnExit, Some(_)) => Durability::Deferred,
        }
    }

    /// Get a reference to the intent store.
    pub fn store(&self) -> &IntentStore {
        &self.store
    }

    /// All intent names in store order.
    pub fn list_names(&self) -> Vec<String> {
        self.store.list_names()
    }

    pub fn has(&self, name: &str) -> bool {
        self.store.has(name)
    }

    /// How the store was obtained when the session opened.
    pub fn load_source(&self) -> &LoadSource {
        &self.load_source
    }

    /// Path of the backing store file, if any.
    pub fn store_path(&self) -> Option<&Path> {
        self.file.as_ref().map(IntentFile::path)
    }
}
