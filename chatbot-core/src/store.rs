//! The intent store: an ordered mapping from intent name to [`Intent`].
//!
//! Names are unique and kept in lowercase. Iteration follows insertion order,
//! which for a loaded store is the order of the keys in the document. All
//! mutations are append-only: keywords and responses are added, never removed.

use crate::intent::Intent;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Errors from store mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Unknown intent: '{0}'")]
    UnknownIntent(String),

    #[error("Intent already exists: '{0}'")]
    IntentExists(String),
}

/// The full set of intents known to a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntentStore {
    intents: Vec<(String, Intent)>,
}

impl IntentStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in store used when nothing has been persisted yet.
    ///
    /// Contains exactly two intents, "greeting" and "farewell".
    pub fn with_defaults() -> Self {
        let mut store = Self::new();
        store.intents.push((
            "greeting".to_string(),
            Intent::from_parts(
                ["hello", "hi", "hey", "what's up"],
                [
                    "Hello! Nice to hear from you.",
                    "Hey, how are you?",
                    "Hi there! How's your day going?",
                ],
            ),
        ));
        store.intents.push((
            "farewell".to_string(),
            Intent::from_parts(
                ["bye", "goodbye", "see you", "later"],
                [
                    "Goodbye, take care!",
                    "See you soon.",
                    "Bye, have a great day.",
                ],
            ),
        ));
        store
    }

    /// All intent names in iteration order.
    pub fn list_names(&self) -> Vec<String> {
        self.names().map(str::to_string).collect()
    }

    /// Borrowing iterator over intent names in iteration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.intents.iter().map(|(name, _)| name.as_str())
    }

    /// Iterate `(name, intent)` pairs in iteration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Intent)> {
        self.intents
            .iter()
            .map(|(name, intent)| (name.as_str(), intent))
    }

    pub fn len(&self) -> usize {
        self.intents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intents.is_empty()
    }

    /// Whether an intent with this name exists. Comparison ignores case.
    pub fn has(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Look up an intent by name, ignoring case.
    pub fn get(&self, name: &str) -> Option<&Intent> {
        self.position(name).map(|i| &self.intents[i].1)
    }

    /// Append a keyword (lowercased) to an existing intent.
    pub fn add_keyword(&mut self, name: &str, keyword: &str) -> Result<(), StoreError> {
        self.get_mut(name)?.push_keyword(keyword);
        Ok(())
    }

    /// Append a response (verbatim) to an existing intent.
    pub fn add_response(&mut self, name: &str, response: &str) -> Result<(), StoreError> {
        self.get_mut(name)?.push_response(response);
        Ok(())
    }

    /// Insert a new intent with no keywords and no responses.
    pub fn create_intent(&mut self, name: &str) -> Result<(), StoreError> {
        let key = normalize_name(name);
        if self.has(&key) {
            return Err(StoreError::IntentExists(key));
        }
        self.intents.push((key, Intent::new()));
        Ok(())
    }

    /// Create the intent if it is absent, then append one keyword and one response.
    ///
    /// Returns `true` if the intent was newly created.
    pub fn learn(&mut self, name: &str, keyword: &str, response: &str) -> bool {
        let (index, created) = match self.position(name) {
            Some(i) => (i, false),
            None => {
                self.intents.push((normalize_name(name), Intent::new()));
                (self.intents.len() - 1, true)
            }
        };

        let intent = &mut self.intents[index].1;
        intent.push_keyword(keyword);
        intent.push_response(response);
        created
    }

    /// Insert or merge an intent read from storage.
    ///
    /// Keys that collide after lowercasing merge into the first occurrence.
    fn merge(&mut self, name: &str, intent: Intent) {
        let intent = intent.normalized();
        match self.position(name) {
            Some(i) => self.intents[i].1.absorb(intent),
            None => self.intents.push((normalize_name(name), intent)),
        }
    }

    fn get_mut(&mut self, name: &str) -> Result<&mut Intent, StoreError> {
        match self.position(name) {
            Some(i) => Ok(&mut self.intents[i].1),
            None => Err(StoreError::UnknownIntent(normalize_name(name))),
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        let key = normalize_name(name);
        self.intents.iter().position(|(n, _)| *n == key)
    }
}

/// Canonical form of an intent name.
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase()
}

impl Serialize for IntentStore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.intents.len()))?;
        for (name, intent) in &self.intents {
            map.serialize_entry(name, intent)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for IntentStore {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct StoreVisitor;

        impl<'de> Visitor<'de> for StoreVisitor {
            type Value = IntentStore;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of intent names to keyword/response lists")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut store = IntentStore::new();
                while let Some((name, intent)) = access.next_entry::<String, Intent>()? {
                    store.merge(&name, intent);
                }
                Ok(store)
            }
        }

        deserializer.deserialize_map(StoreVisitor)
    }
}
