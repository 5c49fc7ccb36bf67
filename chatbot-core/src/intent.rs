//! A single intent: the keywords that trigger it and the responses it can give.
//!
//! The serialized field names (`palabras`, `respuestas`) are fixed by the
//! on-disk format and must not change.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A named rule's data. The name itself is the key in [`crate::IntentStore`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    /// Lowercase trigger keywords, in insertion order. Duplicates are allowed.
    #[serde(rename = "palabras", default)]
    keywords: Vec<String>,

    /// Candidate responses, case preserved.
    #[serde(rename = "respuestas", default)]
    responses: Vec<String>,
}

impl Intent {
    /// Create an intent with no keywords and no responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an intent from raw keyword and response lists.
    ///
    /// Keywords are lowercased; responses are kept verbatim.
    pub fn from_parts<K, R>(keywords: K, responses: R) -> Self
    where
        K: IntoIterator,
        K::Item: AsRef<str>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().to_lowercase())
                .collect(),
            responses: responses.into_iter().map(Into::into).collect(),
        }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn responses(&self) -> &[String] {
        &self.responses
    }

    /// Append a keyword, lowercased. No de-duplication.
    pub(crate) fn push_keyword(&mut self, keyword: &str) {
        self.keywords.push(keyword.to_lowercase());
    }

    /// Append a response verbatim.
    pub(crate) fn push_response(&mut self, response: impl Into<String>) {
        self.responses.push(response.into());
    }

    /// Fold another intent's keywords and responses into this one.
    pub(crate) fn absorb(&mut self, other: Intent) {
        self.keywords.extend(other.keywords);
        self.responses.extend(other.responses);
    }

    /// Re-apply the lowercase keyword invariant to data read from disk.
    pub(crate) fn normalized(mut self) -> Self {
        for keyword in &mut self.keywords {
            if keyword.chars().any(char::is_uppercase) {
                *keyword = keyword.to_lowercase();
            }
        }
        self
    }

    /// Pick one response uniformly at random.
    ///
    /// Returns `None` when the intent has no responses yet.
    pub fn choose_response(&self) -> Option<&str> {
        self.choose_response_with_rng(&mut rand::thread_rng())
    }

    /// Pick one response with a specific RNG (useful for testing).
    pub fn choose_response_with_rng<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
        self.responses.choose(rng).map(String::as_str)
    }
}
