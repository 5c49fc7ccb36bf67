//! Keyword matcher: resolves free text to the intent it activates.
//!
//! Matching is pure. The same text against the same store always yields the
//! same intent.

use crate::store::IntentStore;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// How a keyword must appear in the text to count as a hit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchMode {
    /// Plain substring containment. "hi" matches inside "this".
    #[default]
    Substring,
    /// The keyword must start and end at a word boundary of the text.
    WordBoundary,
}

impl MatchMode {
    /// Check whether `keyword` occurs in already-lowercased `text`.
    ///
    /// An empty keyword never matches.
    pub fn contains(self, text: &str, keyword: &str) -> bool {
        if keyword.is_empty() {
            return false;
        }

        match self {
            MatchMode::Substring => text.contains(keyword),
            MatchMode::WordBoundary => text
                .match_indices(keyword)
                .any(|(start, hit)| is_boundary(text, start, start + hit.len())),
        }
    }
}

/// A hit is bounded if neither neighbouring character is alphanumeric.
fn is_boundary(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
}

/// Resolves text to intent names using a fixed [`MatchMode`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Matcher {
    mode: MatchMode,
}

impl Matcher {
    pub fn new(mode: MatchMode) -> Self {
        Self { mode }
    }

    /// Find the first intent, in store order, with a keyword contained in `text`.
    pub fn match_intent<'s>(&self, text: &str, store: &'s IntentStore) -> Option<&'s str> {
        let text = text.to_lowercase();

        let found = store.iter().find_map(|(name, intent)| {
            intent
                .keywords()
                .iter()
                .find(|keyword| self.mode.contains(&text, keyword))
                .map(|keyword| (name, keyword))
        });

        match found {
            Some((name, keyword)) => {
                debug!(intent = name, keyword = %keyword, "matched intent");
                Some(name)
            }
            None => {
                debug!(text = %text, "no intent matched");
                None
            }
        }
    }
}

/// Match with the default substring mode.
pub fn match_intent<'s>(text: &str, store: &'s IntentStore) -> Option<&'s str> {
    Matcher::default().match_intent(text, store)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_overlapping() -> IntentStore {
        let mut store = IntentStore::new();
        store.learn("first", "apple", "1");
        store.learn("second", "apple pie", "2");
        store
    }

    #[test]
    fn test_default_store_greeting() {
        let store = IntentStore::with_defaults();
        assert_eq!(match_intent("hello there", &store), Some("greeting"));
    }

    #[test]
    fn test_default_store_no_match() {
        let store = IntentStore::with_defaults();
        assert_eq!(match_intent("xyz", &store), None);
    }

    #[test]
    fn test_case_insensitive() {
        let store = IntentStore::with_defaults();
        assert_eq!(match_intent("HELLO THERE", &store), Some("greeting"));
        assert_eq!(match_intent("GoodBye now", &store), Some("farewell"));
    }

    #[test]
    fn test_lowercase_idempotence() {
        let store = IntentStore::with_defaults();
        for text in ["Hey You", "SEE YOU", "What's Up?", "nothing here", "ÉCOLE"] {
            assert_eq!(
                match_intent(text, &store),
                match_intent(&text.to_lowercase(), &store)
            );
        }
    }

    #[test]
    fn test_first_match_wins() {
        let store = two_overlapping();
        assert_eq!(match_intent("i want apple pie", &store), Some("first"));
    }

    #[test]
    fn test_substring_matches_inside_words() {
        let store = IntentStore::with_defaults();
        // "hi" is inside "this"
        assert_eq!(match_intent("this is odd", &store), Some("greeting"));
    }

    #[test]
    fn test_word_boundary_rejects_inner_hits() {
        let store = IntentStore::with_defaults();
        let matcher = Matcher::new(MatchMode::WordBoundary);

        assert_eq!(matcher.match_intent("this is odd", &store), None);
        assert_eq!(matcher.match_intent("hi!", &store), Some("greeting"));
        assert_eq!(matcher.match_intent("oh, hi there", &store), Some("greeting"));
        assert_eq!(matcher.match_intent("see you soon", &store), Some("farewell"));
    }

    #[test]
    fn test_word_boundary_checks_every_occurrence() {
        assert!(MatchMode::WordBoundary.contains("this hi", "hi"));
        assert!(!MatchMode::WordBoundary.contains("this chin", "hi"));
    }

    #[test]
    fn test_word_boundary_multibyte_neighbours() {
        assert!(!MatchMode::WordBoundary.contains("éhi", "hi"));
        assert!(MatchMode::WordBoundary.contains("¡hola!", "hola"));
    }

    #[test]
    fn test_empty_keyword_never_matches() {
        let mut store = IntentStore::new();
        store.learn("blank", "", "never");
        assert_eq!(match_intent("anything", &store), None);
        assert_eq!(match_intent("", &store), None);
    }

    #[test]
    fn test_deterministic() {
        let store = two_overlapping();
        let first = match_intent("apple pie please", &store);
        for _ in 0..10 {
            assert_eq!(match_intent("apple pie please", &store), first);
        }
    }

    #[test]
    fn test_match_mode_serde() {
        assert_eq!(
            serde_json::to_string(&MatchMode::WordBoundary).unwrap(),
            "\"word-boundary\""
        );
    }
}
