//! Testing utilities for the chatbot.
//!
//! This module provides tools for integration testing:
//! - `TestHarness` for scripted conversations with a seeded RNG
//! - Assertion helpers for verifying matches and store contents

use crate::intent::Intent;
use crate::matcher::MatchMode;
use crate::session::{ChatSession, Reply};
use crate::store::IntentStore;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Seed used when a test does not pick its own.
pub const DEFAULT_SEED: u64 = 0x5eed;

/// Test harness for running conversations without touching disk.
pub struct TestHarness {
    /// The session under test.
    pub session: ChatSession,
    /// Deterministic RNG for response selection.
    rng: StdRng,
}

impl TestHarness {
    /// Create a harness over the built-in default store.
    pub fn new() -> Self {
        Self::with_store(IntentStore::with_defaults())
    }

    /// Create a harness over a custom store.
    pub fn with_store(store: IntentStore) -> Self {
        Self {
            session: ChatSession::in_memory(store, MatchMode::Substring),
            rng: StdRng::seed_from_u64(DEFAULT_SEED),
        }
    }

    /// Switch the match mode, keeping the current store.
    pub fn with_match_mode(self, mode: MatchMode) -> Self {
        Self {
            session: ChatSession::in_memory(self.session.store().clone(), mode),
            rng: self.rng,
        }
    }

    /// Reseed the response RNG.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Send one line and get the reply.
    pub fn say(&mut self, text: &str) -> Reply {
        self.session.respond_with_rng(text, &mut self.rng)
    }

    /// Teach an intent in one step.
    pub fn teach(&mut self, name: &str, keyword: &str, response: &str) -> &mut Self {
        self.session.learn(name, keyword, response);
        self
    }

    /// Look up an intent in the session's store.
    pub fn intent(&self, name: &str) -> Option<&Intent> {
        self.session.store().get(name)
    }

    /// Assert that `text` is answered by `intent` with one of its responses.
    pub fn assert_reply_from(&mut self, text: &str, intent: &str) -> String {
        let reply = self.say(text);
        assert_eq!(
            reply.intent(),
            Some(intent),
            "expected {text:?} to match intent {intent:?}"
        );
        let response = reply
            .response()
            .unwrap_or_else(|| panic!("intent {intent:?} gave no response"))
            .to_string();

        let responses = self
            .intent(intent)
            .map(Intent::responses)
            .unwrap_or_default();
        assert!(
            responses.iter().any(|r| *r == response),
            "response {response:?} is not one of {intent:?}'s responses"
        );
        response
    }

    /// Assert that nothing matches `text`.
    pub fn assert_not_understood(&mut self, text: &str) {
        assert_eq!(
            self.say(text),
            Reply::NotUnderstood,
            "expected {text:?} to match nothing"
        );
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_harness_greeting() {
        let mut harness = TestHarness::new();
        harness.assert_reply_from("hello there", "greeting");
        harness.assert_not_understood("xyz");
    }

    #[test]
    fn test_harness_teach() {
        let mut harness = TestHarness::new();
        harness.teach("thanks", "thank you", "You're welcome!");

        let response = harness.assert_reply_from("Thank you so much", "thanks");
        assert_eq!(response, "You're welcome!");
    }

    #[test]
    fn test_harness_same_seed_same_replies() {
        let mut a = TestHarness::new().with_seed(9);
        let mut b = TestHarness::new().with_seed(9);

        for _ in 0..5 {
            assert_eq!(a.say("hey"), b.say("hey"));
        }
    }

    #[test]
    fn test_harness_match_mode() {
        let mut harness = TestHarness::new().with_match_mode(MatchMode::WordBoundary);
        harness.assert_not_understood("this");
    }
}
