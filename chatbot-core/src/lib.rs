//! Rule-based chatbot engine that learns new intents from its user.
//!
//! This crate provides:
//! - An ordered intent store with append-only teach/edit operations
//! - A keyword matcher (substring or word-boundary)
//! - Random response selection
//! - JSON persistence with atomic saves
//!
//! # Quick Start
//!
//! ```no_run
//! use chatbot_core::{ChatSession, Reply, SessionConfig};
//!
//! fn main() -> Result<(), chatbot_core::SessionError> {
//!     let mut session = ChatSession::open(SessionConfig::new("intenciones.json"))?;
//!
//!     match session.respond("hello there") {
//!         Reply::Matched { response, .. } => println!("{response}"),
//!         _ => {
//!             session.learn("thanks", "thank you", "You're welcome!");
//!         }
//!     }
//!
//!     session.close();
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod intent;
pub mod matcher;
pub mod persist;
pub mod session;
pub mod store;
pub mod testing;

// Primary public API
pub use config::{SavePolicy, SessionConfig};
pub use intent::Intent;
pub use matcher::{match_intent, MatchMode, Matcher};
pub use persist::{CorruptStorePolicy, IntentFile, LoadSource, PersistError, DEFAULT_STORE_FILE};
pub use session::{ChatSession, Durability, Reply, SessionError};
pub use store::{IntentStore, StoreError};
pub use testing::TestHarness;
