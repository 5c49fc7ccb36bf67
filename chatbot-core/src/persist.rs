//! Intent store persistence.
//!
//! The store is kept as a single pretty-printed JSON document. Reads and
//! writes are whole-file. Saves go through a sibling temporary file that is
//! renamed over the target, so a crash mid-write leaves the previous file
//! intact.

use crate::store::IntentStore;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Default file name, shared with data written by earlier versions.
pub const DEFAULT_STORE_FILE: &str = "intenciones.json";

/// Errors from persistence operations.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Intent store {} is not valid: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// What to do when the store file exists but cannot be parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CorruptStorePolicy {
    /// Refuse to start; the caller gets [`PersistError::Corrupt`].
    #[default]
    Fail,
    /// Move the bad file aside and continue with the built-in defaults.
    UseDefaults,
}

/// Where a loaded store came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadSource {
    /// Parsed from the store file.
    File,
    /// No store file yet; built-in defaults.
    Missing,
    /// The file was corrupt and has been moved to `quarantined`; built-in defaults.
    Quarantined { quarantined: PathBuf },
}

impl LoadSource {
    /// Whether the store in memory is the built-in default.
    pub fn is_default(&self) -> bool {
        !matches!(self, LoadSource::File)
    }
}

/// A store file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentFile {
    path: PathBuf,
}

impl IntentFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the store, falling back to defaults when the file is absent.
    ///
    /// Any other read error is returned, so an existing file that could not
    /// be read is never replaced by a later save.
    pub fn load(
        &self,
        policy: CorruptStorePolicy,
    ) -> Result<(IntentStore, LoadSource), PersistError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %self.path.display(), "no intent store yet, using defaults");
                return Ok((IntentStore::with_defaults(), LoadSource::Missing));
            }
            Err(source) => return Err(self.io_error(&self.path, source)),
        };

        match serde_json::from_slice::<IntentStore>(&bytes) {
            Ok(store) => {
                info!(path = %self.path.display(), intents = store.len(), "loaded intent store");
                Ok((store, LoadSource::File))
            }
            Err(source) => match policy {
                CorruptStorePolicy::Fail => Err(PersistError::Corrupt {
                    path: self.path.clone(),
                    source,
                }),
                CorruptStorePolicy::UseDefaults => {
                    warn!(path = %self.path.display(), error = %source, "intent store is corrupt, using defaults");
                    let quarantined = self.quarantine()?;
                    Ok((
                        IntentStore::with_defaults(),
                        LoadSource::Quarantined { quarantined },
                    ))
                }
            },
        }
    }

    /// Serialize the whole store, replacing the previous contents.
    pub fn save(&self, store: &IntentStore) -> Result<(), PersistError> {
        let content = to_pretty_json(store)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| self.io_error(parent, source))?;
        }

        let tmp = self.sibling("tmp");
        if let Err(source) = fs::write(&tmp, content) {
            let _ = fs::remove_file(&tmp);
            return Err(self.io_error(&tmp, source));
        }
        if let Err(source) = fs::rename(&tmp, &self.path) {
            let _ = fs::remove_file(&tmp);
            return Err(self.io_error(&self.path, source));
        }

        info!(path = %self.path.display(), intents = store.len(), "saved intent store");
        Ok(())
    }

    /// Move a corrupt file to `<name>.corrupt` so the next save does not destroy it.
    ///
    /// Fails if the file cannot be moved; the caller must not continue with defaults then.
    fn quarantine(&self) -> Result<PathBuf, PersistError> {
        let target = self.sibling("corrupt");
        fs::rename(&self.path, &target).map_err(|source| {
            warn!(path = %self.path.display(), error = %source, "could not move corrupt intent store aside");
            self.io_error(&target, source)
        })?;
        Ok(target)
    }

    /// `<file name>.<suffix>` in the same directory as the store.
    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| DEFAULT_STORE_FILE.into());
        name.push(".");
        name.push(suffix);
        self.path.with_file_name(name)
    }

    fn io_error(&self, path: &Path, source: io::Error) -> PersistError {
        PersistError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl Default for IntentFile {
    fn default() -> Self {
        Self::new(DEFAULT_STORE_FILE)
    }
}

/// Pretty-print with four-space indentation, matching existing data files.
fn to_pretty_json(store: &IntentStore) -> Result<Vec<u8>, PersistError> {
    let mut out = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
    store.serialize(&mut serializer)?;
    out.push(b'\n');
    Ok(out)
}
