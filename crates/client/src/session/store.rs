//! Session persistence port.
//!
//! The session manager persists its state through this trait so the storage
//! backend stays swappable per target environment (JSON file for the CLI,
//! in-memory for tests, an OS keychain adapter later).

use std::path::PathBuf;
use std::sync::Mutex;

use thiserror::Error;

use super::Session;

/// Errors raised by a [`SessionStore`] implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing storage failed.
    #[error("session storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stored record could not be encoded or decoded.
    #[error("session record encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Durable storage for the single session record.
///
/// Implementations must be cheap to call: `save` runs on every token or
/// profile mutation. Failures are logged by the session manager and never
/// block the in-memory state transition.
pub trait SessionStore: Send + Sync {
    /// Load the persisted session, if one exists.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the backing storage is unreadable or the
    /// record is corrupt. Callers treat both the same as "no session".
    fn load(&self) -> Result<Option<Session>, StoreError>;

    /// Persist the session record, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the record cannot be written.
    fn save(&self, session: &Session) -> Result<(), StoreError>;

    /// Remove the persisted record. A missing record is not an error.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when removal fails for any other reason.
    fn clear(&self) -> Result<(), StoreError>;
}

/// JSON-file-backed store, the default for CLI and desktop targets.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Create a store writing to `path`. Parent directories are created on
    /// the first save.
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<Session>, StoreError> {
        let raw = match std::fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&raw)?))
    }

    fn save(&self, session: &Session) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_vec_pretty(session)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory store for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    inner: Mutex<Option<Session>>,
}

impl MemorySessionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<Session>, StoreError> {
        Ok(self.inner.lock().map_or(None, |guard| guard.clone()))
    }

    fn save(&self, session: &Session) -> Result<(), StoreError> {
        if let Ok(mut guard) = self.inner.lock() {
            *guard = Some(session.clone());
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        if let Ok(mut guard) = self.inner.lock() {
            *guard = None;
        }
        Ok(())
    }
}
