//! File-backed session store.
//!
//! The active session id is kept in a one-line file so a conversation
//! survives restarts.

use relay_application::ports::session_store::{SessionStore, SessionStoreError};
use relay_domain::SessionId;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

const SESSION_FILE: &str = "session_id";

pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<data dir>/chat-relay/session_id`, if the platform has a data dir.
    pub fn default_location() -> Option<Self> {
        Self::default_dir().map(|dir| Self::new(dir.join(SESSION_FILE)))
    }

    /// `<data dir>/chat-relay`
    pub fn default_dir() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("chat-relay"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<SessionId>, SessionStoreError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(SessionStoreError::Io(e.to_string())),
        };
        SessionId::parse(&raw)
            .map(Some)
            .map_err(|e| SessionStoreError::Corrupt(e.to_string()))
    }

    fn save(&self, id: &SessionId) -> Result<(), SessionStoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SessionStoreError::Io(e.to_string()))?;
        }
        std::fs::write(&self.path, format!("{}\n", id.as_str()))
            .map_err(|e| SessionStoreError::Io(e.to_string()))?;
        debug!("Saved session id to {}", self.path.display());
        Ok(())
    }
}
