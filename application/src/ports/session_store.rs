//! Session store port
//!
//! Persists the active session id so a conversation survives restarts.

use relay_domain::SessionId;
use std::sync::Mutex;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionStoreError {
    #[error("Session store I/O error: {0}")]
    Io(String),

    #[error("Stored session id is invalid: {0}")]
    Corrupt(String),
}

pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<SessionId>, SessionStoreError>;

    fn save(&self, id: &SessionId) -> Result<(), SessionStoreError>;
}

/// Process-local store, used for `--ephemeral` runs and tests.
#[derive(Default)]
pub struct InMemorySessionStore {
    current: Mutex<Option<SessionId>>,
}

impl InMemorySessionStore {
    pub fn with_session(id: SessionId) -> Self {
        Self {
            current: Mutex::new(Some(id)),
        }
    }
}

impl SessionStore for InMemorySessionStore {
    fn load(&self) -> Result<Option<SessionId>, SessionStoreError> {
        let current = self
            .current
            .lock()
            .map_err(|e| SessionStoreError::Io(e.to_string()))?;
        Ok(current.clone())
    }

    fn save(&self, id: &SessionId) -> Result<(), SessionStoreError> {
        let mut current = self
            .current
            .lock()
            .map_err(|e| SessionStoreError::Io(e.to_string()))?;
        *current = Some(id.clone());
        Ok(())
    }
}
