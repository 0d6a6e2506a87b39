//! Conversation history port
//!
//! Stored history lives on the server; the client only lists and clears it.

use async_trait::async_trait;
use relay_domain::{Message, SessionId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("History request failed: {0}")]
    RequestFailed(String),

    #[error("History service returned status {0}")]
    UnexpectedStatus(u16),

    #[error("Malformed history response: {0}")]
    Decode(String),
}

#[async_trait]
pub trait HistoryPort: Send + Sync {
    /// The last `limit` messages of `session`, oldest first.
    async fn fetch(&self, session: &SessionId, limit: usize) -> Result<Vec<Message>, HistoryError>;

    /// Delete all stored messages of `session`.
    async fn clear(&self, session: &SessionId) -> Result<(), HistoryError>;
}

/// History port for setups without a history service.
pub struct NoHistory;

#[async_trait]
impl HistoryPort for NoHistory {
    async fn fetch(&self, _session: &SessionId, _limit: usize) -> Result<Vec<Message>, HistoryError> {
        Ok(Vec::new())
    }

    async fn clear(&self, _session: &SessionId) -> Result<(), HistoryError> {
        Ok(())
    }
}
