//! Chunk source port
//!
//! Defines how the application layer obtains answer text from the backend:
//! either as a stream of fragments or as one complete payload.

use async_trait::async_trait;
use relay_domain::{Query, ResponseError, SessionId, StreamEvent};
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors that can occur while opening a streaming transport
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Unexpected status: {0}")]
    UnexpectedStatus(u16),

    #[error("Timeout")]
    Timeout,
}

/// Handle for receiving the events of one streamed answer.
///
/// Wraps an `mpsc::Receiver<StreamEvent>`. Dropping the handle closes the
/// transport on the producer side.
pub struct StreamHandle {
    pub receiver: mpsc::Receiver<StreamEvent>,
}

impl StreamHandle {
    pub fn new(receiver: mpsc::Receiver<StreamEvent>) -> Self {
        Self { receiver }
    }

    /// Next event, or `None` once the producer has gone away.
    pub async fn next(&mut self) -> Option<StreamEvent> {
        self.receiver.recv().await
    }
}

/// Result of a single-shot request.
///
/// Never an `Err`: server and network failures are turned into an error text
/// that is shown as the answer, with the failure recorded alongside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleShotReply {
    pub text: String,
    pub failure: Option<ResponseError>,
}

impl SingleShotReply {
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            failure: None,
        }
    }

    /// A non-success HTTP status. `detail` is whatever the body said.
    pub fn server_status(status: u16, detail: &str) -> Self {
        let detail = detail.trim();
        let text = if detail.is_empty() {
            format!("Server error ({status})")
        } else {
            format!("Server error ({status}): {detail}")
        };
        Self {
            text,
            failure: Some(ResponseError::ServerStatus { status }),
        }
    }

    /// The request never produced a response.
    pub fn network(detail: impl Into<String>) -> Self {
        let detail = detail.into();
        Self {
            text: format!("Network error: {detail}"),
            failure: Some(ResponseError::Network(detail)),
        }
    }
}

/// Source of answer text for one query.
///
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait ChunkSource: Send + Sync {
    /// Open a fragment stream for `query`.
    async fn open_stream(
        &self,
        query: &Query,
        session: &SessionId,
    ) -> Result<StreamHandle, TransportError>;

    /// Fetch the complete answer in one request/response round trip.
    async fn invoke(&self, query: &Query, session: &SessionId) -> SingleShotReply;

    /// Whether `open_stream` can work at all in this runtime.
    fn supports_streaming(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn handle_yields_events_in_order_then_none() {
        let (tx, rx) = mpsc::channel(4);
        tx.send(StreamEvent::Delta("He".into())).await.unwrap();
        tx.send(StreamEvent::Done).await.unwrap();
        drop(tx);

        let mut handle = StreamHandle::new(rx);
        assert_eq!(handle.next().await, Some(StreamEvent::Delta("He".into())));
        assert_eq!(handle.next().await, Some(StreamEvent::Done));
        assert_eq!(handle.next().await, None);
    }

    #[test]
    fn ok_reply_has_no_failure() {
        let reply = SingleShotReply::ok("answer");
        assert_eq!(reply.text, "answer");
        assert_eq!(reply.failure, None);
    }

    #[test]
    fn server_status_reply_carries_error_text() {
        let reply = SingleShotReply::server_status(502, "bad gateway\n");
        assert_eq!(reply.text, "Server error (502): bad gateway");
        assert_eq!(reply.failure, Some(ResponseError::ServerStatus { status: 502 }));

        let bare = SingleShotReply::server_status(500, "");
        assert_eq!(bare.text, "Server error (500)");
    }

    #[test]
    fn network_reply_carries_error_text() {
        let reply = SingleShotReply::network("connection refused");
        assert_eq!(reply.text, "Network error: connection refused");
        assert!(matches!(reply.failure, Some(ResponseError::Network(_))));
    }
}
