//! Port for structured conversation logging.
//!
//! Defines the [`ConversationLogger`] trait for recording a machine-readable
//! transcript (queries, completed answers, fallbacks, session resets).
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostics, this port captures the transcript (JSONL).

use relay_domain::{Query, ResponseError, SessionId, TransportKind};
use serde_json::{Value, json};

/// A structured conversation event for logging.
pub struct ConversationEvent {
    /// Event type identifier (e.g., "query_submitted", "response_completed").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl ConversationEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }

    pub fn query_submitted(session: &SessionId, query: &Query) -> Self {
        Self::new(
            "query_submitted",
            json!({ "session_id": session.as_str(), "query": query.content() }),
        )
    }

    pub fn response_completed(
        session: &SessionId,
        transport: TransportKind,
        text: &str,
        error: Option<&ResponseError>,
    ) -> Self {
        Self::new(
            "response_completed",
            json!({
                "session_id": session.as_str(),
                "transport": transport,
                "text": text,
                "error": error.map(|e| e.to_string()),
            }),
        )
    }

    pub fn fallback_used(session: &SessionId, cause: &ResponseError) -> Self {
        Self::new(
            "fallback_used",
            json!({ "session_id": session.as_str(), "cause": cause.to_string() }),
        )
    }

    pub fn session_reset(previous: &SessionId, current: &SessionId, history_cleared: bool) -> Self {
        Self::new(
            "session_reset",
            json!({
                "previous_session_id": previous.as_str(),
                "session_id": current.as_str(),
                "history_cleared": history_cleared,
            }),
        )
    }
}

/// Port for logging conversation events to a structured log.
///
/// `log` is synchronous and infallible; implementations swallow their own
/// I/O failures.
pub trait ConversationLogger: Send + Sync {
    fn log(&self, event: ConversationEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_completed_payload() {
        let session = SessionId::parse("s_abcd").unwrap();
        let event = ConversationEvent::response_completed(
            &session,
            TransportKind::SingleShot,
            "ok",
            Some(&ResponseError::ServerStatus { status: 500 }),
        );
        assert_eq!(event.event_type, "response_completed");
        assert_eq!(event.payload["transport"], "single-shot");
        assert_eq!(event.payload["text"], "ok");
        assert_eq!(event.payload["error"], "server returned status 500");
    }

    #[test]
    fn query_submitted_payload() {
        let session = SessionId::parse("s_abcd").unwrap();
        let query = Query::try_new("hello").unwrap();
        let event = ConversationEvent::query_submitted(&session, &query);
        assert_eq!(event.payload["session_id"], "s_abcd");
        assert_eq!(event.payload["query"], "hello");
    }
}
