//! The in-flight answer to one query.

use super::error::ResponseError;
use super::phase::ResponsePhase;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// How the answer is being delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransportKind {
    /// Server-sent event stream of fragments.
    Stream,
    /// One request, one complete payload.
    SingleShot,
}

/// State of one answer to one query (Entity)
///
/// Fragments are appended to `raw_text` strictly in arrival order. The
/// `revealed` prefix is what the pacing buffer has released for display so
/// far; it never runs ahead of `raw_text`.
#[derive(Debug, Clone)]
pub struct ResponseStream {
    transport: TransportKind,
    phase: ResponsePhase,
    raw_text: String,
    revealed: String,
    chunks: usize,
    terminated: bool,
    error: Option<ResponseError>,
}

impl ResponseStream {
    pub fn new(transport: TransportKind) -> Self {
        Self {
            transport,
            phase: ResponsePhase::Idle,
            raw_text: String::new(),
            revealed: String::new(),
            chunks: 0,
            terminated: false,
            error: None,
        }
    }

    pub fn transport(&self) -> TransportKind {
        self.transport
    }

    pub fn phase(&self) -> ResponsePhase {
        self.phase
    }

    /// Everything received so far, in arrival order.
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    /// The prefix of `raw_text` released for display.
    pub fn revealed(&self) -> &str {
        &self.revealed
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks
    }

    pub fn any_data_received(&self) -> bool {
        self.chunks > 0
    }

    /// True once the transport has delivered its last event.
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    pub fn error(&self) -> Option<&ResponseError> {
        self.error.as_ref()
    }

    fn transition(&mut self, next: ResponsePhase) -> Result<(), DomainError> {
        if !self.phase.can_transition_to(next) {
            return Err(DomainError::InvalidTransition {
                from: self.phase.to_string(),
                to: next.to_string(),
            });
        }
        self.phase = next;
        Ok(())
    }

    /// The query has been sent.
    pub fn begin(&mut self) -> Result<(), DomainError> {
        self.transition(ResponsePhase::AwaitingFirstByte)
    }

    /// Append a fragment. Returns `true` when this was the first fragment,
    /// i.e. the moment the working indicator should be cleared.
    pub fn push_chunk(&mut self, chunk: &str) -> Result<bool, DomainError> {
        let first = match self.phase {
            ResponsePhase::AwaitingFirstByte => {
                self.transition(ResponsePhase::Streaming)?;
                true
            }
            ResponsePhase::Streaming => false,
            other => {
                return Err(DomainError::InvalidTransition {
                    from: other.to_string(),
                    to: ResponsePhase::Streaming.to_string(),
                });
            }
        };
        self.raw_text.push_str(chunk);
        self.chunks += 1;
        Ok(first)
    }

    /// Mark `text` as revealed. The pacing buffer only ever releases
    /// characters it received from `push_chunk`, in order.
    pub fn reveal(&mut self, text: &str) {
        self.revealed.push_str(text);
        debug_assert!(self.raw_text.starts_with(&self.revealed));
    }

    /// The transport signalled end-of-stream (or broke after partial data).
    pub fn end_of_stream(&mut self) -> Result<(), DomainError> {
        self.transition(ResponsePhase::Finalizing)?;
        self.terminated = true;
        Ok(())
    }

    /// The final pass has been rendered.
    pub fn complete(&mut self) -> Result<(), DomainError> {
        self.transition(ResponsePhase::Complete)
    }

    /// Abandon this stream with a fatal error.
    pub fn fail(&mut self, error: ResponseError) -> Result<(), DomainError> {
        self.transition(ResponsePhase::Errored)?;
        self.terminated = true;
        self.error = Some(error);
        Ok(())
    }

    /// Record a recovered error without changing phase. The first recorded
    /// error wins.
    pub fn note_error(&mut self, error: ResponseError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    /// Replace an errored streaming attempt with a fresh single-shot stream.
    pub fn into_single_shot(self) -> Result<ResponseStream, DomainError> {
        if self.phase != ResponsePhase::Errored {
            return Err(DomainError::InvalidTransition {
                from: self.phase.to_string(),
                to: "single-shot fallback".to_string(),
            });
        }
        Ok(ResponseStream::new(TransportKind::SingleShot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn streaming() -> ResponseStream {
        let mut stream = ResponseStream::new(TransportKind::Stream);
        stream.begin().unwrap();
        stream
    }

    #[test]
    fn new_stream_is_idle_and_empty() {
        let stream = ResponseStream::new(TransportKind::Stream);
        assert_eq!(stream.phase(), ResponsePhase::Idle);
        assert!(!stream.any_data_received());
        assert!(!stream.is_terminated());
        assert!(stream.error().is_none());
    }

    #[test]
    fn first_chunk_moves_to_streaming() {
        let mut stream = streaming();
        assert!(stream.push_chunk("He").unwrap());
        assert!(!stream.push_chunk("llo").unwrap());
        assert_eq!(stream.phase(), ResponsePhase::Streaming);
        assert_eq!(stream.raw_text(), "Hello");
        assert_eq!(stream.chunk_count(), 2);
    }

    #[test]
    fn chunk_before_begin_is_rejected() {
        let mut stream = ResponseStream::new(TransportKind::Stream);
        assert!(stream.push_chunk("x").is_err());
        assert_eq!(stream.raw_text(), "");
    }

    #[test]
    fn chunk_after_end_is_rejected() {
        let mut stream = streaming();
        stream.push_chunk("a").unwrap();
        stream.end_of_stream().unwrap();
        assert!(stream.push_chunk("b").is_err());
        assert_eq!(stream.raw_text(), "a");
    }

    #[test]
    fn full_lifecycle() {
        let mut stream = streaming();
        stream.push_chunk("Hi").unwrap();
        stream.reveal("H");
        stream.reveal("i");
        stream.end_of_stream().unwrap();
        assert!(stream.is_terminated());
        stream.complete().unwrap();
        assert_eq!(stream.phase(), ResponsePhase::Complete);
        assert_eq!(stream.revealed(), "Hi");
    }

    #[test]
    fn empty_answer_can_finalize() {
        let mut stream = streaming();
        stream.end_of_stream().unwrap();
        stream.complete().unwrap();
        assert_eq!(stream.raw_text(), "");
    }

    #[test]
    fn fail_is_absorbing() {
        let mut stream = streaming();
        stream
            .fail(ResponseError::TransportOpen("refused".into()))
            .unwrap();
        assert_eq!(stream.phase(), ResponsePhase::Errored);
        assert!(stream.end_of_stream().is_err());
        assert!(stream.complete().is_err());
    }

    #[test]
    fn single_shot_requires_errored_stream() {
        let stream = streaming();
        assert!(stream.clone().into_single_shot().is_err());

        let mut stream = stream;
        stream.fail(ResponseError::TransportOpen("x".into())).unwrap();
        let fallback = stream.into_single_shot().unwrap();
        assert_eq!(fallback.transport(), TransportKind::SingleShot);
        assert_eq!(fallback.phase(), ResponsePhase::Idle);
    }

    #[test]
    fn first_noted_error_wins() {
        let mut stream = streaming();
        stream.note_error(ResponseError::TransportMidStream("eof".into()));
        stream.note_error(ResponseError::Render("bad".into()));
        assert_eq!(
            stream.error(),
            Some(&ResponseError::TransportMidStream("eof".into()))
        );
        assert_eq!(stream.phase(), ResponsePhase::AwaitingFirstByte);
    }
}
