//! Transport events for one streamed answer.
//!
//! [`StreamEvent`] is what a chunk source hands to the response controller:
//! an ordered sequence of `Delta` fragments, closed by exactly one `Done` or
//! `Error`.

/// An event delivered by a streaming transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A text fragment, to be appended in arrival order.
    Delta(String),
    /// The server signalled end-of-stream.
    Done,
    /// The channel broke; carries a human-readable reason.
    Error(String),
}

impl StreamEvent {
    /// Returns the text content if this is a `Delta` event.
    pub fn text(&self) -> Option<&str> {
        match self {
            StreamEvent::Delta(s) => Some(s),
            _ => None,
        }
    }

    /// Returns true if this event signals the end of the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Done | StreamEvent::Error(_))
    }
}
