//! Failures a response can run into.
//!
//! Every variant is recovered locally: the answer either falls back, keeps
//! its partial text, shows an error text, or degrades to plain rendering.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResponseError {
    /// The stream could not be established; the single-shot call takes over.
    #[error("stream could not be opened: {0}")]
    TransportOpen(String),

    /// The stream broke after partial data; the partial answer is kept.
    #[error("stream interrupted: {0}")]
    TransportMidStream(String),

    /// The single-shot endpoint answered with a non-success status.
    #[error("server returned status {status}")]
    ServerStatus { status: u16 },

    /// The single-shot call failed before any response arrived.
    #[error("network error: {0}")]
    Network(String),

    /// Markdown conversion or sanitization failed; plain text was shown.
    #[error("render failed: {0}")]
    Render(String),
}

impl ResponseError {
    /// True for failures of the stream or single-shot transport.
    pub fn is_transport(&self) -> bool {
        !matches!(self, ResponseError::Render(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_error_is_not_transport() {
        assert!(!ResponseError::Render("x".into()).is_transport());
        assert!(ResponseError::TransportOpen("x".into()).is_transport());
        assert!(ResponseError::ServerStatus { status: 502 }.is_transport());
    }

    #[test]
    fn display_includes_status() {
        let err = ResponseError::ServerStatus { status: 503 };
        assert_eq!(err.to_string(), "server returned status 503");
    }
}
