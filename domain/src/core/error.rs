//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Query is empty")]
    EmptyQuery,

    #[error("Invalid session id: {0}")]
    InvalidSessionId(String),

    #[error("Invalid response transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Invalid pacing configuration: {0}")]
    InvalidPacing(String),
}
