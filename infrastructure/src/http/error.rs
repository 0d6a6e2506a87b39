//! Error types for the HTTP adapters

use thiserror::Error;

/// Errors raised while setting up an HTTP adapter.
///
/// Request-time failures are mapped onto the application port errors
/// (`TransportError`, `HistoryError`) or into a `SingleShotReply`.
#[derive(Error, Debug)]
pub enum HttpError {
    #[error("Invalid server base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}
