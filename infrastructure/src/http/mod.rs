//! HTTP adapters for the relay server.
//!
//! - [`HttpChunkSource`]: `GET /invoke/stream` (SSE) and `POST /invoke`
//! - [`HttpHistoryClient`]: `GET`/`DELETE /history/{session_id}`

pub mod error;
mod history;
mod relay_client;

pub use error::HttpError;
pub use history::HttpHistoryClient;
pub use relay_client::HttpChunkSource;

use reqwest::Client;

fn build_client() -> Result<Client, HttpError> {
    Client::builder()
        .user_agent(concat!("chat-relay/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(HttpError::Client)
}

/// Validated base URL without a trailing slash.
fn normalize_base_url(base_url: &str) -> Result<String, HttpError> {
    let trimmed = base_url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(HttpError::InvalidBaseUrl(base_url.to_string()));
    }
    reqwest::Url::parse(trimmed).map_err(|_| HttpError::InvalidBaseUrl(base_url.to_string()))?;
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_removed() {
        assert_eq!(
            normalize_base_url("http://127.0.0.1:8000/").unwrap(),
            "http://127.0.0.1:8000"
        );
        assert_eq!(
            normalize_base_url(" https://relay.example.com/api ").unwrap(),
            "https://relay.example.com/api"
        );
    }

    #[test]
    fn invalid_base_url_rejected() {
        assert!(matches!(
            normalize_base_url(""),
            Err(HttpError::InvalidBaseUrl(_))
        ));
        assert!(matches!(
            normalize_base_url("not a url"),
            Err(HttpError::InvalidBaseUrl(_))
        ));
    }
}
