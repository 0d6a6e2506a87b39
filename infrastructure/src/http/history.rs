//! History client for the relay server.

use super::error::HttpError;
use super::{build_client, normalize_base_url};
use async_trait::async_trait;
use relay_application::ports::history::{HistoryError, HistoryPort};
use relay_domain::{Message, Role, SessionId};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    #[serde(default)]
    messages: Vec<WireMessage>,
}

#[derive(Debug, Deserialize)]
struct WireMessage {
    #[serde(default)]
    role: String,
    #[serde(default)]
    content: String,
}

impl From<WireMessage> for Message {
    fn from(wire: WireMessage) -> Self {
        Message {
            role: Role::from_wire(&wire.role),
            content: wire.content,
        }
    }
}

pub struct HttpHistoryClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpHistoryClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, HttpError> {
        Ok(Self {
            client: build_client()?,
            base_url: normalize_base_url(base_url)?,
            timeout,
        })
    }

    fn endpoint(&self, session: &SessionId) -> String {
        format!("{}/history/{}", self.base_url, session.as_str())
    }
}

#[async_trait]
impl HistoryPort for HttpHistoryClient {
    async fn fetch(&self, session: &SessionId, limit: usize) -> Result<Vec<Message>, HistoryError> {
        let response = self
            .client
            .get(self.endpoint(session))
            .query(&[("limit", limit)])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| HistoryError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(HistoryError::UnexpectedStatus(status.as_u16()));
        }

        let body: HistoryResponse = response
            .json()
            .await
            .map_err(|e| HistoryError::Decode(e.to_string()))?;
        debug!(count = body.messages.len(), "History fetched");

        Ok(body.messages.into_iter().map(Message::from).collect())
    }

    async fn clear(&self, session: &SessionId) -> Result<(), HistoryError> {
        let response = self
            .client
            .delete(self.endpoint(session))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| HistoryError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(HistoryError::UnexpectedStatus(status.as_u16()));
        }
        debug!(session = session.short(), "History cleared");
        Ok(())
    }
}
