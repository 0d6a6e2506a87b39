//! Chunk source backed by the relay server.
//!
//! The stream endpoint speaks server-sent events. Each unnamed event's data
//! is one answer fragment; the named `done` event ends the answer. A data
//! payload of `[DONE]` is a legacy sentinel and carries no content.

use super::error::HttpError;
use super::{build_client, normalize_base_url};
use async_trait::async_trait;
use eventsource_stream::{Event, Eventsource};
use futures::{Stream, StreamExt};
use relay_application::ports::chunk_source::{
    ChunkSource, SingleShotReply, StreamHandle, TransportError,
};
use relay_domain::{Query, SessionId, StreamEvent, preview};
use reqwest::Client;
use reqwest::header::ACCEPT;
use serde_json::{Value, json};
use std::fmt::Display;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{debug, warn};

const LEGACY_DONE_SENTINEL: &str = "[DONE]";
const DONE_EVENT: &str = "done";
const ERROR_EVENT: &str = "error";

/// Payload fields tried in order when decoding a single-shot answer.
const PAYLOAD_FIELDS: [&str; 3] = ["output", "result", "message"];

pub struct HttpChunkSource {
    client: Client,
    base_url: String,
    request_timeout: Duration,
    idle_timeout: Duration,
}

impl HttpChunkSource {
    /// `request_timeout` bounds the single-shot call and the wait for the
    /// stream's response headers; `idle_timeout` bounds the silence between
    /// two stream events.
    pub fn new(
        base_url: &str,
        request_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, HttpError> {
        Ok(Self {
            client: build_client()?,
            base_url: normalize_base_url(base_url)?,
            request_timeout,
            idle_timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl ChunkSource for HttpChunkSource {
    async fn open_stream(
        &self,
        query: &Query,
        session: &SessionId,
    ) -> Result<StreamHandle, TransportError> {
        let request = self
            .client
            .get(self.endpoint("/invoke/stream"))
            .query(&[("q", query.content()), ("session_id", session.as_str())])
            .header(ACCEPT, "text/event-stream")
            .send();

        let response = match timeout(self.request_timeout, request).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => return Err(TransportError::ConnectionError(e.to_string())),
            Err(_) => return Err(TransportError::Timeout),
        };

        let status = response.status();
        if !status.is_success() {
            debug!(status = status.as_u16(), "Stream endpoint refused");
            return Err(TransportError::UnexpectedStatus(status.as_u16()));
        }
        debug!(session = session.short(), "Stream opened");

        let (tx, rx) = mpsc::channel(64);
        let events = response.bytes_stream().eventsource();
        tokio::spawn(forward_events(events, tx, self.idle_timeout));

        Ok(StreamHandle::new(rx))
    }

    async fn invoke(&self, query: &Query, session: &SessionId) -> SingleShotReply {
        let body = json!({ "query": query.content(), "session_id": session.as_str() });
        let sent = self
            .client
            .post(self.endpoint("/invoke"))
            .timeout(self.request_timeout)
            .json(&body)
            .send()
            .await;

        let response = match sent {
            Ok(response) => response,
            Err(e) => return SingleShotReply::network(e.to_string()),
        };
        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => return SingleShotReply::network(e.to_string()),
        };

        if !status.is_success() {
            return SingleShotReply::server_status(status.as_u16(), &error_detail(&text));
        }
        SingleShotReply::ok(extract_payload(&text))
    }
}

/// Pump SSE events into the handle's channel until the answer ends.
///
/// Every exit path other than a `done` event sends `StreamEvent::Error`, so
/// the controller always learns how the stream ended. Returns early when the
/// receiver goes away, which drops (and closes) the HTTP body.
async fn forward_events<S, E>(events: S, tx: mpsc::Sender<StreamEvent>, idle_timeout: Duration)
where
    S: Stream<Item = Result<Event, E>>,
    E: Display,
{
    let mut events = std::pin::pin!(events);

    loop {
        let next = tokio::select! {
            _ = tx.closed() => {
                debug!("Stream receiver dropped; closing connection");
                return;
            }
            next = timeout(idle_timeout, events.next()) => next,
        };

        let event = match next {
            Ok(Some(Ok(event))) => event,
            Ok(Some(Err(e))) => {
                warn!("Stream decode error: {}", e);
                let _ = tx.send(StreamEvent::Error(e.to_string())).await;
                return;
            }
            Ok(None) => {
                let _ = tx
                    .send(StreamEvent::Error(
                        "stream closed before end of stream".to_string(),
                    ))
                    .await;
                return;
            }
            Err(_) => {
                let _ = tx
                    .send(StreamEvent::Error(
                        "idle timeout waiting for stream data".to_string(),
                    ))
                    .await;
                return;
            }
        };

        match event.event.as_str() {
            DONE_EVENT => {
                let _ = tx.send(StreamEvent::Done).await;
                return;
            }
            ERROR_EVENT => {
                let reason = if event.data.trim().is_empty() {
                    "server reported a stream error".to_string()
                } else {
                    event.data
                };
                let _ = tx.send(StreamEvent::Error(reason)).await;
                return;
            }
            _ => {}
        }

        if event.data.trim() == LEGACY_DONE_SENTINEL {
            debug!("Ignoring legacy end-of-stream sentinel");
            continue;
        }
        if event.data.is_empty() {
            continue;
        }
        if tx.send(StreamEvent::Delta(event.data)).await.is_err() {
            return;
        }
    }
}

/// Answer text of a successful single-shot response: the first string field
/// among `output`, `result`, `message`, otherwise the body itself.
fn extract_payload(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return body.to_string();
    };

    match &value {
        Value::String(text) => text.clone(),
        Value::Object(map) => PAYLOAD_FIELDS
            .iter()
            .find_map(|field| map.get(*field).and_then(Value::as_str))
            .map(str::to_string)
            .unwrap_or_else(|| body.to_string()),
        _ => body.to_string(),
    }
}

/// Human-readable detail of an error response (`{"detail": ...}` or the body).
fn error_detail(body: &str) -> String {
    let detail = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| match value.get("detail") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
            None => None,
        })
        .unwrap_or_else(|| body.to_string());
    preview(detail.trim(), 200)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use relay_domain::ResponseError;
    use std::convert::Infallible;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn query(text: &str) -> Query {
        Query::try_new(text).unwrap()
    }

    fn session() -> SessionId {
        SessionId::parse("s_0123456789abcdef").unwrap()
    }

    fn source(base_url: &str) -> HttpChunkSource {
        HttpChunkSource::new(base_url, Duration::from_secs(5), Duration::from_secs(5)).unwrap()
    }

    fn sse(body: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/event-stream")
    }

    async fn drain(mut handle: StreamHandle) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        while let Some(event) = handle.next().await {
            let terminal = event.is_terminal();
            events.push(event);
            if terminal {
                break;
            }
        }
        events
    }

    #[tokio::test]
    async fn stream_forwards_fragments_until_done() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/invoke/stream"))
            .and(query_param("q", "hello there"))
            .and(query_param("session_id", "s_0123456789abcdef"))
            .respond_with(sse(
                "data: He\n\ndata: llo\n\ndata: [DONE]\n\ndata:  world\n\nevent: done\ndata: end\n\n",
            ))
            .expect(1)
            .mount(&server)
            .await;

        let handle = source(&server.uri())
            .open_stream(&query("hello there"), &session())
            .await
            .unwrap();

        assert_eq!(
            drain(handle).await,
            vec![
                StreamEvent::Delta("He".into()),
                StreamEvent::Delta("llo".into()),
                StreamEvent::Delta(" world".into()),
                StreamEvent::Done,
            ]
        );
    }

    #[tokio::test]
    async fn multi_line_data_keeps_newlines() {
        let server = MockServer::start().await;
        Mock::given(path("/invoke/stream"))
            .respond_with(sse("data: line one\ndata: line two\n\nevent: done\ndata: end\n\n"))
            .mount(&server)
            .await;

        let handle = source(&server.uri())
            .open_stream(&query("q"), &session())
            .await
            .unwrap();

        assert_eq!(
            drain(handle).await,
            vec![StreamEvent::Delta("line one\nline two".into()), StreamEvent::Done]
        );
    }

    #[tokio::test]
    async fn stream_without_done_ends_in_error() {
        let server = MockServer::start().await;
        Mock::given(path("/invoke/stream"))
            .respond_with(sse("data: partial\n\n"))
            .mount(&server)
            .await;

        let handle = source(&server.uri())
            .open_stream(&query("q"), &session())
            .await
            .unwrap();
        let events = drain(handle).await;

        assert_eq!(events[0], StreamEvent::Delta("partial".into()));
        assert!(matches!(events.last(), Some(StreamEvent::Error(_))));
    }

    #[tokio::test]
    async fn named_error_event_is_forwarded() {
        let server = MockServer::start().await;
        Mock::given(path("/invoke/stream"))
            .respond_with(sse("event: error\ndata: upstream failed\n\n"))
            .mount(&server)
            .await;

        let handle = source(&server.uri())
            .open_stream(&query("q"), &session())
            .await
            .unwrap();

        assert_eq!(
            drain(handle).await,
            vec![StreamEvent::Error("upstream failed".into())]
        );
    }

    #[tokio::test]
    async fn stream_error_status_is_open_failure() {
        let server = MockServer::start().await;
        Mock::given(path("/invoke/stream"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let result = source(&server.uri())
            .open_stream(&query("q"), &session())
            .await;

        assert!(matches!(result, Err(TransportError::UnexpectedStatus(503))));
    }

    #[tokio::test]
    async fn unreachable_server_is_connection_error() {
        let source = source("http://127.0.0.1:1");

        let result = source.open_stream(&query("q"), &session()).await;
        assert!(matches!(result, Err(TransportError::ConnectionError(_))));

        let reply = source.invoke(&query("q"), &session()).await;
        assert!(reply.text.starts_with("Network error: "));
        assert!(matches!(reply.failure, Some(ResponseError::Network(_))));
    }

    #[tokio::test]
    async fn invoke_posts_query_and_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/invoke"))
            .and(body_json(json!({"query": "x", "session_id": "s_0123456789abcdef"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "output": "ok",
                "selected_tool": null,
                "intermediate": [],
                "trace": [],
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = source(&server.uri()).invoke(&query("x"), &session()).await;

        assert_eq!(reply, SingleShotReply::ok("ok"));
    }

    #[tokio::test]
    async fn invoke_server_error_becomes_answer_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/invoke"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({"detail": "empty query"})))
            .mount(&server)
            .await;

        let reply = source(&server.uri()).invoke(&query("x"), &session()).await;

        assert_eq!(reply.text, "Server error (400): empty query");
        assert_eq!(reply.failure, Some(ResponseError::ServerStatus { status: 400 }));
    }

    #[test]
    fn payload_field_precedence() {
        assert_eq!(extract_payload(r#"{"output":"a","result":"b"}"#), "a");
        assert_eq!(extract_payload(r#"{"result":"b","message":"c"}"#), "b");
        assert_eq!(extract_payload(r#"{"message":"c"}"#), "c");
        assert_eq!(extract_payload(r#"{"output":null,"message":"c"}"#), "c");
        assert_eq!(extract_payload(r#""just text""#), "just text");
        assert_eq!(extract_payload(r#"{"other":1}"#), r#"{"other":1}"#);
        assert_eq!(extract_payload("not json"), "not json");
    }

    #[test]
    fn error_detail_prefers_detail_field() {
        assert_eq!(error_detail(r#"{"detail":"bad"}"#), "bad");
        assert_eq!(error_detail("plain failure\n"), "plain failure");
        assert_eq!(error_detail(""), "");
    }

    #[tokio::test(start_paused = true)]
    async fn idle_stream_times_out() {
        let bytes = futures::stream::iter(vec![Ok::<_, Infallible>("data: hi\n\n".as_bytes())])
            .chain(futures::stream::pending());
        let (tx, mut rx) = mpsc::channel(4);

        tokio::spawn(forward_events(
            bytes.eventsource(),
            tx,
            Duration::from_secs(30),
        ));

        assert_eq!(rx.recv().await, Some(StreamEvent::Delta("hi".into())));
        assert!(matches!(rx.recv().await, Some(StreamEvent::Error(e)) if e.contains("idle")));
    }
}
