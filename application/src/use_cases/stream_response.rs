//! Stream Response use case.
//!
//! Drives one answer from submission to final render:
//!
//! 1. Open the fragment stream (unless streaming is disabled)
//! 2. Feed fragments into the [`PacingBuffer`] as they arrive
//! 3. On every tick, re-render the revealed prefix from scratch
//! 4. Once the buffer reports completion, run the final normalize+render pass
//!
//! A transport failure before the first fragment switches to the single-shot
//! call exactly once; a failure after partial data keeps the partial answer.
//! Cancellation (a newer query, a reset or Ctrl-C) drops the
//! transport and the ticker together and nothing more reaches the surface.

use crate::config::DeliveryParams;
use crate::ports::chunk_source::ChunkSource;
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::renderer::Renderer;
use crate::ports::surface::ResponseSurface;
use relay_domain::{
    DomainError, PacingBuffer, Query, ResponseError, ResponseStream, SessionId, StreamEvent, Tick,
    TransportKind, normalize, preview,
};
use std::sync::Arc;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// A fully rendered answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedResponse {
    /// Transport that produced the displayed text.
    pub transport: TransportKind,
    /// Final normalized text (what the last render pass saw).
    pub text: String,
    /// Number of fragments received.
    pub chunks: usize,
    /// The streaming attempt failed and the single-shot call answered.
    pub fallback_used: bool,
    /// Recovered failure, if any.
    pub error: Option<ResponseError>,
}

/// How a response run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseOutcome {
    Completed(CompletedResponse),
    /// Cancelled before completion; its partial output was abandoned.
    Superseded,
}

impl ResponseOutcome {
    pub fn completed(&self) -> Option<&CompletedResponse> {
        match self {
            ResponseOutcome::Completed(response) => Some(response),
            ResponseOutcome::Superseded => None,
        }
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, ResponseOutcome::Superseded)
    }
}

/// Orchestrates chunk source, pacing, normalization and rendering for one
/// answer at a time.
pub struct ResponseController {
    source: Arc<dyn ChunkSource>,
    renderer: Arc<dyn Renderer>,
    surface: Arc<dyn ResponseSurface>,
    conversation_logger: Arc<dyn ConversationLogger>,
    params: DeliveryParams,
}

impl ResponseController {
    pub fn new(
        source: Arc<dyn ChunkSource>,
        renderer: Arc<dyn Renderer>,
        surface: Arc<dyn ResponseSurface>,
        params: DeliveryParams,
    ) -> Self {
        Self {
            source,
            renderer,
            surface,
            conversation_logger: Arc::new(NoConversationLogger),
            params,
        }
    }

    /// Create with a conversation logger.
    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    pub fn surface(&self) -> &Arc<dyn ResponseSurface> {
        &self.surface
    }

    pub fn params(&self) -> &DeliveryParams {
        &self.params
    }

    /// Run one query to completion or until `cancel` fires.
    ///
    /// Returns `Err` only if the response state machine is driven out of
    /// order, which indicates a bug rather than a runtime failure.
    pub async fn run(
        &self,
        query: &Query,
        session: &SessionId,
        cancel: &CancellationToken,
    ) -> Result<ResponseOutcome, DomainError> {
        info!(
            session = session.short(),
            "Submitting query: {}",
            preview(query.content(), 80)
        );
        self.conversation_logger
            .log(ConversationEvent::query_submitted(session, query));

        let outcome = if self.params.streaming && self.source.supports_streaming() {
            self.run_streaming(query, session, cancel).await?
        } else {
            debug!("Streaming disabled; using single-shot transport");
            let stream = ResponseStream::new(TransportKind::SingleShot);
            self.run_single_shot(stream, query, session, cancel, false)
                .await?
        };

        if let ResponseOutcome::Completed(response) = &outcome {
            info!(
                transport = ?response.transport,
                chunks = response.chunks,
                fallback = response.fallback_used,
                "Response complete ({} chars)",
                response.text.chars().count()
            );
            self.conversation_logger
                .log(ConversationEvent::response_completed(
                    session,
                    response.transport,
                    &response.text,
                    response.error.as_ref(),
                ));
        }
        Ok(outcome)
    }

    async fn run_streaming(
        &self,
        query: &Query,
        session: &SessionId,
        cancel: &CancellationToken,
    ) -> Result<ResponseOutcome, DomainError> {
        let mut stream = ResponseStream::new(TransportKind::Stream);
        stream.begin()?;
        self.surface.begin();
        self.surface.show_working();

        let opened = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(self.superseded(&stream)),
            opened = self.source.open_stream(query, session) => opened,
        };
        let mut handle = match opened {
            Ok(handle) => handle,
            Err(e) => {
                let cause = ResponseError::TransportOpen(e.to_string());
                return self.fall_back(stream, cause, query, session, cancel).await;
            }
        };

        let mut buffer = PacingBuffer::new(self.params.pacing);
        let mut ticker = interval(self.params.pacing.tick_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut receiving = true;

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Ok(self.superseded(&stream)),
                event = handle.next(), if receiving => match event {
                    Some(StreamEvent::Delta(chunk)) => {
                        if !chunk.is_empty() {
                            if stream.push_chunk(&chunk)? {
                                debug!("First chunk received");
                                self.surface.clear_working();
                            }
                            buffer.enqueue(&chunk);
                        }
                    }
                    Some(StreamEvent::Done) => {
                        debug!(chunks = stream.chunk_count(), "End of stream");
                        if !stream.any_data_received() {
                            self.surface.clear_working();
                        }
                        stream.end_of_stream()?;
                        buffer.mark_finished();
                        receiving = false;
                    }
                    broken => {
                        let reason = match broken {
                            Some(StreamEvent::Error(reason)) => reason,
                            _ => "stream closed before end of stream".to_string(),
                        };
                        if !stream.any_data_received() {
                            let cause = ResponseError::TransportOpen(reason);
                            return self.fall_back(stream, cause, query, session, cancel).await;
                        }
                        warn!(
                            chunks = stream.chunk_count(),
                            "Stream interrupted, keeping partial answer: {}", reason
                        );
                        stream.note_error(ResponseError::TransportMidStream(reason));
                        self.surface.status("Connection interrupted; the answer may be incomplete.");
                        stream.end_of_stream()?;
                        buffer.mark_finished();
                        receiving = false;
                    }
                },
                _ = ticker.tick() => match buffer.tick() {
                    Tick::Emit(text) => {
                        stream.reveal(&text);
                        self.render_pass(&mut stream, false);
                    }
                    Tick::Idle => {}
                    Tick::Finished | Tick::Stopped => break,
                },
            }
        }

        self.finish(stream, false)
    }

    async fn fall_back(
        &self,
        mut stream: ResponseStream,
        cause: ResponseError,
        query: &Query,
        session: &SessionId,
        cancel: &CancellationToken,
    ) -> Result<ResponseOutcome, DomainError> {
        warn!("Falling back to single-shot request: {}", cause);
        stream.fail(cause.clone())?;
        self.conversation_logger
            .log(ConversationEvent::fallback_used(session, &cause));
        let single_shot = stream.into_single_shot()?;
        self.run_single_shot(single_shot, query, session, cancel, true)
            .await
    }

    async fn run_single_shot(
        &self,
        mut stream: ResponseStream,
        query: &Query,
        session: &SessionId,
        cancel: &CancellationToken,
        fallback: bool,
    ) -> Result<ResponseOutcome, DomainError> {
        stream.begin()?;
        if !fallback {
            self.surface.begin();
            self.surface.show_working();
        }

        let reply = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(self.superseded(&stream)),
            reply = self.source.invoke(query, session) => reply,
        };

        self.surface.clear_working();
        if let Some(failure) = reply.failure {
            warn!("Single-shot request failed: {}", failure);
            stream.note_error(failure);
        }
        if !reply.text.is_empty() {
            stream.push_chunk(&reply.text)?;
        }
        stream.end_of_stream()?;
        self.finish(stream, fallback)
    }

    /// Final normalize+render pass, then `complete`.
    fn finish(
        &self,
        mut stream: ResponseStream,
        fallback_used: bool,
    ) -> Result<ResponseOutcome, DomainError> {
        let text = self.render_pass(&mut stream, true);
        stream.complete()?;
        self.surface.finish();

        Ok(ResponseOutcome::Completed(CompletedResponse {
            transport: stream.transport(),
            text,
            chunks: stream.chunk_count(),
            fallback_used,
            error: stream.error().cloned(),
        }))
    }

    /// Render the revealed prefix (or, on the final pass, the whole raw
    /// text) and push it to the surface. Returns the normalized text.
    fn render_pass(&self, stream: &mut ResponseStream, is_final: bool) -> String {
        let source = if is_final {
            stream.raw_text()
        } else {
            stream.revealed()
        };
        let normalized = normalize(source, is_final);

        match self.renderer.render(&normalized) {
            Ok(markup) => self.surface.update(&markup),
            Err(e) => {
                if is_final {
                    warn!("Render failed, showing plain text: {}", e);
                } else {
                    debug!("Render failed, showing plain text: {}", e);
                }
                let plain = self.renderer.render_plain(source);
                stream.note_error(ResponseError::Render(e.to_string()));
                self.surface.update(&plain);
            }
        }
        normalized
    }

    fn superseded(&self, stream: &ResponseStream) -> ResponseOutcome {
        debug!(
            phase = %stream.phase(),
            chunks = stream.chunk_count(),
            "Response superseded; discarding"
        );
        self.surface.clear_working();
        self.surface.abandon();
        ResponseOutcome::Superseded
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Scripted doubles shared by the use case tests.

    use crate::ports::chunk_source::{ChunkSource, SingleShotReply, StreamHandle, TransportError};
    use crate::ports::renderer::{RenderError, Renderer};
    use crate::ports::surface::ResponseSurface;
    use async_trait::async_trait;
    use relay_domain::{Query, SessionId, StreamEvent};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::mpsc;

    /// One step of a scripted stream.
    #[derive(Clone)]
    pub enum Step {
        Send(StreamEvent),
        Pause(Duration),
        /// Keep the stream open forever.
        Hang,
    }

    pub fn delta(text: &str) -> Step {
        Step::Send(StreamEvent::Delta(text.to_string()))
    }

    pub fn done() -> Step {
        Step::Send(StreamEvent::Done)
    }

    pub fn error(reason: &str) -> Step {
        Step::Send(StreamEvent::Error(reason.to_string()))
    }

    /// Chunk source replaying one script per `open_stream` call.
    pub struct ScriptedSource {
        scripts: Mutex<VecDeque<Result<Vec<Step>, String>>>,
        reply: SingleShotReply,
        pub opens: AtomicUsize,
        pub invocations: Mutex<Vec<(String, String)>>,
    }

    impl ScriptedSource {
        pub fn new(scripts: Vec<Result<Vec<Step>, String>>, reply: SingleShotReply) -> Self {
            Self {
                scripts: Mutex::new(scripts.into()),
                reply,
                opens: AtomicUsize::new(0),
                invocations: Mutex::new(Vec::new()),
            }
        }

        pub fn streaming(steps: Vec<Step>) -> Self {
            Self::new(vec![Ok(steps)], SingleShotReply::ok("unused"))
        }

        pub fn invocation_count(&self) -> usize {
            self.invocations.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ChunkSource for ScriptedSource {
        async fn open_stream(
            &self,
            _query: &Query,
            _session: &SessionId,
        ) -> Result<StreamHandle, TransportError> {
            self.opens.fetch_add(1, Ordering::SeqCst);
            let script = self
                .scripts
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err("no script".to_string()));
            let steps = script.map_err(TransportError::ConnectionError)?;

            let (tx, rx) = mpsc::channel(16);
            tokio::spawn(async move {
                for step in steps {
                    match step {
                        Step::Send(event) => {
                            if tx.send(event).await.is_err() {
                                return;
                            }
                        }
                        Step::Pause(d) => tokio::time::sleep(d).await,
                        Step::Hang => std::future::pending::<()>().await,
                    }
                }
            });
            Ok(StreamHandle::new(rx))
        }

        async fn invoke(&self, query: &Query, session: &SessionId) -> SingleShotReply {
            self.invocations
                .lock()
                .unwrap()
                .push((query.content().to_string(), session.as_str().to_string()));
            self.reply.clone()
        }
    }

    /// Wraps text in a marker so tests can tell markup from plain fallback.
    #[derive(Default)]
    pub struct TaggingRenderer {
        pub fail: AtomicBool,
    }

    impl Renderer for TaggingRenderer {
        fn render(&self, normalized: &str) -> Result<String, RenderError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(RenderError::Parse("boom".to_string()));
            }
            Ok(format!("<md>{normalized}</md>"))
        }

        fn render_plain(&self, raw: &str) -> String {
            format!("<plain>{raw}</plain>")
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Call {
        Begin,
        ShowWorking,
        ClearWorking,
        Update(String),
        Status(String),
        Finish,
        Abandon,
    }

    #[derive(Default)]
    pub struct RecordingSurface {
        pub calls: Mutex<Vec<Call>>,
    }

    impl RecordingSurface {
        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        pub fn updates(&self) -> Vec<String> {
            self.calls()
                .into_iter()
                .filter_map(|c| match c {
                    Call::Update(s) => Some(s),
                    _ => None,
                })
                .collect()
        }

        pub fn last_update(&self) -> Option<String> {
            self.updates().pop()
        }

        fn push(&self, call: Call) {
            self.calls.lock().unwrap().push(call);
        }
    }

    impl ResponseSurface for RecordingSurface {
        fn begin(&self) {
            self.push(Call::Begin);
        }
        fn show_working(&self) {
            self.push(Call::ShowWorking);
        }
        fn clear_working(&self) {
            self.push(Call::ClearWorking);
        }
        fn update(&self, markup: &str) {
            self.push(Call::Update(markup.to_string()));
        }
        fn status(&self, notice: &str) {
            self.push(Call::Status(notice.to_string()));
        }
        fn finish(&self) {
            self.push(Call::Finish);
        }
        fn abandon(&self) {
            self.push(Call::Abandon);
        }
    }
}
