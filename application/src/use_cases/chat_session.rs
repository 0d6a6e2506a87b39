//! Chat session use case.
//!
//! Owns the conversation's session id and at most one in-flight response.
//! Submitting a new query supersedes the previous response: its cancellation
//! token fires and the task is awaited before the new one starts, so the
//! surface never receives output from two responses at once.

use super::stream_response::{ResponseController, ResponseOutcome};
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::history::{HistoryError, HistoryPort};
use crate::ports::session_store::SessionStore;
use relay_domain::{DomainError, Message, Query, SessionId};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum ChatError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    History(#[from] HistoryError),

    #[error("Response task failed: {0}")]
    TaskFailed(String),
}

/// What `reset` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetOutcome {
    pub previous: SessionId,
    pub current: SessionId,
    /// Server-side history of `previous` was deleted.
    pub history_cleared: bool,
}

struct ActiveResponse {
    cancel: CancellationToken,
    task: JoinHandle<Result<ResponseOutcome, DomainError>>,
}

pub struct ChatSessionUseCase {
    controller: Arc<ResponseController>,
    history: Arc<dyn HistoryPort>,
    store: Arc<dyn SessionStore>,
    conversation_logger: Arc<dyn ConversationLogger>,
    session: SessionId,
    active: Option<ActiveResponse>,
}

impl ChatSessionUseCase {
    /// Resume the stored session, or start (and persist) a new one.
    pub fn open(
        controller: Arc<ResponseController>,
        history: Arc<dyn HistoryPort>,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        let session = match store.load() {
            Ok(Some(id)) => {
                debug!(session = id.short(), "Resuming stored session");
                id
            }
            Ok(None) => Self::new_session(store.as_ref()),
            Err(e) => {
                warn!("Could not load stored session, starting a new one: {}", e);
                Self::new_session(store.as_ref())
            }
        };

        Self {
            controller,
            history,
            store,
            conversation_logger: Arc::new(NoConversationLogger),
            session,
            active: None,
        }
    }

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    fn new_session(store: &dyn SessionStore) -> SessionId {
        let id = SessionId::generate();
        if let Err(e) = store.save(&id) {
            warn!("Could not persist session id: {}", e);
        }
        info!(session = id.short(), "Started new session");
        id
    }

    pub fn session(&self) -> &SessionId {
        &self.session
    }

    pub fn is_responding(&self) -> bool {
        self.active.as_ref().is_some_and(|a| !a.task.is_finished())
    }

    /// Token of the in-flight response, for callers that cancel from
    /// another branch of a `select!` (e.g. Ctrl-C while waiting).
    pub fn active_token(&self) -> Option<CancellationToken> {
        self.active.as_ref().map(|a| a.cancel.clone())
    }

    /// Start answering `text`, superseding any in-flight response.
    pub async fn submit(&mut self, text: &str) -> Result<(), ChatError> {
        let query = Query::try_new(text)?;
        self.cancel().await;

        let cancel = CancellationToken::new();
        let controller = Arc::clone(&self.controller);
        let session = self.session.clone();
        let token = cancel.clone();
        let task =
            tokio::spawn(async move { controller.run(&query, &session, &token).await });

        self.active = Some(ActiveResponse { cancel, task });
        Ok(())
    }

    /// Wait for the in-flight response. `None` if nothing was submitted.
    ///
    /// Dropping this future before it resolves leaves the response running.
    pub async fn wait(&mut self) -> Result<Option<ResponseOutcome>, ChatError> {
        let Some(active) = self.active.as_mut() else {
            return Ok(None);
        };
        let joined = (&mut active.task).await;
        self.active = None;

        let outcome = joined.map_err(|e| ChatError::TaskFailed(e.to_string()))??;
        Ok(Some(outcome))
    }

    /// Submit and wait.
    pub async fn ask(&mut self, text: &str) -> Result<ResponseOutcome, ChatError> {
        self.submit(text).await?;
        self.wait()
            .await?
            .ok_or_else(|| ChatError::TaskFailed("response task vanished".to_string()))
    }

    /// Stop the in-flight response, if any. Returns whether one was running.
    ///
    /// Returns only after the response task has exited, so nothing more
    /// reaches the surface.
    pub async fn cancel(&mut self) -> bool {
        let Some(active) = self.active.take() else {
            return false;
        };
        let was_running = !active.task.is_finished();
        active.cancel.cancel();
        match active.task.await {
            Ok(Ok(outcome)) => debug!(superseded = outcome.is_superseded(), "Previous response stopped"),
            Ok(Err(e)) => warn!("Previous response ended with error: {}", e),
            Err(e) => warn!("Previous response task failed: {}", e),
        }
        was_running
    }

    /// Start a fresh conversation.
    ///
    /// Clearing the old session's server history is best effort: a failure
    /// is reported on the surface and the reset still happens.
    pub async fn reset(&mut self) -> Result<ResetOutcome, ChatError> {
        self.cancel().await;
        let previous = self.session.clone();

        let history_cleared = if self.controller.params().clear_history_on_reset {
            match self.history.clear(&previous).await {
                Ok(()) => true,
                Err(e) => {
                    warn!(session = previous.short(), "Could not clear history: {}", e);
                    self.controller
                        .surface()
                        .status(&format!("Could not clear server history: {e}"));
                    false
                }
            }
        } else {
            false
        };

        self.session = Self::new_session(self.store.as_ref());
        self.conversation_logger
            .log(ConversationEvent::session_reset(
                &previous,
                &self.session,
                history_cleared,
            ));

        Ok(ResetOutcome {
            previous,
            current: self.session.clone(),
            history_cleared,
        })
    }

    /// Stored messages of the current session, oldest first.
    pub async fn history(&self, limit: Option<usize>) -> Result<Vec<Message>, ChatError> {
        let limit = limit.unwrap_or(self.controller.params().history_limit);
        let messages = self.history.fetch(&self.session, limit).await?;
        debug!(count = messages.len(), limit, "Fetched history");
        Ok(messages)
    }
}

impl Drop for ChatSessionUseCase {
    fn drop(&mut self) {
        if let Some(active) = &self.active {
            active.cancel.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeliveryParams;
    use crate::ports::chunk_source::SingleShotReply;
    use crate::ports::session_store::InMemorySessionStore;
    use crate::use_cases::stream_response::test_support::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    #[derive(Default)]
    struct FakeHistory {
        cleared: Mutex<Vec<String>>,
        fetched: Mutex<Vec<(String, usize)>>,
        fail_clear: AtomicBool,
    }

    #[async_trait]
    impl HistoryPort for FakeHistory {
        async fn fetch(
            &self,
            session: &SessionId,
            limit: usize,
        ) -> Result<Vec<Message>, HistoryError> {
            self.fetched
                .lock()
                .unwrap()
                .push((session.as_str().to_string(), limit));
            Ok(vec![Message::user("hi"), Message::assistant("hello")])
        }

        async fn clear(&self, session: &SessionId) -> Result<(), HistoryError> {
            if self.fail_clear.load(Ordering::SeqCst) {
                return Err(HistoryError::UnexpectedStatus(503));
            }
            self.cleared
                .lock()
                .unwrap()
                .push(session.as_str().to_string());
            Ok(())
        }
    }

    struct Fixture {
        source: Arc<ScriptedSource>,
        surface: Arc<RecordingSurface>,
        history: Arc<FakeHistory>,
        store: Arc<InMemorySessionStore>,
        chat: ChatSessionUseCase,
    }

    fn fixture_with_store(source: ScriptedSource, store: InMemorySessionStore) -> Fixture {
        let source = Arc::new(source);
        let surface = Arc::new(RecordingSurface::default());
        let history = Arc::new(FakeHistory::default());
        let store = Arc::new(store);
        let controller = Arc::new(ResponseController::new(
            source.clone(),
            Arc::new(TaggingRenderer::default()),
            surface.clone(),
            DeliveryParams::default(),
        ));
        let chat = ChatSessionUseCase::open(controller, history.clone(), store.clone());
        Fixture {
            source,
            surface,
            history,
            store,
            chat,
        }
    }

    fn fixture(source: ScriptedSource) -> Fixture {
        fixture_with_store(source, InMemorySessionStore::default())
    }

    #[tokio::test]
    async fn open_generates_and_persists_session() {
        let f = fixture(ScriptedSource::streaming(vec![]));
        assert!(f.chat.session().as_str().starts_with("s_"));
        assert_eq!(f.store.load().unwrap().as_ref(), Some(f.chat.session()));
    }

    #[tokio::test]
    async fn open_resumes_stored_session() {
        let stored = SessionId::parse("s_stored42").unwrap();
        let f = fixture_with_store(
            ScriptedSource::streaming(vec![]),
            InMemorySessionStore::with_session(stored.clone()),
        );
        assert_eq!(f.chat.session(), &stored);
    }

    #[tokio::test(start_paused = true)]
    async fn ask_returns_completed_answer() {
        let mut f = fixture(ScriptedSource::streaming(vec![
            delta("Hello"),
            delta(" there"),
            done(),
        ]));

        let outcome = f.chat.ask("hi").await.unwrap();

        assert_eq!(outcome.completed().unwrap().text, "Hello there");
        assert!(!f.chat.is_responding());
        assert!(f.chat.wait().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn blank_query_is_rejected_without_transport() {
        let mut f = fixture(ScriptedSource::streaming(vec![]));

        let err = f.chat.submit("   ").await.unwrap_err();

        assert!(matches!(err, ChatError::Domain(DomainError::EmptyQuery)));
        assert_eq!(f.source.opens.load(Ordering::SeqCst), 0);
        assert!(f.surface.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn new_query_supersedes_in_flight_response() {
        let source = ScriptedSource::new(
            vec![
                Ok(vec![delta("old answer that never ends"), Step::Hang]),
                Ok(vec![delta("new"), done()]),
            ],
            SingleShotReply::ok("unused"),
        );
        let mut f = fixture(source);

        f.chat.submit("first").await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(f.chat.is_responding());
        f.chat.submit("second").await.unwrap();
        let outcome = f.chat.wait().await.unwrap().unwrap();

        assert_eq!(outcome.completed().unwrap().text, "new");
        let calls = f.surface.calls();
        let second_begin = calls.iter().rposition(|c| *c == Call::Begin).unwrap();
        assert!(calls[..second_begin]
            .iter()
            .any(|c| matches!(c, Call::Update(s) if s.contains("old"))));
        assert!(calls[second_begin..].iter().all(|c| match c {
            Call::Update(s) => !s.contains("old"),
            _ => true,
        }));
        assert_eq!(calls.iter().filter(|c| **c == Call::Finish).count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_response() {
        let mut f = fixture(ScriptedSource::streaming(vec![delta("partial"), Step::Hang]));

        f.chat.submit("q").await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;

        assert!(f.chat.cancel().await);
        assert!(!f.chat.cancel().await);
        assert!(!f.surface.calls().contains(&Call::Finish));
    }

    #[tokio::test]
    async fn reset_clears_history_and_rotates_session() {
        let mut f = fixture(ScriptedSource::streaming(vec![]));
        let before = f.chat.session().clone();

        let outcome = f.chat.reset().await.unwrap();

        assert_eq!(outcome.previous, before);
        assert_ne!(outcome.current, before);
        assert!(outcome.history_cleared);
        assert_eq!(
            *f.history.cleared.lock().unwrap(),
            vec![before.as_str().to_string()]
        );
        assert_eq!(f.store.load().unwrap(), Some(outcome.current.clone()));
        assert_eq!(f.chat.session(), &outcome.current);
    }

    #[tokio::test]
    async fn reset_survives_history_failure() {
        let mut f = fixture(ScriptedSource::streaming(vec![]));
        f.history.fail_clear.store(true, Ordering::SeqCst);
        let before = f.chat.session().clone();

        let outcome = f.chat.reset().await.unwrap();

        assert!(!outcome.history_cleared);
        assert_ne!(f.chat.session(), &before);
        assert!(f
            .surface
            .calls()
            .iter()
            .any(|c| matches!(c, Call::Status(s) if s.contains("503"))));
    }

    #[tokio::test(start_paused = true)]
    async fn reset_abandons_answer_before_notice() {
        let mut f = fixture(ScriptedSource::streaming(vec![delta("partial"), Step::Hang]));
        f.history.fail_clear.store(true, Ordering::SeqCst);

        f.chat.submit("q").await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        f.chat.reset().await.unwrap();

        let calls = f.surface.calls();
        let abandon = calls.iter().position(|c| *c == Call::Abandon).unwrap();
        let notice = calls
            .iter()
            .position(|c| matches!(c, Call::Status(s) if s.contains("503")))
            .unwrap();
        assert!(abandon < notice);
        assert!(!calls.contains(&Call::Finish));
    }

    #[tokio::test]
    async fn history_uses_configured_default_limit() {
        let f = fixture(ScriptedSource::streaming(vec![]));

        let messages = f.chat.history(None).await.unwrap();
        f.chat.history(Some(5)).await.unwrap();

        assert_eq!(messages.len(), 2);
        let session = f.chat.session().as_str().to_string();
        assert_eq!(
            *f.history.fetched.lock().unwrap(),
            vec![(session.clone(), 50), (session, 5)]
        );
    }
}
