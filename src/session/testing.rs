//! Mock implementations for testing
//!
//! These mocks enable session tests without real I/O.

use super::{start, SessionHandle, SessionView};
use crate::client::{
    AnswerService, AskRequest, AskResponse, FeedbackRequest, FeedbackService, ServiceError,
};
use crate::state_machine::SessionContext;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{Notify, Semaphore};

// ============================================================================
// Mock Answer Service
// ============================================================================

/// Mock answering service that returns queued responses
pub struct MockAnswerService {
    responses: Mutex<VecDeque<Result<AskResponse, ServiceError>>>,
    /// Record of all requests made
    pub requests: Mutex<Vec<AskRequest>>,
}

impl MockAnswerService {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful answer
    pub fn queue_answer(&self, answer: &str, id: Option<&str>) {
        self.responses.lock().unwrap().push_back(Ok(AskResponse {
            answer: answer.to_string(),
            id: id.map(str::to_string),
        }));
    }

    /// Queue an error response
    pub fn queue_error(&self, error: ServiceError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<AskRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next_response(&self) -> Result<AskResponse, ServiceError> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ServiceError::network("No mock response queued")))
    }
}

impl Default for MockAnswerService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AnswerService for MockAnswerService {
    async fn ask(&self, request: &AskRequest) -> Result<AskResponse, ServiceError> {
        self.requests.lock().unwrap().push(request.clone());
        self.next_response()
    }
}

// ============================================================================
// Gated Mock Answer Service (holds requests in flight)
// ============================================================================

/// Answering service whose requests stay pending until released
pub struct GatedAnswerService {
    inner: MockAnswerService,
    gate: Semaphore,
    /// Notified when a request arrives
    pub request_started: Arc<Notify>,
}

impl GatedAnswerService {
    pub fn new() -> Self {
        Self {
            inner: MockAnswerService::new(),
            gate: Semaphore::new(0),
            request_started: Arc::new(Notify::new()),
        }
    }

    pub fn queue_answer(&self, answer: &str, id: Option<&str>) {
        self.inner.queue_answer(answer, id);
    }

    /// Let one held request complete
    pub fn release_one(&self) {
        self.gate.add_permits(1);
    }

    pub fn recorded_requests(&self) -> Vec<AskRequest> {
        self.inner.recorded_requests()
    }
}

#[async_trait]
impl AnswerService for GatedAnswerService {
    async fn ask(&self, request: &AskRequest) -> Result<AskResponse, ServiceError> {
        self.inner.requests.lock().unwrap().push(request.clone());
        self.request_started.notify_one();
        self.gate
            .acquire()
            .await
            .map_err(|e| ServiceError::unknown(e.to_string()))?
            .forget();
        self.inner.next_response()
    }
}

// ============================================================================
// Mock Feedback Service
// ============================================================================

/// Mock feedback service; succeeds unless a failure is queued
pub struct MockFeedbackService {
    outcomes: Mutex<VecDeque<Result<(), ServiceError>>>,
    pub requests: Mutex<Vec<FeedbackRequest>>,
}

impl MockFeedbackService {
    pub fn new() -> Self {
        Self {
            outcomes: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn queue_error(&self, error: ServiceError) {
        self.outcomes.lock().unwrap().push_back(Err(error));
    }

    pub fn recorded_requests(&self) -> Vec<FeedbackRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockFeedbackService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FeedbackService for MockFeedbackService {
    async fn record(&self, request: &FeedbackRequest) -> Result<(), ServiceError> {
        self.requests.lock().unwrap().push(request.clone());
        self.outcomes.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }
}

// ============================================================================
// Test Session Builder
// ============================================================================

/// A running session plus the mocks behind it
pub struct TestSession<A, F> {
    pub handle: SessionHandle,
    pub answers: Arc<A>,
    pub feedback: Arc<F>,
}

impl TestSession<MockAnswerService, MockFeedbackService> {
    /// Create a test session with instant mocks
    pub fn builder() -> TestSessionBuilder<MockAnswerService, MockFeedbackService> {
        TestSessionBuilder {
            send_history: true,
            answers: MockAnswerService::new(),
            feedback: MockFeedbackService::new(),
        }
    }
}

pub struct TestSessionBuilder<A, F> {
    send_history: bool,
    answers: A,
    feedback: F,
}

impl<A, F> TestSessionBuilder<A, F>
where
    A: AnswerService + 'static,
    F: FeedbackService + 'static,
{
    pub fn answers<A2: AnswerService + 'static>(self, answers: A2) -> TestSessionBuilder<A2, F> {
        TestSessionBuilder {
            send_history: self.send_history,
            answers,
            feedback: self.feedback,
        }
    }

    pub fn feedback<F2: FeedbackService + 'static>(
        self,
        feedback: F2,
    ) -> TestSessionBuilder<A, F2> {
        TestSessionBuilder {
            send_history: self.send_history,
            answers: self.answers,
            feedback,
        }
    }

    #[must_use]
    pub fn send_history(mut self, send_history: bool) -> Self {
        self.send_history = send_history;
        self
    }

    pub fn build(self) -> TestSession<A, F> {
        let answers = Arc::new(self.answers);
        let feedback = Arc::new(self.feedback);
        let handle = start(
            SessionContext::new("test-session", self.send_history),
            answers.clone(),
            feedback.clone(),
        );
        TestSession {
            handle,
            answers,
            feedback,
        }
    }
}

impl<A, F> TestSession<A, F> {
    /// Wait until the view satisfies `pred`, returning it
    pub async fn wait_for(
        &self,
        timeout: Duration,
        pred: impl FnMut(&SessionView) -> bool,
    ) -> Option<SessionView> {
        let mut rx = self.handle.watch();
        tokio::time::timeout(timeout, async move {
            rx.wait_for(pred).await.map(|view| view.clone()).ok()
        })
        .await
        .ok()
        .flatten()
    }

    /// Wait until no chat request is in flight and the log has `len` messages
    pub async fn wait_settled(&self, len: usize) -> SessionView {
        self.wait_for(Duration::from_secs(2), |v| !v.busy && v.messages.len() == len)
            .await
            .unwrap_or_else(|| {
                panic!(
                    "session did not settle at {len} messages: {:?}",
                    self.handle.view()
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{FeedbackAction, ServiceErrorKind};
    use crate::conversation::{Feedback, Message, Role};
    use crate::session::SessionEvent;
    use crate::state_machine::CHAT_FAILURE_MESSAGE;

    const WAIT: Duration = Duration::from_secs(2);

    #[tokio::test]
    async fn test_mock_answer_service() {
        let mock = MockAnswerService::new();
        mock.queue_answer("Hello", Some("m1"));

        let request = AskRequest {
            query: "hi".to_string(),
            history: None,
        };
        let response = mock.ask(&request).await.unwrap();
        assert_eq!(response.answer, "Hello");

        // Second call should fail (no more responses)
        let err = mock.ask(&request).await.unwrap_err();
        assert_eq!(err.kind, ServiceErrorKind::Network);
        assert_eq!(mock.recorded_requests().len(), 2);
    }

    #[tokio::test]
    async fn test_hello_scenario_with_like() {
        let rt = TestSession::builder().build();
        rt.answers.queue_answer("Hi there", Some("m1"));

        rt.handle.submit("hello").await.unwrap();
        let view = rt.wait_settled(2).await;

        assert_eq!(
            view.messages,
            vec![
                Message::user("hello"),
                Message::assistant("Hi there", Some("m1".to_string())),
            ]
        );
        assert_eq!(view.error, None);

        rt.handle.submit_feedback("m1", Feedback::Liked).await.unwrap();
        let view = rt
            .wait_for(WAIT, |v| v.messages[1].feedback().is_some())
            .await
            .unwrap();
        assert_eq!(view.messages[1].id(), Some("m1"));
        assert_eq!(view.messages[1].feedback(), Some(Feedback::Liked));
        assert_eq!(view.messages[0].feedback(), None);

        let sent = rt.feedback.recorded_requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].id, "m1");
        assert_eq!(sent[0].action, FeedbackAction::Like);
    }

    #[tokio::test]
    async fn test_failure_then_recovery() {
        let rt = TestSession::builder().build();
        rt.answers.queue_error(ServiceError::network("connection refused"));
        rt.answers.queue_answer("All good", None);

        rt.handle.submit("bad").await.unwrap();
        let view = rt
            .wait_for(WAIT, |v| v.error.is_some())
            .await
            .expect("error surfaced");
        assert_eq!(view.messages, vec![Message::user("bad")]);
        assert_eq!(view.error.as_deref(), Some(CHAT_FAILURE_MESSAGE));
        assert!(!view.busy);

        rt.handle.submit("ok").await.unwrap();
        let view = rt.wait_settled(3).await;
        assert_eq!(view.error, None);
        assert_eq!(view.messages[2].content(), "All good");
        assert!(!view.messages[2].accepts_feedback());
    }

    #[tokio::test]
    async fn test_alternating_log_after_many_submits() {
        let rt = TestSession::builder().build();
        for i in 0..5 {
            rt.answers.queue_answer(&format!("answer {i}"), Some(&format!("m{i}")));
        }

        for i in 0..5 {
            rt.handle.submit(format!("question {i}")).await.unwrap();
            rt.wait_settled((i + 1) * 2).await;
        }

        let view = rt.handle.view();
        assert_eq!(view.messages.len(), 10);
        for (i, msg) in view.messages.iter().enumerate() {
            let expected = if i % 2 == 0 { Role::User } else { Role::Assistant };
            assert_eq!(msg.role(), expected);
        }
    }

    #[tokio::test]
    async fn test_blank_submit_does_nothing() {
        let rt = TestSession::builder().build();
        rt.answers.queue_answer("pong", None);

        rt.handle.submit("   ").await.unwrap();
        rt.handle.submit("").await.unwrap();
        // A real query afterwards proves the blanks were consumed in order
        rt.handle.submit("ping").await.unwrap();
        let view = rt.wait_settled(2).await;

        assert_eq!(view.messages[0].content(), "ping");
        assert_eq!(rt.answers.recorded_requests().len(), 1);
    }

    #[tokio::test]
    async fn test_submit_while_pending_is_ignored() {
        let rt = TestSession::builder()
            .answers(GatedAnswerService::new())
            .build();
        rt.answers.queue_answer("first answer", Some("m1"));

        let started = rt.answers.request_started.clone();
        let notified = started.notified();
        rt.handle.submit("first").await.unwrap();
        tokio::time::timeout(WAIT, notified).await.unwrap();

        rt.handle.submit("second").await.unwrap();
        // Feedback round-trips through the same queue, so once it lands the
        // second submit has been handled too
        rt.handle.submit_feedback("none", Feedback::Liked).await.unwrap();
        tokio::time::timeout(WAIT, async {
            while rt.feedback.recorded_requests().is_empty() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();

        let view = rt.handle.view();
        assert!(view.busy);
        assert_eq!(view.messages, vec![Message::user("first")]);
        assert_eq!(rt.answers.recorded_requests().len(), 1);

        rt.answers.release_one();
        let view = rt.wait_settled(2).await;
        assert_eq!(view.messages[1].content(), "first answer");
        assert_eq!(rt.answers.recorded_requests().len(), 1);
    }

    #[tokio::test]
    async fn test_history_snapshot_ignores_later_feedback() {
        let rt = TestSession::builder()
            .answers(GatedAnswerService::new())
            .build();
        rt.answers.queue_answer("Hi there", Some("m1"));
        rt.answers.queue_answer("Sure", Some("m2"));

        rt.handle.submit("hello").await.unwrap();
        rt.answers.release_one();
        rt.wait_settled(2).await;

        rt.handle.submit("follow up").await.unwrap();
        rt.wait_for(WAIT, |v| v.busy).await.unwrap();

        // Feedback lands while the chat request is still pending
        rt.handle.submit_feedback("m1", Feedback::Liked).await.unwrap();
        let view = rt
            .wait_for(WAIT, |v| v.messages[1].feedback() == Some(Feedback::Liked))
            .await
            .unwrap();
        assert!(view.busy);

        rt.answers.release_one();
        rt.wait_settled(4).await;

        let requests = rt.answers.recorded_requests();
        assert_eq!(requests[0].history, Some(vec![]));
        let history = requests[1].history.clone().unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].id(), Some("m1"));
        assert_eq!(history[1].feedback(), None);
    }

    #[tokio::test]
    async fn test_history_can_be_disabled() {
        let rt = TestSession::builder().send_history(false).build();
        rt.answers.queue_answer("a", None);

        rt.handle.submit("q").await.unwrap();
        rt.wait_settled(2).await;
        assert_eq!(rt.answers.recorded_requests()[0].history, None);
    }

    #[tokio::test]
    async fn test_feedback_failure_is_swallowed() {
        let rt = TestSession::builder().build();
        rt.answers.queue_answer("Hi there", Some("m1"));
        rt.feedback.queue_error(ServiceError::server("500"));

        rt.handle.submit("hello").await.unwrap();
        rt.wait_settled(2).await;
        let before = rt.handle.view();

        rt.handle.submit_feedback("m1", Feedback::Disliked).await.unwrap();
        // Second judgment succeeds and proves the first was fully handled
        rt.handle.submit_feedback("m1", Feedback::Liked).await.unwrap();
        let view = rt
            .wait_for(WAIT, |v| v.messages[1].feedback().is_some())
            .await
            .unwrap();

        assert_eq!(rt.feedback.recorded_requests().len(), 2);
        assert_eq!(view.messages[1].feedback(), Some(Feedback::Liked));
        assert_eq!(view.error, None);
        assert_eq!(view.messages.len(), before.messages.len());
    }

    #[tokio::test]
    async fn test_rejudging_updates_to_latest() {
        let rt = TestSession::builder().build();
        rt.answers.queue_answer("Hi there", Some("m1"));

        rt.handle.submit("hello").await.unwrap();
        rt.wait_settled(2).await;

        rt.handle.submit_feedback("m1", Feedback::Liked).await.unwrap();
        rt.wait_for(WAIT, |v| v.messages[1].feedback() == Some(Feedback::Liked))
            .await
            .unwrap();
        rt.handle.submit_feedback("m1", Feedback::Disliked).await.unwrap();
        let view = rt
            .wait_for(WAIT, |v| v.messages[1].feedback() == Some(Feedback::Disliked))
            .await
            .unwrap();

        let liked = view
            .messages
            .iter()
            .filter(|m| m.feedback() == Some(Feedback::Liked))
            .count();
        assert_eq!(liked, 0);
        assert_eq!(rt.feedback.recorded_requests().len(), 2);
    }

    #[tokio::test]
    async fn test_subscribers_see_each_mutation() {
        let rt = TestSession::builder().build();
        let mut events = rt.handle.subscribe();
        rt.answers.queue_answer("Hi there", Some("m1"));

        rt.handle.submit("hello").await.unwrap();
        rt.wait_settled(2).await;
        rt.handle.submit_feedback("m1", Feedback::Liked).await.unwrap();
        rt.wait_for(WAIT, |v| v.messages[1].feedback().is_some())
            .await
            .unwrap();

        let mut received = Vec::new();
        while let Ok(event) = events.try_recv() {
            received.push(event);
        }

        assert_eq!(
            received,
            vec![
                SessionEvent::MessageAppended {
                    index: 0,
                    message: Message::user("hello"),
                },
                SessionEvent::StateChange {
                    busy: true,
                    error: None,
                },
                SessionEvent::MessageAppended {
                    index: 1,
                    message: Message::assistant("Hi there", Some("m1".to_string())),
                },
                SessionEvent::StateChange {
                    busy: false,
                    error: None,
                },
                SessionEvent::FeedbackUpdated {
                    id: "m1".to_string(),
                    feedback: Feedback::Liked,
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_dropping_handle_ends_session() {
        let rt = TestSession::builder().build();
        let weak = Arc::downgrade(&rt.answers);
        let TestSession { handle, answers, .. } = rt;
        drop(answers);
        drop(handle);

        // The session task owns the last reference; it goes once the task exits
        tokio::time::timeout(WAIT, async {
            while weak.upgrade().is_some() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("session task did not exit");
    }
}
