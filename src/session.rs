//! Chat session runtime
//!
//! One session owns one conversation. Callers interact through a
//! [`SessionHandle`]; renderers subscribe to [`SessionEvent`]s or watch the
//! latest [`SessionView`].

mod executor;

#[cfg(test)]
pub mod testing;

pub use executor::ChatSession;

use crate::client::{AnswerService, FeedbackService};
use crate::conversation::{ConversationLog, Feedback, LogVersion, Message};
use crate::state_machine::{ChatState, Event, SessionContext};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, watch};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Chat session has ended")]
    Closed,
}

/// Notifications sent to subscribed renderers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    MessageAppended {
        index: usize,
        message: Message,
    },
    FeedbackUpdated {
        id: String,
        feedback: Feedback,
    },
    StateChange {
        /// Busy indicator
        busy: bool,
        error: Option<String>,
    },
}

/// Everything a renderer needs to draw the conversation
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionView {
    pub messages: Vec<Message>,
    pub busy: bool,
    pub error: Option<String>,
    pub version: LogVersion,
}

impl SessionView {
    pub(crate) fn capture(state: &ChatState, log: &ConversationLog) -> Self {
        Self {
            messages: log.snapshot(),
            busy: state.is_busy(),
            error: state.error_message().map(str::to_string),
            version: log.version(),
        }
    }
}

/// Handle to interact with a running session
#[derive(Clone)]
pub struct SessionHandle {
    session_id: String,
    event_tx: mpsc::Sender<Event>,
    broadcast_tx: broadcast::Sender<SessionEvent>,
    view_rx: watch::Receiver<SessionView>,
}

impl SessionHandle {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Submit a query. Blank input and submits while busy are ignored.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Closed` if the session task has ended.
    pub async fn submit(&self, text: impl Into<String>) -> Result<(), SessionError> {
        self.send(Event::Submit { text: text.into() }).await
    }

    /// Judge an assistant message. Best-effort: failures never reach the view.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Closed` if the session task has ended.
    pub async fn submit_feedback(
        &self,
        id: impl Into<String>,
        judgment: Feedback,
    ) -> Result<(), SessionError> {
        self.send(Event::SubmitFeedback {
            id: id.into(),
            judgment,
        })
        .await
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.broadcast_tx.subscribe()
    }

    pub fn watch(&self) -> watch::Receiver<SessionView> {
        self.view_rx.clone()
    }

    /// Latest view snapshot
    pub fn view(&self) -> SessionView {
        self.view_rx.borrow().clone()
    }

    async fn send(&self, event: Event) -> Result<(), SessionError> {
        self.event_tx
            .send(event)
            .await
            .map_err(|_| SessionError::Closed)
    }
}

/// Start a session on the current tokio runtime.
///
/// The session runs until every handle is dropped.
pub fn start<A, F>(context: SessionContext, answers: A, feedback: F) -> SessionHandle
where
    A: AnswerService + 'static,
    F: FeedbackService + 'static,
{
    let (event_tx, event_rx) = mpsc::channel(32);
    let (broadcast_tx, _) = broadcast::channel(128);
    let (view_tx, view_rx) = watch::channel(SessionView::default());

    let session_id = context.session_id.clone();
    let session = ChatSession::new(
        context,
        answers,
        feedback,
        event_rx,
        event_tx.downgrade(),
        broadcast_tx.clone(),
        view_tx,
    );

    tokio::spawn(session.run());

    SessionHandle {
        session_id,
        event_tx,
        broadcast_tx,
        view_rx,
    }
}
