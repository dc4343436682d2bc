//! Pure state transition function

use super::state::CHAT_FAILURE_MESSAGE;
use super::{ChatState, Effect, Event, SessionContext};
use crate::client::AskRequest;
use crate::conversation::ConversationLog;
use crate::format::{format_answer, history_snapshot};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ChatState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ChatState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Events the current state refuses. None of these change anything.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Query is empty")]
    EmptyQuery,
    #[error("A chat request is already in flight")]
    RequestPending,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

impl TransitionError {
    /// Rejections the user caused and should never be told about
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::EmptyQuery | Self::RequestPending)
    }
}

/// Pure transition function.
///
/// Given the same state, log and event it always yields the same result and
/// performs no I/O. The log is read-only here; mutations come back as
/// effects for the session runtime to apply.
///
/// # Errors
///
/// Returns a `TransitionError` when the event is not accepted in `state`.
/// Blank and overlapping submits are the silent kinds.
pub fn transition(
    state: &ChatState,
    context: &SessionContext,
    log: &ConversationLog,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // Blank input never reaches the log or the network
        (_, Event::Submit { text }) if text.trim().is_empty() => Err(TransitionError::EmptyQuery),

        // Single-flight guard
        (ChatState::Pending { .. }, Event::Submit { .. }) => Err(TransitionError::RequestPending),

        // Idle/Error + Submit -> Pending. Leaving Error clears it.
        (ChatState::Idle | ChatState::Error { .. }, Event::Submit { text }) => {
            let query = text.trim().to_string();
            // Prior turns only, captured before this query joins the log
            let history = history_snapshot(log, context.send_history);

            Ok(TransitionResult::new(ChatState::Pending {
                query: query.clone(),
            })
            .with_effect(Effect::append_user(query.clone()))
            .with_effect(Effect::PublishState)
            .with_effect(Effect::RequestAnswer {
                request: AskRequest { query, history },
            }))
        }

        (ChatState::Pending { .. }, Event::AnswerReceived { answer, id }) => {
            Ok(TransitionResult::new(ChatState::Idle)
                .with_effect(Effect::append_assistant(format_answer(&answer), id))
                .with_effect(Effect::PublishState))
        }

        (ChatState::Pending { .. }, Event::AnswerFailed { error }) => {
            Ok(TransitionResult::new(ChatState::Error {
                message: CHAT_FAILURE_MESSAGE.to_string(),
            })
            .with_effect(Effect::ReportChatFailure { error })
            .with_effect(Effect::PublishState))
        }

        // Feedback runs alongside whatever the chat flow is doing
        (state, Event::SubmitFeedback { id, judgment }) => {
            Ok(TransitionResult::new(state.clone())
                .with_effect(Effect::SendFeedback { id, judgment }))
        }

        (state, Event::FeedbackRecorded { id, judgment }) => {
            Ok(TransitionResult::new(state.clone())
                .with_effect(Effect::ApplyFeedback { id, judgment }))
        }

        (state, Event::FeedbackFailed { id, judgment, error }) => {
            Ok(TransitionResult::new(state.clone())
                .with_effect(Effect::ReportFeedbackFailure { id, judgment, error }))
        }

        (state, event) => Err(TransitionError::InvalidTransition(format!(
            "No transition from {state:?} with event {event:?}"
        ))),
    }
}
