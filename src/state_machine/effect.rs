//! Effects produced by state transitions

use crate::client::{AskRequest, ServiceError};
use crate::conversation::{Feedback, Message};

/// Effects to be executed after a state transition, in order
#[derive(Debug, Clone)]
pub enum Effect {
    /// Add a message to the tail of the log
    AppendMessage { message: Message },

    /// Set the feedback of a logged message
    ApplyFeedback { id: String, judgment: Feedback },

    /// Call the answering service (spawned as background task)
    RequestAnswer { request: AskRequest },

    /// Call the feedback service (spawned as background task)
    SendFeedback { id: String, judgment: Feedback },

    /// Record the detail behind a user-visible chat failure
    ReportChatFailure { error: ServiceError },

    /// Record a swallowed feedback failure on the diagnostic channel
    ReportFeedbackFailure {
        id: String,
        judgment: Feedback,
        error: ServiceError,
    },

    /// Tell subscribers the busy/error status changed
    PublishState,
}

impl Effect {
    pub fn append_user(content: impl Into<String>) -> Self {
        Effect::AppendMessage {
            message: Message::user(content),
        }
    }

    pub fn append_assistant(content: impl Into<String>, id: Option<String>) -> Self {
        Effect::AppendMessage {
            message: Message::assistant(content, id),
        }
    }
}
