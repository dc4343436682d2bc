//! Events that can occur in a chat session

use crate::client::ServiceError;
use crate::conversation::Feedback;

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User events
    Submit {
        text: String,
    },
    SubmitFeedback {
        id: String,
        judgment: Feedback,
    },

    // Answering service completions
    AnswerReceived {
        answer: String,
        id: Option<String>,
    },
    AnswerFailed {
        error: ServiceError,
    },

    // Feedback service completions
    FeedbackRecorded {
        id: String,
        judgment: Feedback,
    },
    FeedbackFailed {
        id: String,
        judgment: Feedback,
        error: ServiceError,
    },
}
