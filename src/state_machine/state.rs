//! Chat session state types

/// Shown to the user whenever a chat request fails
pub const CHAT_FAILURE_MESSAGE: &str = "Oops! Something went wrong. Please try again.";

/// Request coordinator state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ChatState {
    /// Ready for user input, nothing in flight
    #[default]
    Idle,

    /// One chat request in flight; the busy indicator is shown
    Pending { query: String },

    /// Last request failed. Accepts a new submit exactly like `Idle`.
    Error { message: String },
}

impl ChatState {
    /// Busy indicator
    pub fn is_busy(&self) -> bool {
        matches!(self, ChatState::Pending { .. })
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            ChatState::Error { message } => Some(message),
            _ => None,
        }
    }
}

/// Per-session configuration (immutable for the session lifetime)
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub session_id: String,
    /// Forward the prior log with each query
    pub send_history: bool,
}

impl SessionContext {
    pub fn new(session_id: impl Into<String>, send_history: bool) -> Self {
        Self {
            session_id: session_id.into(),
            send_history,
        }
    }
}
