//! Conversation log
//!
//! Ordered, append-only record of one chat session. The only in-place
//! mutation allowed is setting the feedback of an assistant message.

mod message;

pub use message::{Feedback, Message, Role};

/// Monotonic counter bumped on every log mutation
pub type LogVersion = u64;

/// The ordered message log for one session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationLog {
    messages: Vec<Message>,
    version: LogVersion,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a message to the tail
    pub fn append(&mut self, message: Message) -> LogVersion {
        self.messages.push(message);
        self.version += 1;
        self.version
    }

    /// Set the feedback of the first message with the given id.
    ///
    /// Returns `false` and leaves the log untouched when no message matches.
    pub fn update_feedback(&mut self, id: &str, value: Feedback) -> bool {
        let Some(message) = self.messages.iter_mut().find(|m| m.id() == Some(id)) else {
            return false;
        };
        message.set_feedback(value);
        self.version += 1;
        true
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn version(&self) -> LogVersion {
        self.version
    }

    pub fn find(&self, id: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.id() == Some(id))
    }

    /// Owned copy of the current content, detached from later mutations
    pub fn snapshot(&self) -> Vec<Message> {
        self.messages.clone()
    }
}
