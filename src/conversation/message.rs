//! Chat message types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Who authored a message
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// A like/dislike judgment on an assistant answer.
///
/// `Option<Feedback>` on a message is the tri-state: `None` means unset.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Feedback {
    Liked,
    Disliked,
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feedback::Liked => write!(f, "liked"),
            Feedback::Disliked => write!(f, "disliked"),
        }
    }
}

/// One entry in the conversation log.
///
/// Fields are private so the role invariants hold: user messages never carry
/// an id or feedback, assistant messages start with feedback unset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    role: Role,
    content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    feedback: Option<Feedback>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: None,
            role: Role::User,
            content: content.into(),
            feedback: None,
        }
    }

    pub fn assistant(content: impl Into<String>, id: Option<String>) -> Self {
        Self {
            id,
            role: Role::Assistant,
            content: content.into(),
            feedback: None,
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn feedback(&self) -> Option<Feedback> {
        self.feedback
    }

    /// Whether like/dislike controls may be offered for this message
    pub fn accepts_feedback(&self) -> bool {
        self.role == Role::Assistant && self.id.is_some()
    }

    pub(super) fn set_feedback(&mut self, value: Feedback) {
        self.feedback = Some(value);
    }
}
