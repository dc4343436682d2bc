//! Wire types for the helpdesk services

use crate::conversation::{Feedback, Message};
use serde::{Deserialize, Serialize};

/// Body of a chat request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AskRequest {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<Message>>,
}

/// Body of a chat response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
    #[serde(default)]
    pub id: Option<String>,
}

/// Judgment as sent to the feedback service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackAction {
    Like,
    Dislike,
}

impl From<Feedback> for FeedbackAction {
    fn from(value: Feedback) -> Self {
        match value {
            Feedback::Liked => FeedbackAction::Like,
            Feedback::Disliked => FeedbackAction::Dislike,
        }
    }
}

/// Body of a feedback request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRequest {
    pub id: String,
    pub action: FeedbackAction,
}

impl FeedbackRequest {
    pub fn new(id: impl Into<String>, judgment: Feedback) -> Self {
        Self {
            id: id.into(),
            action: judgment.into(),
        }
    }
}
