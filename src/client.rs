//! Helpdesk service abstraction
//!
//! The answering and feedback services are consumed through these traits so
//! the session runtime can be driven by the HTTP adapter or by test mocks.

mod error;
mod http;
mod types;

pub use error::{ServiceError, ServiceErrorKind};
pub use http::HttpHelpdeskClient;
pub use types::{AskRequest, AskResponse, FeedbackAction, FeedbackRequest};

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

/// Remote question-answering service
#[async_trait]
pub trait AnswerService: Send + Sync {
    async fn ask(&self, request: &AskRequest) -> Result<AskResponse, ServiceError>;
}

/// Remote feedback-recording service
#[async_trait]
pub trait FeedbackService: Send + Sync {
    async fn record(&self, request: &FeedbackRequest) -> Result<(), ServiceError>;
}

#[async_trait]
impl<T: AnswerService + ?Sized> AnswerService for Arc<T> {
    async fn ask(&self, request: &AskRequest) -> Result<AskResponse, ServiceError> {
        (**self).ask(request).await
    }
}

#[async_trait]
impl<T: FeedbackService + ?Sized> FeedbackService for Arc<T> {
    async fn record(&self, request: &FeedbackRequest) -> Result<(), ServiceError> {
        (**self).record(request).await
    }
}

/// Logging wrapper for helpdesk services
pub struct LoggingService<S> {
    inner: S,
}

impl<S> LoggingService<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<S: AnswerService> AnswerService for LoggingService<S> {
    async fn ask(&self, request: &AskRequest) -> Result<AskResponse, ServiceError> {
        let start = Instant::now();
        let result = self.inner.ask(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(response) => {
                tracing::info!(
                    duration_ms = %duration.as_millis(),
                    history_len = request.history.as_ref().map_or(0, Vec::len),
                    answer_len = response.answer.len(),
                    has_id = response.id.is_some(),
                    "Chat request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    duration_ms = %duration.as_millis(),
                    kind = e.kind.as_str(),
                    error = %e.message,
                    "Chat request failed"
                );
            }
        }

        result
    }
}

#[async_trait]
impl<S: FeedbackService> FeedbackService for LoggingService<S> {
    async fn record(&self, request: &FeedbackRequest) -> Result<(), ServiceError> {
        let start = Instant::now();
        let result = self.inner.record(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(()) => {
                tracing::debug!(
                    duration_ms = %duration.as_millis(),
                    message_id = %request.id,
                    action = ?request.action,
                    "Feedback recorded"
                );
            }
            Err(e) => {
                tracing::debug!(
                    duration_ms = %duration.as_millis(),
                    message_id = %request.id,
                    action = ?request.action,
                    kind = e.kind.as_str(),
                    "Feedback request failed"
                );
            }
        }

        result
    }
}
