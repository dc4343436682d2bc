//! HTTP implementation of the helpdesk services

use super::types::{AskRequest, AskResponse, FeedbackRequest};
use super::{AnswerService, FeedbackService, ServiceError};
use crate::config::ClientConfig;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;

/// JSON-over-HTTP client for the chat and feedback endpoints
#[derive(Clone)]
pub struct HttpHelpdeskClient {
    client: Client,
    chat_url: String,
    feedback_url: String,
}

impl HttpHelpdeskClient {
    /// # Errors
    ///
    /// Returns an `Unknown` error if the underlying HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ServiceError::unknown(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            chat_url: config.chat_url(),
            feedback_url: config.feedback_url(),
        })
    }

    /// POST a JSON body and return the raw response body on 2xx
    async fn post_json<B: Serialize + Sync>(&self, url: &str, body: &B) -> Result<String, ServiceError> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ServiceError::network(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    ServiceError::network(format!("Connection failed: {e}"))
                } else {
                    ServiceError::unknown(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ServiceError::network(format!("Failed to read response: {e}")))?;

        if status.is_success() {
            Ok(text)
        } else {
            Err(status_error(status, &text))
        }
    }
}

fn status_error(status: StatusCode, body: &str) -> ServiceError {
    if status.is_server_error() {
        ServiceError::server(format!("Server error {status}: {body}"))
    } else {
        ServiceError::client(format!("HTTP {status}: {body}"))
    }
}

#[async_trait]
impl AnswerService for HttpHelpdeskClient {
    async fn ask(&self, request: &AskRequest) -> Result<AskResponse, ServiceError> {
        let body = self.post_json(&self.chat_url, request).await?;
        serde_json::from_str(&body).map_err(|e| {
            ServiceError::invalid_response(format!("Failed to parse answer: {e} - body: {body}"))
        })
    }
}

#[async_trait]
impl FeedbackService for HttpHelpdeskClient {
    async fn record(&self, request: &FeedbackRequest) -> Result<(), ServiceError> {
        self.post_json(&self.feedback_url, request).await.map(|_| ())
    }
}
