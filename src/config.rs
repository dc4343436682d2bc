//! Client configuration

use reqwest::Url;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://localhost:5000";
pub const DEFAULT_CHAT_PATH: &str = "/api/ask/chat";
pub const DEFAULT_FEEDBACK_PATH: &str = "/api/ask/feedback";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} is not a valid URL: {value}")]
    InvalidUrl { var: &'static str, value: String },
    #[error("{var} must be true or false, got {value}")]
    InvalidBool { var: &'static str, value: String },
    #[error("{var} must be a whole number of seconds, got {value}")]
    InvalidTimeout { var: &'static str, value: String },
}

/// Where the helpdesk services live and how to talk to them
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,
    pub chat_path: String,
    pub feedback_path: String,
    /// Forward prior turns with every query
    pub send_history: bool,
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            chat_path: DEFAULT_CHAT_PATH.to_string(),
            feedback_path: DEFAULT_FEEDBACK_PATH.to_string(),
            send_history: true,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    /// Read the `HELPDESK_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if a set variable holds an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source; unset variables take defaults
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` naming the first variable that fails to parse.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let base_url = match var("HELPDESK_API_URL") {
            Some(value) => {
                Url::parse(&value).map_err(|_| ConfigError::InvalidUrl {
                    var: "HELPDESK_API_URL",
                    value: value.clone(),
                })?;
                value
            }
            None => defaults.base_url,
        };

        let send_history = match var("HELPDESK_SEND_HISTORY") {
            Some(value) => match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => {
                    return Err(ConfigError::InvalidBool {
                        var: "HELPDESK_SEND_HISTORY",
                        value,
                    })
                }
            },
            None => defaults.send_history,
        };

        let request_timeout = match var("HELPDESK_TIMEOUT_SECS") {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or(ConfigError::InvalidTimeout {
                    var: "HELPDESK_TIMEOUT_SECS",
                    value,
                })?,
            None => defaults.request_timeout,
        };

        Ok(Self {
            base_url,
            chat_path: var("HELPDESK_CHAT_PATH").unwrap_or(defaults.chat_path),
            feedback_path: var("HELPDESK_FEEDBACK_PATH").unwrap_or(defaults.feedback_path),
            send_history,
            request_timeout,
        })
    }

    pub fn chat_url(&self) -> String {
        join_url(&self.base_url, &self.chat_path)
    }

    pub fn feedback_url(&self) -> String {
        join_url(&self.base_url, &self.feedback_path)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
