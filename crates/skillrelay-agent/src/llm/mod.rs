//! Anthropic Messages API client.
//!
//! The conversation loop and the summarizer talk to the model only through
//! [`MessagesApi`], so tests can script replies without a network.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use skillrelay_core::config::LlmConfig;

use crate::types::{safe_truncate, MessagesRequest, MessagesResponse};

#[cfg(test)]
pub(crate) mod mock;
#[cfg(test)]
mod tests;

pub const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// Non-2xx reply from the model API.
    #[error("Model API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Model API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to parse model API response: {0}")]
    Decode(String),
}

impl LlmError {
    pub fn status(&self) -> Option<u16> {
        match self {
            LlmError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The upstream detail without the status prefix.
    pub fn detail(&self) -> String {
        match self {
            LlmError::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

#[async_trait]
pub trait MessagesApi: Send + Sync {
    async fn create(&self, request: &MessagesRequest) -> Result<MessagesResponse, LlmError>;
}

pub struct LlmClient {
    http: reqwest::Client,
    api_base: String,
    api_key: String,
}

impl LlmClient {
    /// Build a client. `timeout: None` leaves calls unbounded.
    pub fn new(api_base: &str, api_key: &str, timeout: Option<Duration>) -> Result<Self, LlmError> {
        let mut builder = reqwest::Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        Ok(Self {
            http: builder.build()?,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        Self::new(&config.api_base, &config.api_key, config.timeout)
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.api_base.trim_end_matches("/v1"))
    }
}

#[async_trait]
impl MessagesApi for LlmClient {
    async fn create(&self, request: &MessagesRequest) -> Result<MessagesResponse, LlmError> {
        let url = self.messages_url();
        tracing::debug!(model = %request.model, messages = request.messages.len(), "model call");

        let resp = self
            .http
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        let body_text = resp.text().await?;
        if !status.is_success() {
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: extract_error_message(&body_text),
            });
        }

        serde_json::from_str(&body_text).map_err(|e| {
            LlmError::Decode(format!("{} (body: {})", e, safe_truncate(&body_text, 200)))
        })
    }
}

/// Pull `error.message` out of an Anthropic error body; fall back to the raw text.
pub(crate) fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| body.trim().to_string())
}
