//! Chat failures and their mapping to caller-facing replies.

use serde::Serialize;

use crate::llm::LlmError;
use crate::types::StopReason;

pub const UNKNOWN_ERROR: &str = "Unknown error";

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error(transparent)]
    Model(#[from] LlmError),

    /// The model stopped for a reason the loop does not handle.
    #[error("Unexpected stop_reason: {0}")]
    UnexpectedStopReason(StopReason),
}

/// `{ "error": ... }` body plus the status it should be reported with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReply {
    pub status: u16,
    pub error: String,
}

impl ChatError {
    /// Upstream 400/401/403/429 keep their status with a descriptive prefix;
    /// everything else is a 500 carrying the bare detail.
    pub fn classify(&self) -> ErrorReply {
        let (status, detail) = match self {
            ChatError::Model(e) => (e.status(), e.detail()),
            other => (None, other.to_string()),
        };
        let detail = if detail.trim().is_empty() {
            UNKNOWN_ERROR.to_string()
        } else {
            detail
        };
        let (status, error) = match status {
            Some(400) => (400, format!("Bad request: {}", detail)),
            Some(401) => (401, format!("Authentication failed: {}", detail)),
            Some(403) => (403, format!("Forbidden: {}", detail)),
            Some(429) => (429, format!("Rate limited: {}", detail)),
            _ => (500, detail),
        };
        ErrorReply { status, error }
    }
}
