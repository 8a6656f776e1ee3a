//! Tools exposed to the model. Dispatch never fails: every call gets a
//! result, errors included, so the model can react to them.

pub mod http_request;

use std::time::Duration;

use serde_json::json;

use crate::types::{ToolCall, ToolDefinition, ToolResult};
use http_request::{HttpRequestExecutor, HttpRequestInput, HTTP_REQUEST_TOOL_NAME};

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Invalid tool input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Transport(#[from] reqwest::Error),
}

/// Routes model tool calls to their implementation.
#[derive(Debug, Clone)]
pub struct ToolExecutor {
    http: HttpRequestExecutor,
}

impl ToolExecutor {
    pub fn new(http_timeout: Duration) -> Result<Self, ToolError> {
        Ok(Self {
            http: HttpRequestExecutor::new(http_timeout)?,
        })
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        vec![http_request::definition()]
    }

    /// Run one call. Failures become `{"error": "<message>"}` results.
    pub async fn execute(&self, call: &ToolCall) -> ToolResult {
        let content = match call.name.as_str() {
            HTTP_REQUEST_TOOL_NAME => match self.run_http_request(call).await {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(tool = %call.name, id = %call.id, error = %e, "tool call failed");
                    error_payload(&e.to_string())
                }
            },
            other => {
                tracing::warn!(tool = %other, id = %call.id, "unknown tool requested");
                error_payload(&format!("Unknown tool: {}", other))
            }
        };
        ToolResult {
            id: call.id.clone(),
            content,
        }
    }

    async fn run_http_request(&self, call: &ToolCall) -> Result<String, ToolError> {
        let input: HttpRequestInput = serde_json::from_value(call.input.clone())
            .map_err(|e| ToolError::InvalidInput(e.to_string()))?;
        let output = self.http.execute(&input).await?;
        serde_json::to_string(&output).map_err(|e| ToolError::InvalidInput(e.to_string()))
    }
}

fn error_payload(message: &str) -> String {
    json!({ "error": message }).to_string()
}
