//! `http_request`: the one tool the model can call.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::ToolError;
use crate::types::{safe_truncate, ToolDefinition};

pub const HTTP_REQUEST_TOOL_NAME: &str = "http_request";
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";
const LOG_PREVIEW_LIMIT: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl From<HttpMethod> for reqwest::Method {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Tool input as sent by the model.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HttpRequestInput {
    pub url: String,
    pub method: HttpMethod,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub query_params: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
}

impl HttpRequestInput {
    /// Content-Type to add, if any: only when a body is sent and the caller
    /// did not set the header themselves.
    fn default_content_type(&self) -> Option<&str> {
        self.body.as_ref()?;
        if self
            .headers
            .keys()
            .any(|k| k.eq_ignore_ascii_case("content-type"))
        {
            return None;
        }
        Some(self.content_type.as_deref().unwrap_or(DEFAULT_CONTENT_TYPE))
    }
}

/// What the model sees: the status plus the body as JSON when it parses, else as text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HttpToolOutput {
    pub status: u16,
    pub body: Value,
}

impl HttpToolOutput {
    pub fn from_text(status: u16, text: String) -> Self {
        let body = serde_json::from_str(&text).unwrap_or(Value::String(text));
        Self { status, body }
    }
}

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: HTTP_REQUEST_TOOL_NAME.to_string(),
        description: "Execute an HTTP request to any external API. Supports any auth scheme, content type, query params, and body format.".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "Base URL, without query params"
                },
                "method": {
                    "type": "string",
                    "enum": ["GET", "POST", "PUT", "PATCH", "DELETE"]
                },
                "headers": {
                    "type": "object",
                    "description": "HTTP headers. Use for auth (Authorization: Bearer ..., x-api-key: ...), content negotiation, or any custom headers.",
                    "additionalProperties": {"type": "string"}
                },
                "query_params": {
                    "type": "object",
                    "description": "Query string parameters. Will be appended to the URL as ?key=value&...",
                    "additionalProperties": {"type": "string"}
                },
                "body": {
                    "type": "string",
                    "description": "Raw request body as a string. For JSON payloads stringify the object yourself. For form data use key=value&... format."
                },
                "content_type": {
                    "type": "string",
                    "description": "Value for Content-Type header. Defaults to application/json. Use application/x-www-form-urlencoded for form data, text/plain for raw text, etc."
                }
            },
            "required": ["url", "method"]
        }),
    }
}

/// Executes `http_request` calls with a shared connection pool.
#[derive(Debug, Clone)]
pub struct HttpRequestExecutor {
    http: reqwest::Client,
}

impl HttpRequestExecutor {
    pub fn new(timeout: Duration) -> Result<Self, ToolError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }

    /// Send the request. HTTP error statuses are returned as output, not errors;
    /// only transport failures (connect, DNS, timeout) fail.
    pub async fn execute(&self, input: &HttpRequestInput) -> Result<HttpToolOutput, ToolError> {
        let mut req = self
            .http
            .request(input.method.into(), input.url.as_str());
        if let Some(params) = &input.query_params {
            req = req.query(params);
        }
        if let Some(ct) = input.default_content_type() {
            req = req.header(reqwest::header::CONTENT_TYPE, ct);
        }
        for (name, value) in &input.headers {
            req = req.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &input.body {
            req = req.body(body.clone());
        }

        tracing::debug!(method = ?input.method, url = %input.url, "http_request");
        let resp = req.send().await?;
        let status = resp.status().as_u16();
        let text = resp.text().await?;

        let output = HttpToolOutput::from_text(status, text);
        if tracing::enabled!(tracing::Level::DEBUG) {
            let rendered = serde_json::to_string(&output).unwrap_or_default();
            tracing::debug!(status, response = %safe_truncate(&rendered, LOG_PREVIEW_LIMIT), "http_request done");
        }
        Ok(output)
    }
}
