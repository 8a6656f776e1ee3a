//! Messages API wire types shared by the model client, the summarizer and
//! the conversation loop.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Truncate a string to at most `max_bytes` bytes at a valid UTF-8 char boundary.
pub fn safe_truncate(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        #[serde(default)]
        input: Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
    },
    /// Block types this runtime does not model (thinking, server tools, ...).
    #[serde(other)]
    Unknown,
}

/// One conversation turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: Vec<ContentBlock>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: vec![ContentBlock::Text { text: text.into() }],
        }
    }

    /// Echo an assistant reply back into the history. Unknown blocks are dropped.
    pub fn assistant(content: &[ContentBlock]) -> Self {
        Self {
            role: Role::Assistant,
            content: content
                .iter()
                .filter(|b| !matches!(b, ContentBlock::Unknown))
                .cloned()
                .collect(),
        }
    }

    /// A single user turn carrying every result of one tool round.
    pub fn tool_results(results: Vec<ToolResult>) -> Self {
        Self {
            role: Role::User,
            content: results
                .into_iter()
                .map(|r| ContentBlock::ToolResult {
                    tool_use_id: r.id,
                    content: r.content,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CacheControl {
    Ephemeral,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SystemBlock {
    Text {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cache_control: Option<CacheControl>,
    },
}

impl SystemBlock {
    pub fn text(text: impl Into<String>) -> Self {
        SystemBlock::Text {
            text: text.into(),
            cache_control: None,
        }
    }

    /// A block the backend may cache across consecutive calls.
    pub fn cached(text: impl Into<String>) -> Self {
        SystemBlock::Text {
            text: text.into(),
            cache_control: Some(CacheControl::Ephemeral),
        }
    }

    pub fn as_text(&self) -> &str {
        match self {
            SystemBlock::Text { text, .. } => text,
        }
    }

    pub fn is_cached(&self) -> bool {
        match self {
            SystemBlock::Text { cache_control, .. } => cache_control.is_some(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessagesRequest {
    pub model: String,
    pub max_tokens: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub system: Vec<SystemBlock>,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,
}

/// Why the model stopped. Unrecognised values are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StopReason {
    EndTurn,
    ToolUse,
    MaxTokens,
    StopSequence,
    PauseTurn,
    Refusal,
    Other(String),
}

impl StopReason {
    pub fn as_str(&self) -> &str {
        match self {
            StopReason::EndTurn => "end_turn",
            StopReason::ToolUse => "tool_use",
            StopReason::MaxTokens => "max_tokens",
            StopReason::StopSequence => "stop_sequence",
            StopReason::PauseTurn => "pause_turn",
            StopReason::Refusal => "refusal",
            StopReason::Other(s) => s,
        }
    }
}

impl From<String> for StopReason {
    fn from(s: String) -> Self {
        match s.as_str() {
            "end_turn" => StopReason::EndTurn,
            "tool_use" => StopReason::ToolUse,
            "max_tokens" => StopReason::MaxTokens,
            "stop_sequence" => StopReason::StopSequence,
            "pause_turn" => StopReason::PauseTurn,
            "refusal" => StopReason::Refusal,
            _ => StopReason::Other(s),
        }
    }
}

impl From<StopReason> for String {
    fn from(r: StopReason) -> Self {
        r.as_str().to_string()
    }
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token counts reported for one model call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
    #[serde(default)]
    pub cache_creation_input_tokens: Option<u64>,
    #[serde(default)]
    pub cache_read_input_tokens: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessagesResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub stop_reason: Option<StopReason>,
    #[serde(default)]
    pub usage: Usage,
}

impl MessagesResponse {
    /// Text of the first `text` block, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.content.iter().find_map(|b| match b {
            ContentBlock::Text { text } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn tool_calls(&self) -> Vec<ToolCall> {
        self.content
            .iter()
            .filter_map(|b| match b {
                ContentBlock::ToolUse { id, name, input } => Some(ToolCall {
                    id: id.clone(),
                    name: name.clone(),
                    input: input.clone(),
                }),
                _ => None,
            })
            .collect()
    }
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub input: Value,
}

/// The result fed back for a [`ToolCall`], correlated by `id`.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResult {
    pub id: String,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_safe_truncate_respects_char_boundary() {
        assert_eq!(safe_truncate("hello", 10), "hello");
        assert_eq!(safe_truncate("héllo", 2), "h");
        assert_eq!(safe_truncate("héllo", 3), "hé");
    }

    #[test]
    fn test_stop_reason_parsing() {
        let r: StopReason = serde_json::from_value(json!("tool_use")).unwrap();
        assert_eq!(r, StopReason::ToolUse);
        let r: StopReason = serde_json::from_value(json!("model_context_window_exceeded")).unwrap();
        assert_eq!(r, StopReason::Other("model_context_window_exceeded".into()));
        assert_eq!(r.to_string(), "model_context_window_exceeded");
        assert_eq!(serde_json::to_value(StopReason::MaxTokens).unwrap(), json!("max_tokens"));
    }

    #[test]
    fn test_response_tolerates_unknown_blocks() {
        let resp: MessagesResponse = serde_json::from_value(json!({
            "id": "msg_1",
            "model": "claude-sonnet-4-6",
            "content": [
                {"type": "thinking", "thinking": "...", "signature": "x"},
                {"type": "text", "text": "Calling the API."},
                {"type": "tool_use", "id": "toolu_1", "name": "http_request", "input": {"url": "https://x.test", "method": "GET"}}
            ],
            "stop_reason": "tool_use",
            "usage": {"input_tokens": 10, "output_tokens": 5, "cache_read_input_tokens": null}
        }))
        .unwrap();

        assert_eq!(resp.content[0], ContentBlock::Unknown);
        assert_eq!(resp.first_text(), Some("Calling the API."));
        assert_eq!(resp.stop_reason, Some(StopReason::ToolUse));
        assert_eq!(resp.usage.cache_read_input_tokens, None);

        let calls = resp.tool_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].id, "toolu_1");
        assert_eq!(calls[0].input["method"], "GET");

        let echoed = Message::assistant(&resp.content);
        assert_eq!(echoed.content.len(), 2);
    }

    #[test]
    fn test_system_block_cache_control_shape() {
        let blocks = vec![SystemBlock::text("preamble"), SystemBlock::cached("docs")];
        assert_eq!(
            serde_json::to_value(&blocks).unwrap(),
            json!([
                {"type": "text", "text": "preamble"},
                {"type": "text", "text": "docs", "cache_control": {"type": "ephemeral"}}
            ])
        );
    }

    #[test]
    fn test_tool_results_message_shape() {
        let msg = Message::tool_results(vec![
            ToolResult { id: "a".into(), content: "{\"status\":200}".into() },
            ToolResult { id: "b".into(), content: "{\"error\":\"boom\"}".into() },
        ]);
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({
                "role": "user",
                "content": [
                    {"type": "tool_result", "tool_use_id": "a", "content": "{\"status\":200}"},
                    {"type": "tool_result", "tool_use_id": "b", "content": "{\"error\":\"boom\"}"}
                ]
            })
        );
    }
}
