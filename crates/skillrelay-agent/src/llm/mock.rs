use std::collections::VecDeque;
use std::sync::Mutex;

use serde_json::Value;

use super::{LlmError, MessagesApi};
use crate::types::{ContentBlock, MessagesRequest, MessagesResponse, StopReason, Usage};

/// Replays queued replies in order and records every request it receives.
/// Running out of replies yields an `Api { status: 500 }` error.
#[derive(Default)]
pub(crate) struct ScriptedApi {
    replies: Mutex<VecDeque<Result<MessagesResponse, LlmError>>>,
    requests: Mutex<Vec<MessagesRequest>>,
}

impl ScriptedApi {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&self, reply: MessagesResponse) -> &Self {
        self.replies.lock().unwrap().push_back(Ok(reply));
        self
    }

    pub(crate) fn push_err(&self, err: LlmError) -> &Self {
        self.replies.lock().unwrap().push_back(Err(err));
        self
    }

    pub(crate) fn requests(&self) -> Vec<MessagesRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl MessagesApi for ScriptedApi {
    async fn create(&self, request: &MessagesRequest) -> Result<MessagesResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(LlmError::Api {
                    status: 500,
                    message: "scripted replies exhausted".to_string(),
                })
            })
    }
}

pub(crate) fn usage(input: u64, output: u64) -> Usage {
    Usage {
        input_tokens: input,
        output_tokens: output,
        ..Usage::default()
    }
}

pub(crate) fn reply(content: Vec<ContentBlock>, stop: StopReason, usage: Usage) -> MessagesResponse {
    MessagesResponse {
        id: "msg_mock".to_string(),
        model: "claude-sonnet-4-6".to_string(),
        content,
        stop_reason: Some(stop),
        usage,
    }
}

pub(crate) fn text_reply(text: &str, usage: Usage) -> MessagesResponse {
    reply(
        vec![ContentBlock::Text { text: text.to_string() }],
        StopReason::EndTurn,
        usage,
    )
}

pub(crate) fn tool_use_reply(calls: &[(&str, &str, Value)], usage: Usage) -> MessagesResponse {
    reply(
        calls
            .iter()
            .map(|(id, name, input)| ContentBlock::ToolUse {
                id: id.to_string(),
                name: name.to_string(),
                input: input.clone(),
            })
            .collect(),
        StopReason::ToolUse,
        usage,
    )
}
