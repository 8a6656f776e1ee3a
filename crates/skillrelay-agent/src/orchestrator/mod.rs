//! ConversationOrchestrator: one user message in, one reply out.
//!
//! A chat call walks an explicit state machine:
//!
//! ```text
//! Selecting -> Prompting -> AwaitingModel <-> ExecutingTools
//!                                 |
//!                                 +-> Done | Aborted
//! ```
//!
//! Transitions out of `AwaitingModel` are driven by the model's stop reason.
//! The number of model rounds is capped; reaching the cap ends the call with a
//! canned reply rather than an error.
//!
//! Sub-modules:
//!   - `selection`: selector prompt and permissive reply parsing
//!   - `usage`: token totals and the price table

mod selection;
mod usage;


pub use selection::{parse_selection, SELECTION_MAX_TOKENS, SKILL_SELECTOR_SYSTEM};
pub use usage::{estimate_cost, CostEstimate, UsageTotals};

use std::sync::Arc;

use serde_json::json;
use tracing::Instrument;
use uuid::Uuid;

use skillrelay_core::observability;
use skillrelay_core::skill::{SecretBinding, SkillStore};

use crate::error::ChatError;
use crate::llm::MessagesApi;
use crate::prompt::build_system_prompt;
use crate::tools::ToolExecutor;
use crate::types::{Message, MessagesRequest, MessagesResponse, StopReason};
use selection::selection_request;

pub const MAX_ROUNDS_REPLY: &str =
    "Could not complete the request within the allowed number of steps. Please try a more specific query.";

/// Model settings and limits for chat calls.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub model: String,
    pub max_tokens: usize,
    pub max_rounds: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatState {
    Selecting,
    Prompting,
    AwaitingModel,
    ExecutingTools,
    Done,
    Aborted,
}

/// How a successful chat call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatEnd {
    /// The model finished on its own.
    Completed,
    /// The round cap was reached; the reply is [`MAX_ROUNDS_REPLY`].
    BudgetExhausted,
}

impl ChatEnd {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatEnd::Completed => "completed",
            ChatEnd::BudgetExhausted => "budget_exhausted",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChatOutcome {
    pub message_id: String,
    pub reply: String,
    pub end: ChatEnd,
    pub selected_skills: Vec<String>,
    /// Conversation rounds used, selection excluded.
    pub rounds: usize,
    pub usage: UsageTotals,
    pub cost: CostEstimate,
}

/// Per-call conversation state: append-only history, round counter, usage.
struct Conversation {
    state: ChatState,
    messages: Vec<Message>,
    rounds: usize,
    usage: UsageTotals,
}

impl Conversation {
    fn new(user_message: &str) -> Self {
        Self {
            state: ChatState::Selecting,
            messages: vec![Message::user(user_message)],
            rounds: 0,
            usage: UsageTotals::default(),
        }
    }

    fn advance(&mut self, next: ChatState) {
        tracing::trace!(from = ?self.state, to = ?next, "chat state");
        self.state = next;
    }

    fn record(&mut self, response: &MessagesResponse) {
        self.usage.add(&response.usage);
    }
}

/// Owns the skill store and secret binding; shared across concurrent chat
/// calls behind an `Arc`. Nothing here is mutated after construction.
pub struct ConversationOrchestrator {
    api: Arc<dyn MessagesApi>,
    tools: ToolExecutor,
    store: SkillStore,
    secrets: SecretBinding,
    config: ChatConfig,
}

impl ConversationOrchestrator {
    pub fn new(
        api: Arc<dyn MessagesApi>,
        tools: ToolExecutor,
        store: SkillStore,
        secrets: SecretBinding,
        config: ChatConfig,
    ) -> Self {
        Self {
            api,
            tools,
            store,
            secrets,
            config,
        }
    }

    pub fn store(&self) -> &SkillStore {
        &self.store
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    pub async fn chat(&self, user_message: &str) -> Result<ChatOutcome, ChatError> {
        let message_id = Uuid::new_v4().to_string();
        let span = tracing::info_span!("chat", message_id = %message_id);
        self.run(message_id, user_message).instrument(span).await
    }

    async fn run(&self, message_id: String, user_message: &str) -> Result<ChatOutcome, ChatError> {
        let mut conv = Conversation::new(user_message);

        let selected = match self.select_skills(user_message, &mut conv).await {
            Ok(s) => s,
            Err(e) => return Err(self.abort(&mut conv, e)),
        };
        tracing::debug!(skills = ?selected, "selected skills");

        conv.advance(ChatState::Prompting);
        let system = build_system_prompt(&self.store, &self.secrets, &selected);
        let tools = self.tools.definitions();

        let (reply, end) = loop {
            conv.advance(ChatState::AwaitingModel);
            if conv.rounds >= self.config.max_rounds {
                tracing::warn!(max_rounds = self.config.max_rounds, "reached max rounds, stopping loop");
                conv.advance(ChatState::Done);
                break (MAX_ROUNDS_REPLY.to_string(), ChatEnd::BudgetExhausted);
            }
            conv.rounds += 1;

            let request = MessagesRequest {
                model: self.config.model.clone(),
                max_tokens: self.config.max_tokens,
                system: system.clone(),
                messages: conv.messages.clone(),
                tools: tools.clone(),
            };
            let response = match self.api.create(&request).await {
                Ok(r) => r,
                Err(e) => return Err(self.abort(&mut conv, e.into())),
            };
            conv.record(&response);
            tracing::debug!(
                round = conv.rounds,
                input_tokens = response.usage.input_tokens,
                output_tokens = response.usage.output_tokens,
                stop_reason = ?response.stop_reason,
                "model round"
            );

            match response.stop_reason.clone() {
                Some(StopReason::EndTurn) => {
                    conv.advance(ChatState::Done);
                    let text = response.first_text().unwrap_or_default().to_string();
                    break (text, ChatEnd::Completed);
                }
                Some(StopReason::ToolUse) => {
                    conv.advance(ChatState::ExecutingTools);
                    let calls = response.tool_calls();
                    let mut results = Vec::with_capacity(calls.len());
                    for call in &calls {
                        results.push(self.tools.execute(call).await);
                    }
                    conv.messages.push(Message::assistant(&response.content));
                    conv.messages.push(Message::tool_results(results));
                }
                other => {
                    let reason = other.unwrap_or_else(|| StopReason::Other("none".to_string()));
                    return Err(self.abort(&mut conv, ChatError::UnexpectedStopReason(reason)));
                }
            }
        };

        let outcome = ChatOutcome {
            message_id,
            reply,
            end,
            selected_skills: selected,
            rounds: conv.rounds,
            usage: conv.usage,
            cost: estimate_cost(&self.config.model, &conv.usage),
        };
        report(&outcome);
        Ok(outcome)
    }

    /// Pick skills for this message. An empty manifest skips the model call.
    /// Names that are not selectable are dropped.
    async fn select_skills(&self, user_message: &str, conv: &mut Conversation) -> Result<Vec<String>, ChatError> {
        let manifest = self.store.build_manifest();
        if manifest.is_empty() {
            return Ok(Vec::new());
        }
        let request = selection_request(&self.config.model, &manifest, user_message);
        let response = self.api.create(&request).await?;
        conv.record(&response);

        let mut selected = Vec::new();
        for name in parse_selection(response.first_text().unwrap_or("[]")) {
            if !self.store.selectable().iter().any(|s| s.name == name) {
                tracing::debug!(skill = %name, "ignoring unknown skill from selector");
                continue;
            }
            if !selected.contains(&name) {
                selected.push(name);
            }
        }
        Ok(selected)
    }

    fn abort(&self, conv: &mut Conversation, err: ChatError) -> ChatError {
        conv.advance(ChatState::Aborted);
        tracing::error!(
            rounds = conv.rounds,
            input_tokens = conv.usage.input_tokens,
            output_tokens = conv.usage.output_tokens,
            error = %err,
            "chat aborted"
        );
        err
    }
}

/// One structured summary per chat call, mirrored to the usage log when configured.
fn report(outcome: &ChatOutcome) {
    let skills = if outcome.selected_skills.is_empty() {
        "none".to_string()
    } else {
        outcome.selected_skills.join(", ")
    };
    tracing::info!(
        message_id = %outcome.message_id,
        skills = %skills,
        rounds = outcome.rounds,
        input_tokens = outcome.usage.input_tokens,
        output_tokens = outcome.usage.output_tokens,
        total_tokens = outcome.usage.total_tokens(),
        cache_write_tokens = outcome.usage.cache_write_tokens,
        cache_read_tokens = outcome.usage.cache_read_tokens,
        cost = %outcome.cost,
        "chat finished"
    );
    observability::record_usage(&json!({
        "message_id": outcome.message_id,
        "skills": outcome.selected_skills,
        "rounds": outcome.rounds,
        "end": outcome.end.as_str(),
        "input_tokens": outcome.usage.input_tokens,
        "output_tokens": outcome.usage.output_tokens,
        "total_tokens": outcome.usage.total_tokens(),
        "cache_write_tokens": outcome.usage.cache_write_tokens,
        "cache_read_tokens": outcome.usage.cache_read_tokens,
        "cost_usd": outcome.cost.usd(),
    }));
}
