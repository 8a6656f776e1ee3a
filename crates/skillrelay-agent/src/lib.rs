//! SkillRelay agent: turns one user message into one reply.
//!
//! The model first picks the skills a message needs, then runs a bounded
//! tool-use loop with those skills' instructions and credentials in the
//! system prompt. The only tool is `http_request`.
//!
//! Modules:
//!   - `llm`: Messages API client behind the [`llm::MessagesApi`] trait
//!   - `types`: wire types (messages, content blocks, stop reasons, usage)
//!   - `prompt`: system prompt assembly
//!   - `summarizer`: content-hash cached skill summarization
//!   - `tools`: the `http_request` tool and call dispatch
//!   - `orchestrator`: selection, the conversation state machine, cost accounting
//!   - `error`: chat errors and their caller-facing classification
//!   - `bootstrap`: startup wiring from the environment

pub mod bootstrap;
pub mod error;
pub mod llm;
pub mod orchestrator;
pub mod prompt;
pub mod summarizer;
pub mod tools;
pub mod types;

pub use bootstrap::{bootstrap, Runtime};
pub use error::{ChatError, ErrorReply};
pub use orchestrator::{ChatEnd, ChatOutcome, ConversationOrchestrator};
