//! Environment key constants and aliases.
//!
//! Primary keys use the `SKILLRELAY_*` prefix; the Anthropic SDK names and the
//! older unprefixed names are accepted as aliases.

/// Model API configuration
pub mod llm {
    pub const API_KEY: &str = "SKILLRELAY_API_KEY";
    pub const API_KEY_ALIASES: &[&str] = &["ANTHROPIC_API_KEY"];

    pub const API_BASE: &str = "SKILLRELAY_API_BASE";
    pub const API_BASE_ALIASES: &[&str] = &["ANTHROPIC_API_BASE", "ANTHROPIC_BASE_URL"];

    pub const MODEL: &str = "SKILLRELAY_MODEL";
    pub const MODEL_ALIASES: &[&str] = &["ANTHROPIC_MODEL"];

    pub const MAX_TOKENS: &str = "SKILLRELAY_MAX_TOKENS";

    /// Unset means model calls never time out.
    pub const MODEL_TIMEOUT_SECS: &str = "SKILLRELAY_MODEL_TIMEOUT_SECS";
}

/// Conversation loop and tool limits
pub mod chat {
    /// Maximum model rounds per chat call (selection round excluded).
    pub const MAX_ROUNDS: &str = "SKILLRELAY_MAX_ROUNDS";
    pub const MAX_ROUNDS_ALIASES: &[&str] = &["MAX_RETRIES"];

    pub const HTTP_TIMEOUT_SECS: &str = "SKILLRELAY_HTTP_TIMEOUT_SECS";
}

/// Skill roots, system skills and the summarization cache
pub mod skills {
    /// Comma-separated list of directories, each holding one subdirectory per skill.
    pub const SKILLS_PATH: &str = "SKILLRELAY_SKILLS_PATH";
    pub const SKILLS_PATH_ALIASES: &[&str] = &["SKILLS_PATH"];

    /// Comma-separated skill names that are always injected.
    pub const SYSTEM_SKILLS: &str = "SKILLRELAY_SYSTEM_SKILLS";

    pub const SUMMARIES_PATH: &str = "SKILLRELAY_SUMMARIES_PATH";
    pub const SUMMARIES_PATH_ALIASES: &[&str] = &["SKILLS_SUMMARIES_PATH"];

    pub const SUMMARIZATION_ENABLED: &str = "SKILLRELAY_SUMMARIZATION_ENABLED";
    pub const SUMMARIZATION_ENABLED_ALIASES: &[&str] = &["SKILLS_SUMMARIZATION_ENABLED"];
}

/// Logging and usage records
pub mod observability {
    pub const SKILLRELAY_QUIET: &str = "SKILLRELAY_QUIET";
    pub const SKILLRELAY_LOG_LEVEL: &str = "SKILLRELAY_LOG_LEVEL";
    pub const SKILLRELAY_LOG_JSON: &str = "SKILLRELAY_LOG_JSON";
    /// JSONL file receiving one usage record per chat call.
    pub const SKILLRELAY_USAGE_LOG: &str = "SKILLRELAY_USAGE_LOG";
}
