//! Domain-grouped configuration structs, loaded from the environment.

use std::path::PathBuf;
use std::time::Duration;

use super::env_keys::{chat, llm, observability as obv_keys, skills};
use super::loader::{env_bool, env_optional, env_or, env_usize, load_dotenv, split_list};
use super::ConfigError;

pub const DEFAULT_API_BASE: &str = "https://api.anthropic.com";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-6";
pub const DEFAULT_MAX_TOKENS: usize = 4096;
pub const DEFAULT_MAX_ROUNDS: usize = 4;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_SKILLS_PATH: &str = "skills";
pub const DEFAULT_SYSTEM_SKILLS: &[&str] = &["response-format"];

/// Model API configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_base: String,
    pub api_key: String,
    pub model: String,
    pub max_tokens: usize,
    /// `None` leaves model calls unbounded in time.
    pub timeout: Option<Duration>,
}

impl LlmConfig {
    /// Load from the environment; an absent API key is a startup error.
    pub fn require_from_env() -> Result<Self, ConfigError> {
        load_dotenv();
        let api_key = env_optional(llm::API_KEY, llm::API_KEY_ALIASES)
            .ok_or(ConfigError::Missing(llm::API_KEY))?;
        Ok(Self {
            api_base: env_or(llm::API_BASE, llm::API_BASE_ALIASES, || {
                DEFAULT_API_BASE.to_string()
            }),
            api_key,
            model: env_or(llm::MODEL, llm::MODEL_ALIASES, || DEFAULT_MODEL.to_string()),
            max_tokens: env_usize(llm::MAX_TOKENS, &[], DEFAULT_MAX_TOKENS),
            timeout: env_optional(llm::MODEL_TIMEOUT_SECS, &[])
                .and_then(|s| s.parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
        })
    }
}

/// Skill roots, promotion list and summarization settings
#[derive(Debug, Clone)]
pub struct SkillsConfig {
    pub roots: Vec<PathBuf>,
    pub system_skills: Vec<String>,
    pub summaries_dir: PathBuf,
    pub summarization_enabled: bool,
}

impl SkillsConfig {
    pub fn from_env() -> Self {
        load_dotenv();
        let roots = split_list(&env_or(
            skills::SKILLS_PATH,
            skills::SKILLS_PATH_ALIASES,
            || DEFAULT_SKILLS_PATH.to_string(),
        ))
        .into_iter()
        .map(PathBuf::from)
        .collect();

        let system_skills = env_optional(skills::SYSTEM_SKILLS, &[])
            .map(|raw| split_list(&raw))
            .unwrap_or_else(|| DEFAULT_SYSTEM_SKILLS.iter().map(|s| s.to_string()).collect());

        let summaries_dir = env_optional(skills::SUMMARIES_PATH, skills::SUMMARIES_PATH_ALIASES)
            .map(PathBuf::from)
            .unwrap_or_else(default_summaries_dir);

        Self {
            roots,
            system_skills,
            summaries_dir,
            summarization_enabled: env_bool(
                skills::SUMMARIZATION_ENABLED,
                skills::SUMMARIZATION_ENABLED_ALIASES,
                true,
            ),
        }
    }
}

fn default_summaries_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".skillrelay")
        .join("skills-summaries")
}

/// Bounds for a single chat call
#[derive(Debug, Clone)]
pub struct ChatLimits {
    /// Model rounds allowed before the canned budget reply is returned.
    pub max_rounds: usize,
    pub http_timeout: Duration,
}

impl Default for ChatLimits {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

impl ChatLimits {
    pub fn from_env() -> Self {
        load_dotenv();
        let http_secs = env_optional(chat::HTTP_TIMEOUT_SECS, &[])
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);
        Self {
            max_rounds: env_usize(chat::MAX_ROUNDS, chat::MAX_ROUNDS_ALIASES, DEFAULT_MAX_ROUNDS)
                .max(1),
            http_timeout: Duration::from_secs(http_secs),
        }
    }
}

/// Observability: quiet, log level, JSON logs, usage log path
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub quiet: bool,
    pub log_level: String,
    pub log_json: bool,
    pub usage_log: Option<String>,
}

impl ObservabilityConfig {
    pub fn from_env() -> &'static Self {
        use std::sync::OnceLock;
        static CACHE: OnceLock<ObservabilityConfig> = OnceLock::new();
        CACHE.get_or_init(|| {
            load_dotenv();
            Self {
                quiet: env_bool(obv_keys::SKILLRELAY_QUIET, &[], false),
                log_level: env_or(obv_keys::SKILLRELAY_LOG_LEVEL, &[], || {
                    "skillrelay=info".to_string()
                }),
                log_json: env_bool(obv_keys::SKILLRELAY_LOG_JSON, &[], false),
                usage_log: env_optional(obv_keys::SKILLRELAY_USAGE_LOG, &[]),
            }
        })
    }
}
