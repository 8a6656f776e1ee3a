//! SkillRelay configuration layer.
//!
//! All environment reads go through here; business code consumes the typed
//! configs instead of calling `std::env::var` directly.
//!
//! - `loader`: `env_or`, `env_optional`, `env_bool`, `.env` loading, [`EnvLookup`]
//! - `schema`: `LlmConfig`, `SkillsConfig`, `ChatLimits`, `ObservabilityConfig`
//! - `env_keys`: key constants and their aliases

pub mod env_keys;
pub mod loader;
pub mod schema;

pub use loader::{
    env_bool, env_optional, env_or, env_usize, load_dotenv, split_list, EnvLookup, ProcessEnv,
};
pub use schema::{ChatLimits, LlmConfig, ObservabilityConfig, SkillsConfig};

/// Configuration problems that must stop the process at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("required configuration '{0}' is not set")]
    Missing(&'static str),
}
