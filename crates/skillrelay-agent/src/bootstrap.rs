//! Startup: load skills, summarize, resolve secrets, build the orchestrator.
//!
//! Order matters: promotion runs before anything reads the manifest, and
//! secret resolution runs last because scanned tokens depend on the final
//! (possibly summarized) content.

use std::sync::Arc;

use anyhow::{Context, Result};

use skillrelay_core::config::{ChatLimits, EnvLookup, LlmConfig, ProcessEnv, SkillsConfig};
use skillrelay_core::skill::{SecretAudit, SecretBinding, Skill, SkillStore};

use crate::llm::{LlmClient, MessagesApi};
use crate::orchestrator::{ChatConfig, ConversationOrchestrator};
use crate::summarizer::{SkillSummarizer, SUMMARIZER_SKILL_NAME};
use crate::tools::ToolExecutor;

/// A ready-to-serve orchestrator plus the startup secret audit.
pub struct Runtime {
    pub orchestrator: Arc<ConversationOrchestrator>,
    pub audit: SecretAudit,
}

/// Load every skill root in order and promote the configured system skills.
/// The summarizer meta-skill is taken out of the store and returned separately
/// so it is never offered for selection.
pub fn prepare_skills(config: &SkillsConfig, env: &dyn EnvLookup) -> (SkillStore, Option<Skill>) {
    let mut store = SkillStore::new();
    for root in &config.roots {
        store.load_from_directory(root, env);
    }
    for name in &config.system_skills {
        if !store.promote(name) {
            tracing::debug!(skill = %name, "system skill not loaded");
        }
    }
    let meta = store.take(SUMMARIZER_SKILL_NAME);
    (store, meta)
}

/// Build the runtime from the process environment. A missing API key fails here.
pub async fn bootstrap() -> Result<Runtime> {
    let llm = LlmConfig::require_from_env().context("Failed to load model configuration")?;
    let skills = SkillsConfig::from_env();
    let limits = ChatLimits::from_env();
    let api: Arc<dyn MessagesApi> =
        Arc::new(LlmClient::from_config(&llm).context("Failed to build model client")?);
    build_runtime(&llm, &skills, &limits, &ProcessEnv, api).await
}

pub async fn build_runtime(
    llm: &LlmConfig,
    skills: &SkillsConfig,
    limits: &ChatLimits,
    env: &dyn EnvLookup,
    api: Arc<dyn MessagesApi>,
) -> Result<Runtime> {
    let (mut store, meta) = prepare_skills(skills, env);

    let summarizer = SkillSummarizer::new(
        api.clone(),
        llm.model.clone(),
        llm.max_tokens,
        skills.summaries_dir.clone(),
        skills.summarization_enabled,
    );
    summarizer.summarize_all(&mut store, meta.as_ref()).await;

    let (secrets, audit) = SecretBinding::resolve(&store, env);
    audit.log();

    let tools = ToolExecutor::new(limits.http_timeout).context("Failed to build HTTP client")?;
    let orchestrator = ConversationOrchestrator::new(
        api,
        tools,
        store,
        secrets,
        ChatConfig {
            model: llm.model.clone(),
            max_tokens: llm.max_tokens,
            max_rounds: limits.max_rounds,
        },
    );
    Ok(Runtime {
        orchestrator: Arc::new(orchestrator),
        audit,
    })
}
