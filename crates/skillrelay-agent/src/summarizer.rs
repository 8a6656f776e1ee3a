//! Skill summarization with an on-disk, content-addressed cache.
//!
//! Each skill body is condensed once by the model, using the `skill-summarizer`
//! skill's body as the instruction. The result is cached in
//! `<dir>/<skill>.md` behind a `<!-- content-hash:HASH -->` first line, so a
//! restart reuses it and any edit to the skill forces a fresh call.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sha2::{Digest, Sha256};

use skillrelay_core::skill::{Skill, SkillStore};

use crate::llm::MessagesApi;
use crate::types::{Message, MessagesRequest, SystemBlock};

pub const SUMMARIZER_SKILL_NAME: &str = "skill-summarizer";

const HASH_PREFIX: &str = "<!-- content-hash:";
const HASH_SUFFIX: &str = " -->";

/// First 16 hex chars of the SHA-256 of `content`.
pub fn content_hash(content: &str) -> String {
    let digest = Sha256::digest(content.as_bytes());
    let mut hex = hex::encode(digest);
    hex.truncate(16);
    hex
}

pub fn hash_marker(hash: &str) -> String {
    format!("{}{}{}", HASH_PREFIX, hash, HASH_SUFFIX)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryOutcome {
    CacheHit,
    Summarized,
    /// The model call failed; the skill keeps its original content.
    Failed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SummaryReport {
    pub cache_hits: usize,
    pub summarized: usize,
    pub failed: usize,
}

pub struct SkillSummarizer {
    api: Arc<dyn MessagesApi>,
    model: String,
    max_tokens: usize,
    cache_dir: PathBuf,
    enabled: bool,
}

impl SkillSummarizer {
    pub fn new(
        api: Arc<dyn MessagesApi>,
        model: impl Into<String>,
        max_tokens: usize,
        cache_dir: impl Into<PathBuf>,
        enabled: bool,
    ) -> Self {
        Self {
            api,
            model: model.into(),
            max_tokens,
            cache_dir: cache_dir.into(),
            enabled,
        }
    }

    pub fn cache_path(&self, skill_name: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.md", skill_name))
    }

    /// Summarize every skill in `store` except the meta-skill itself.
    /// Disabled summarization or a missing meta-skill leaves all content as is.
    pub async fn summarize_all(&self, store: &mut SkillStore, meta: Option<&Skill>) -> SummaryReport {
        let mut report = SummaryReport::default();
        if !self.enabled {
            tracing::info!("summarization disabled, using original skill content");
            return report;
        }
        let Some(meta) = meta else {
            tracing::warn!(skill = SUMMARIZER_SKILL_NAME, "summarizer skill not found, skipping summarization");
            return report;
        };
        if let Err(e) = fs::create_dir_all(&self.cache_dir) {
            tracing::warn!(path = %self.cache_dir.display(), error = %e, "cannot create summaries directory");
        }

        for skill in store.iter_mut() {
            if skill.name == meta.name || skill.summarized {
                continue;
            }
            match self.summarize_one(skill, &meta.content).await {
                SummaryOutcome::CacheHit => report.cache_hits += 1,
                SummaryOutcome::Summarized => report.summarized += 1,
                SummaryOutcome::Failed => report.failed += 1,
            }
        }
        tracing::info!(
            cache_hits = report.cache_hits,
            summarized = report.summarized,
            failed = report.failed,
            "skill summarization finished"
        );
        report
    }

    /// Replace `skill.content` with its cached or freshly generated summary.
    pub async fn summarize_one(&self, skill: &mut Skill, instructions: &str) -> SummaryOutcome {
        let path = self.cache_path(&skill.name);
        let marker = hash_marker(&content_hash(&skill.content));

        if let Some(cached) = read_cached(&path, &marker) {
            skill.apply_summary(cached);
            tracing::info!(skill = %skill.name, "loaded summary from cache");
            return SummaryOutcome::CacheHit;
        }

        tracing::info!(skill = %skill.name, "summarizing");
        let request = MessagesRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            system: vec![SystemBlock::text(instructions)],
            messages: vec![Message::user(skill.content.clone())],
            tools: Vec::new(),
        };
        let summary = match self.api.create(&request).await {
            Ok(resp) => resp
                .first_text()
                .map(String::from)
                .unwrap_or_else(|| skill.content.clone()),
            Err(e) => {
                tracing::warn!(skill = %skill.name, error = %e, "summarization failed, keeping original content");
                return SummaryOutcome::Failed;
            }
        };

        if let Err(e) = fs::write(&path, format!("{}\n{}", marker, summary)) {
            tracing::warn!(skill = %skill.name, path = %path.display(), error = %e, "cannot write summary cache");
        } else {
            tracing::debug!(skill = %skill.name, path = %path.display(), "summary cached");
        }
        skill.apply_summary(summary);
        SummaryOutcome::Summarized
    }
}

/// Cached body if the entry exists and its first line is exactly `marker`.
fn read_cached(path: &Path, marker: &str) -> Option<String> {
    let raw = fs::read_to_string(path).ok()?;
    let (first, rest) = raw.split_once('\n').unwrap_or((raw.as_str(), ""));
    (first == marker).then(|| rest.to_string())
}
