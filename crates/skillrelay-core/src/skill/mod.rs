//! Skills: instruction bundles loaded from `SKILL.md` files, plus the
//! credentials they reference.

mod frontmatter;
mod secrets;
mod store;

pub use frontmatter::{parse_skill_document, FrontMatter, SkillDocument};
pub use secrets::{
    scan_tokens, to_env_key, tokens_for, SecretAudit, SecretBinding, SkillAuditEntry, TokenSource,
    TokenStatus,
};
pub use store::{Manifest, SkillStore, NO_SKILLS_MANIFEST, SKILL_FILE_NAME};

use std::collections::BTreeSet;

/// A loaded skill. `content` is rewritten at most once, by the summarizer,
/// before any prompt reads it.
#[derive(Debug, Clone, PartialEq)]
pub struct Skill {
    pub name: String,
    pub description: String,
    pub content: String,
    /// Tokens declared in front matter `secrets:`. Empty means "scan the body".
    pub required_secrets: BTreeSet<String>,
    pub summarized: bool,
}

impl Skill {
    pub fn new(name: impl Into<String>, description: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            content: content.into(),
            required_secrets: BTreeSet::new(),
            summarized: false,
        }
    }

    pub fn with_secrets<I, S>(mut self, secrets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_secrets = secrets.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the body with its condensed form. Returns false (and leaves the
    /// skill untouched) if it was already summarized.
    pub fn apply_summary(&mut self, summary: String) -> bool {
        if self.summarized {
            return false;
        }
        self.content = summary;
        self.summarized = true;
        true
    }
}
