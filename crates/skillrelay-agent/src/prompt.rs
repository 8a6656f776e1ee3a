//! System prompt assembly.
//!
//! The prompt is two blocks: a fixed preamble, then one documentation block
//! covering every system skill and every selected skill. The documentation
//! block is marked cache-eligible since it repeats across the rounds of one
//! chat call.

use std::collections::BTreeMap;

use skillrelay_core::skill::{SecretBinding, Skill, SkillStore};

use crate::types::SystemBlock;

pub const AGENT_SYSTEM_PREAMBLE: &str = "You are an autonomous AI agent.\n\
Use the http_request tool to execute any API calls required by the skills below.\n\
Follow the skill instructions exactly for authentication, endpoints, and payloads.";

pub const SECRETS_BLOCK_HEADER: &str = "### Resolved credentials";

const SKILL_SEPARATOR: &str = "\n\n---\n\n";

/// Build the system prompt for `system ∪ selected`. Unknown selected names are
/// dropped. With no skills at all the prompt is empty.
pub fn build_system_prompt<S: AsRef<str>>(
    store: &SkillStore,
    secrets: &SecretBinding,
    selected: &[S],
) -> Vec<SystemBlock> {
    let skills = store.skills_for_prompt(selected);
    if skills.is_empty() {
        return Vec::new();
    }

    let docs = skills
        .iter()
        .map(|s| render_skill_doc(s, secrets.get(&s.name)))
        .collect::<Vec<_>>()
        .join(SKILL_SEPARATOR);

    vec![
        SystemBlock::text(AGENT_SYSTEM_PREAMBLE),
        SystemBlock::cached(docs),
    ]
}

fn render_skill_doc(skill: &Skill, secrets: &BTreeMap<String, String>) -> String {
    format!(
        "## Skill: {}\n{}\n{}",
        skill.name,
        render_secrets_block(secrets),
        skill.content
    )
}

fn render_secrets_block(secrets: &BTreeMap<String, String>) -> String {
    if secrets.is_empty() {
        return String::new();
    }
    let lines = secrets
        .iter()
        .map(|(placeholder, value)| format!("- {}: `{}`", placeholder, value))
        .collect::<Vec<_>>()
        .join("\n");
    let placeholders = secrets.keys().map(String::as_str).collect::<Vec<_>>().join(", ");
    format!(
        "{}\n{}\nUse these values wherever the skill references {}. Never ask the user for them.\n",
        SECRETS_BLOCK_HEADER, lines, placeholders
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn store() -> SkillStore {
        let mut store = SkillStore::new();
        store.insert(Skill::new("response-format", "Reply format", "Answer in markdown."));
        store.insert(Skill::new("weather", "Weather by city", "GET /weather?key=API_KEY").with_secrets(["API_KEY"]));
        store.insert(Skill::new("swap", "Token swaps", "POST /swap"));
        store.promote("response-format");
        store
    }

    fn binding(store: &SkillStore) -> SecretBinding {
        let env: HashMap<String, String> =
            [("WEATHER_API_KEY".to_string(), "abc123".to_string())].into_iter().collect();
        SecretBinding::resolve(store, &env).0
    }

    #[test]
    fn test_prompt_has_preamble_and_cached_docs() {
        let store = store();
        let blocks = build_system_prompt(&store, &binding(&store), &["weather"]);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].as_text(), AGENT_SYSTEM_PREAMBLE);
        assert!(!blocks[0].is_cached());
        assert!(blocks[1].is_cached());

        let docs = blocks[1].as_text();
        assert_eq!(
            docs,
            "## Skill: response-format\n\nAnswer in markdown.\n\n---\n\n\
             ## Skill: weather\n### Resolved credentials\n- API_KEY: `abc123`\n\
             Use these values wherever the skill references API_KEY. Never ask the user for them.\n\n\
             GET /weather?key=API_KEY"
        );
    }

    #[test]
    fn test_unknown_selection_is_dropped() {
        let store = store();
        let blocks = build_system_prompt(&store, &binding(&store), &["ghost"]);
        let docs = blocks[1].as_text();
        assert!(docs.contains("## Skill: response-format"));
        assert!(!docs.contains("ghost"));
        assert!(!docs.contains("## Skill: swap"));
    }

    #[test]
    fn test_no_skills_means_empty_prompt() {
        let store = SkillStore::new();
        let blocks = build_system_prompt::<&str>(&store, &SecretBinding::default(), &[]);
        assert!(blocks.is_empty());
    }
}
