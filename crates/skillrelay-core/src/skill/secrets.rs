//! Credential resolution for skills.
//!
//! A skill's tokens come from its declared `secrets:` list when present, or
//! else from scanning its body for common placeholder idioms. Each token is
//! looked up under `<SKILL>_<TOKEN>` (see [`to_env_key`]).

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt::Write as _;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use super::{Skill, SkillStore};
use crate::config::EnvLookup;

/// Where a skill's token list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenSource {
    Declared,
    Scanned,
}

fn scan_patterns() -> &'static [Regex] {
    static RES: OnceLock<Vec<Regex>> = OnceLock::new();
    RES.get_or_init(|| {
        [
            r"(?i)YOUR[_-]([A-Z0-9_-]+)",
            r"(?i)<your[_-]([a-z0-9_-]+)>",
            r"(?i)<([A-Z][A-Z0-9_-]*(?:key|token|secret|api|pass|credential|bearer))>",
            r"(?i)\{([A-Z][A-Z0-9_-]*(?:key|token|secret|api|pass|credential|bearer))\}",
            r"\{\{([A-Z0-9_]+)\}\}",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("secret scan regex is valid"))
        .collect()
    })
}

/// Find placeholder tokens in a skill body: `YOUR_X`, `<your_x>`, `<X_KEY>`,
/// `{X_KEY}` and `{{TOKEN}}`.
pub fn scan_tokens(content: &str) -> BTreeSet<String> {
    scan_patterns()
        .iter()
        .flat_map(|re| re.captures_iter(content))
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

/// Env key for a skill token: `UPPER(skill)_UPPER(token)` with a leading
/// `your_`/`your-` dropped from the token and non-alphanumerics mapped to `_`.
pub fn to_env_key(skill_name: &str, token: &str) -> String {
    fn normalize(s: &str) -> String {
        s.to_uppercase()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect()
    }
    let token = strip_your_prefix(token);
    format!("{}_{}", normalize(skill_name), normalize(token))
}

fn strip_your_prefix(token: &str) -> &str {
    let bytes = token.as_bytes();
    if bytes.len() >= 5 && bytes[..4].eq_ignore_ascii_case(b"your") && matches!(bytes[4], b'_' | b'-') {
        &token[5..]
    } else {
        token
    }
}

/// Tokens to resolve for `skill`. Declared secrets win; the body is only
/// scanned when nothing is declared.
pub fn tokens_for(skill: &Skill) -> (TokenSource, BTreeSet<String>) {
    if skill.required_secrets.is_empty() {
        (TokenSource::Scanned, scan_tokens(&skill.content))
    } else {
        (TokenSource::Declared, skill.required_secrets.clone())
    }
}

/// Resolved credentials per skill: `skill -> (token -> value)`.
#[derive(Debug, Default, Clone)]
pub struct SecretBinding {
    by_skill: HashMap<String, BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenStatus {
    pub token: String,
    pub env_key: String,
    pub resolved: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkillAuditEntry {
    pub name: String,
    pub description: String,
    pub system: bool,
    pub source: TokenSource,
    pub tokens: Vec<TokenStatus>,
}

impl SkillAuditEntry {
    pub fn resolved_count(&self) -> usize {
        self.tokens.iter().filter(|t| t.resolved).count()
    }
}

/// Required vs. resolved tokens for every skill, produced once at startup.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SecretAudit {
    pub skills: Vec<SkillAuditEntry>,
}

impl SecretBinding {
    /// Resolve every skill's tokens against `env`. Run once, after loading and
    /// summarization, since scanned tokens depend on final content.
    pub fn resolve(store: &SkillStore, env: &dyn EnvLookup) -> (Self, SecretAudit) {
        let mut by_skill = HashMap::new();
        let mut audit = SecretAudit::default();

        for skill in store.iter() {
            let (source, tokens) = tokens_for(skill);
            let mut resolved = BTreeMap::new();
            let mut statuses = Vec::with_capacity(tokens.len());

            for token in tokens {
                let env_key = to_env_key(&skill.name, &token);
                let value = env.lookup(&env_key);
                match &value {
                    Some(_) => tracing::debug!(skill = %skill.name, token = %token, env_key = %env_key, "secret resolved"),
                    None => tracing::warn!(skill = %skill.name, token = %token, env_key = %env_key, "secret not set"),
                }
                statuses.push(TokenStatus {
                    token: token.clone(),
                    env_key,
                    resolved: value.is_some(),
                });
                if let Some(v) = value {
                    resolved.insert(token, v);
                }
            }

            by_skill.insert(skill.name.clone(), resolved);
            audit.skills.push(SkillAuditEntry {
                name: skill.name.clone(),
                description: skill.description.clone(),
                system: store.is_system(&skill.name),
                source,
                tokens: statuses,
            });
        }

        (Self { by_skill }, audit)
    }

    /// Resolved `token -> value` pairs for a skill; empty when none resolved.
    pub fn get(&self, skill_name: &str) -> &BTreeMap<String, String> {
        static EMPTY: BTreeMap<String, String> = BTreeMap::new();
        self.by_skill.get(skill_name).unwrap_or(&EMPTY)
    }
}

impl SecretAudit {
    /// Human-readable table for startup logs and `skillrelay skills`.
    pub fn render(&self) -> String {
        let mut out = String::from("=== Skills Loaded ===\n");
        for entry in &self.skills {
            let kind = if entry.system { " (system)" } else { "" };
            let source = match entry.source {
                TokenSource::Declared => "declared",
                TokenSource::Scanned => "scanned",
            };
            let description = if entry.description.is_empty() {
                "(none)"
            } else {
                entry.description.as_str()
            };
            let _ = writeln!(out, "  {}{}", entry.name, kind);
            let _ = writeln!(out, "    description : {}", description);
            let _ = writeln!(
                out,
                "    secrets     : {} required ({}), {} resolved",
                entry.tokens.len(),
                source,
                entry.resolved_count()
            );
            for t in &entry.tokens {
                let mark = if t.resolved { "✓" } else { "✗" };
                let _ = writeln!(out, "      {} {}", mark, t.env_key);
            }
        }
        out.push_str("=====================");
        out
    }

    pub fn log(&self) {
        let required: usize = self.skills.iter().map(|s| s.tokens.len()).sum();
        let resolved: usize = self.skills.iter().map(|s| s.resolved_count()).sum();
        tracing::info!(
            skills = self.skills.len(),
            required,
            resolved,
            "\n{}",
            self.render()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_to_env_key() {
        assert_eq!(to_env_key("weather", "API_KEY"), "WEATHER_API_KEY");
        assert_eq!(to_env_key("swap-integration", "your_api_key"), "SWAP_INTEGRATION_API_KEY");
        assert_eq!(to_env_key("swap-integration", "YOUR-Wallet"), "SWAP_INTEGRATION_WALLET");
        assert_eq!(to_env_key("x", "yourkey"), "X_YOURKEY");
        assert_eq!(to_env_key("x", "you"), "X_YOU");
        assert_eq!(to_env_key("a.b", "c d"), to_env_key("a.b", "c d"));
    }

    #[test]
    fn test_scan_tokens_recognizes_idioms() {
        let body = "Send YOUR_API_KEY in header. Or <your-wallet>. Or <ACCESS_TOKEN>. \
                    Or {CLIENT_SECRET}. Or {{CUSTOM_ID}}. Not <div> or {name}.";
        let tokens = scan_tokens(body);
        let expected: BTreeSet<String> = ["API_KEY", "wallet", "ACCESS_TOKEN", "CLIENT_SECRET", "CUSTOM_ID"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(tokens, expected);
    }

    #[test]
    fn test_declared_secrets_skip_scan() {
        let mut store = SkillStore::new();
        store.insert(
            Skill::new("weather", "Weather", "Use YOUR_OTHER_TOKEN and {{ALSO_THIS}}")
                .with_secrets(["API_KEY"]),
        );
        let (binding, audit) = SecretBinding::resolve(
            &store,
            &env(&[("WEATHER_API_KEY", "abc123"), ("WEATHER_OTHER_TOKEN", "zzz")]),
        );

        let secrets = binding.get("weather");
        assert_eq!(secrets.len(), 1);
        assert_eq!(secrets.get("API_KEY").map(String::as_str), Some("abc123"));

        let entry = &audit.skills[0];
        assert_eq!(entry.source, TokenSource::Declared);
        assert_eq!(entry.tokens.len(), 1);
        assert_eq!(entry.tokens[0].env_key, "WEATHER_API_KEY");
    }

    #[test]
    fn test_scanned_secrets_and_missing_values() {
        let mut store = SkillStore::new();
        store.insert(Skill::new("swap", "", "Authorization: Bearer YOUR_API_KEY, wallet <your_wallet>"));
        let (binding, audit) = SecretBinding::resolve(&store, &env(&[("SWAP_API_KEY", "k1")]));

        let secrets = binding.get("swap");
        assert_eq!(secrets.get("API_KEY").map(String::as_str), Some("k1"));
        assert!(!secrets.contains_key("wallet"));

        let entry = &audit.skills[0];
        assert_eq!(entry.source, TokenSource::Scanned);
        assert_eq!(entry.tokens.len(), 2);
        assert_eq!(entry.resolved_count(), 1);
        assert!(audit.render().contains("✗ SWAP_WALLET"));
    }

    #[test]
    fn test_get_unknown_skill_is_empty() {
        let binding = SecretBinding::default();
        assert!(binding.get("nope").is_empty());
    }
}
