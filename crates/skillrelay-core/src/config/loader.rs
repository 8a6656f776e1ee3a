//! Environment loading helpers.
//!
//! Keeps the fallback chains in one place so business code never repeats
//! `env::var(..).or_else(..)` ladders.

use std::collections::HashMap;
use std::env;

/// Read-only key/value source for configuration lookups.
///
/// Skill interpolation and secret resolution go through this trait so they can
/// be driven from a plain map in tests instead of the process environment.
pub trait EnvLookup: Send + Sync {
    fn lookup(&self, key: &str) -> Option<String>;
}

/// The process environment (after `.env` loading). Empty values count as unset.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvLookup for ProcessEnv {
    fn lookup(&self, key: &str) -> Option<String> {
        env::var(key).ok().filter(|v| !v.is_empty())
    }
}

impl EnvLookup for HashMap<String, String> {
    fn lookup(&self, key: &str) -> Option<String> {
        self.get(key).filter(|v| !v.is_empty()).cloned()
    }
}

/// Load `.env` from the current directory into the environment (existing variables win).
pub fn load_dotenv() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let path = env::current_dir()
            .map(|d| d.join(".env"))
            .unwrap_or_else(|_| std::path::PathBuf::from(".env"));
        let Ok(content) = std::fs::read_to_string(&path) else {
            return;
        };
        for (key, value) in parse_dotenv(&content) {
            if env::var(&key).is_err() {
                env::set_var(&key, &value);
            }
        }
    });
}

/// Parse `.env` content into key/value pairs: skips comments and blank lines,
/// strips inline comments outside quotes and one level of surrounding quotes.
pub(crate) fn parse_dotenv(content: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some(eq_pos) = line.find('=') else {
            continue;
        };
        let key = line[..eq_pos].trim();
        let mut value = line[eq_pos + 1..].trim();
        if let Some(hash_pos) = value.find('#') {
            let before_hash = value[..hash_pos].trim_end();
            if !before_hash.contains('"') && !before_hash.contains('\'') {
                value = before_hash;
            }
        }
        if value.len() >= 2
            && ((value.starts_with('"') && value.ends_with('"'))
                || (value.starts_with('\'') && value.ends_with('\'')))
        {
            value = &value[1..value.len() - 1];
        }
        if !key.is_empty() {
            pairs.push((key.to_string(), value.to_string()));
        }
    }
    pairs
}

/// Read the primary key or the first alias that is set; fall back to `default`.
pub fn env_or<F>(primary: &str, aliases: &[&str], default: F) -> String
where
    F: FnOnce() -> String,
{
    env_optional(primary, aliases).unwrap_or_else(default)
}

/// Read the primary key or the first alias that is set (empty values are unset).
pub fn env_optional(primary: &str, aliases: &[&str]) -> Option<String> {
    std::iter::once(primary)
        .chain(aliases.iter().copied())
        .find_map(|key| {
            env::var(key)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        })
}

/// Boolean env var: 0/false/no/off are false, anything else set is true.
pub fn env_bool(primary: &str, aliases: &[&str], default: bool) -> bool {
    match env_optional(primary, aliases) {
        Some(s) => parse_bool(&s),
        None => default,
    }
}

/// Unsigned integer env var; unparseable values fall back to `default`.
pub fn env_usize(primary: &str, aliases: &[&str], default: usize) -> usize {
    env_optional(primary, aliases)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

pub(crate) fn parse_bool(s: &str) -> bool {
    !matches!(
        s.trim().to_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}

/// Split a comma-separated list, trimming entries and dropping empties.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
