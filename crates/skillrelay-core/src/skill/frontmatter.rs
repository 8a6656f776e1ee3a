//! SKILL.md front matter: a `---`-delimited YAML block at the top of the file.

use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

/// Fields read from the front matter. Absent fields stay `None`.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct FrontMatter {
    #[serde(default)]
    pub description: Option<String>,

    /// Credential tokens the skill needs, e.g. `[API_KEY, WALLET_ADDRESS]`.
    #[serde(default)]
    pub secrets: Option<Vec<String>>,
}

/// A SKILL.md split into its front matter and markdown body.
#[derive(Debug, Clone, PartialEq)]
pub struct SkillDocument {
    /// `None` when the file has no front matter block, or the block is neither
    /// valid YAML nor has a recognisable `description:`/`secrets:` line.
    pub front_matter: Option<FrontMatter>,
    pub body: String,
}

impl SkillDocument {
    pub fn description(&self) -> Option<&str> {
        self.front_matter
            .as_ref()
            .and_then(|fm| fm.description.as_deref())
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }

    /// Declared secrets, trimmed with empties dropped. Empty when none are declared.
    pub fn declared_secrets(&self) -> Vec<String> {
        self.front_matter
            .as_ref()
            .and_then(|fm| fm.secrets.as_ref())
            .map(|list| {
                list.iter()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn front_matter_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)\A---[ \t]*\r?\n(.*?)\r?\n---[ \t]*(?:\r?\n|\z)")
            .expect("front matter regex is valid")
    })
}

/// Parse a SKILL.md. The front matter block is always stripped when present,
/// even if its YAML is malformed; leading whitespace of the body is trimmed.
pub fn parse_skill_document(raw: &str) -> SkillDocument {
    let Some(caps) = front_matter_re().captures(raw) else {
        return SkillDocument {
            front_matter: None,
            body: raw.trim_start().to_string(),
        };
    };
    let (whole, yaml) = match (caps.get(0), caps.get(1)) {
        (Some(w), Some(y)) => (w, y.as_str()),
        _ => {
            return SkillDocument {
                front_matter: None,
                body: raw.trim_start().to_string(),
            }
        }
    };
    let front_matter = if yaml.trim().is_empty() {
        Some(FrontMatter::default())
    } else {
        match serde_yaml::from_str::<FrontMatter>(yaml) {
            Ok(fm) => Some(fm),
            Err(e) => {
                let fallback = read_fields_by_line(yaml);
                if fallback.is_none() {
                    tracing::warn!(error = %e, "ignoring malformed SKILL.md front matter");
                } else {
                    tracing::debug!(error = %e, "front matter is not strict YAML, read line by line");
                }
                fallback
            }
        }
    };
    SkillDocument {
        front_matter,
        body: raw[whole.end()..].trim_start().to_string(),
    }
}

/// Lenient reader for front matter that strict YAML rejects, e.g. a plain
/// `description:` containing `: `. `description` is the rest of its line;
/// `secrets` is the `- item` list under `secrets:` (or an inline `[A, B]`).
fn read_fields_by_line(block: &str) -> Option<FrontMatter> {
    let mut fm = FrontMatter::default();
    let mut lines = block.lines().peekable();
    while let Some(line) = lines.next() {
        if line.starts_with(char::is_whitespace) {
            continue;
        }
        if let Some(rest) = line.strip_prefix("description:") {
            if fm.description.is_none() {
                fm.description = Some(unquote(rest.trim()).to_string());
            }
        } else if let Some(rest) = line.strip_prefix("secrets:") {
            let rest = rest.trim();
            let mut items = Vec::new();
            if let Some(inline) = rest.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
                items.extend(inline.split(',').map(|s| unquote(s.trim()).to_string()));
            }
            while let Some(next) = lines.peek() {
                let trimmed = next.trim();
                if let Some(item) = trimmed.strip_prefix('-') {
                    items.push(unquote(item.trim()).to_string());
                } else if !trimmed.is_empty() {
                    break;
                }
                lines.next();
            }
            fm.secrets = Some(items);
        }
    }
    if fm == FrontMatter::default() {
        None
    } else {
        Some(fm)
    }
}

fn unquote(s: &str) -> &str {
    if s.len() >= 2
        && ((s.starts_with('"') && s.ends_with('"'))
            || (s.starts_with('\'') && s.ends_with('\'')))
    {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_description_and_secrets() {
        let raw = "---\ndescription: Current weather by city\nsecrets:\n  - API_KEY\n  - ' REGION '\n---\n\n# Weather\nCall the API.\n";
        let doc = parse_skill_document(raw);
        assert_eq!(doc.description(), Some("Current weather by city"));
        assert_eq!(doc.declared_secrets(), vec!["API_KEY", "REGION"]);
        assert_eq!(doc.body, "# Weather\nCall the API.\n");
    }

    #[test]
    fn test_no_front_matter() {
        let doc = parse_skill_document("\n# Plain\nbody");
        assert!(doc.front_matter.is_none());
        assert_eq!(doc.description(), None);
        assert!(doc.declared_secrets().is_empty());
        assert_eq!(doc.body, "# Plain\nbody");
    }

    #[test]
    fn test_front_matter_without_fields() {
        let doc = parse_skill_document("---\nname: x\n---\nbody");
        assert_eq!(doc.front_matter, Some(FrontMatter::default()));
        assert_eq!(doc.description(), None);
        assert_eq!(doc.body, "body");
    }

    #[test]
    fn test_empty_front_matter_block() {
        let doc = parse_skill_document("---\n\n---\nbody");
        assert_eq!(doc.front_matter, Some(FrontMatter::default()));
        assert_eq!(doc.body, "body");
    }

    #[test]
    fn test_malformed_yaml_is_still_stripped() {
        let doc = parse_skill_document("---\n[unclosed\n---\nbody");
        assert!(doc.front_matter.is_none());
        assert_eq!(doc.body, "body");
    }

    #[test]
    fn test_colon_in_description_keeps_declared_secrets() {
        let raw = "---\ndescription: Uniswap: quotes and swaps\nsecrets:\n  - API_KEY\n---\nbody YOUR_OTHER_TOKEN";
        let doc = parse_skill_document(raw);
        assert_eq!(doc.description(), Some("Uniswap: quotes and swaps"));
        assert_eq!(doc.declared_secrets(), vec!["API_KEY"]);
        assert_eq!(doc.body, "body YOUR_OTHER_TOKEN");
    }

    #[test]
    fn test_line_fallback_reads_inline_secrets() {
        let doc = parse_skill_document("---\ndescription: 'Swaps: fast'\nsecrets: [API_KEY, \"WALLET\"]\nextra: a: b\n---\nbody");
        assert_eq!(doc.description(), Some("Swaps: fast"));
        assert_eq!(doc.declared_secrets(), vec!["API_KEY", "WALLET"]);
    }

    #[test]
    fn test_horizontal_rule_in_body_is_not_front_matter() {
        let raw = "# Title\n---\nnot: yaml\n---\n";
        let doc = parse_skill_document(raw);
        assert!(doc.front_matter.is_none());
        assert_eq!(doc.body, raw);
    }
}
