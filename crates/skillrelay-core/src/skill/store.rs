//! SkillStore: loads skill directories and splits them into system skills
//! (always injected) and selectable skills (offered to the selector).

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use super::frontmatter::parse_skill_document;
use super::Skill;
use crate::config::EnvLookup;

pub const SKILL_FILE_NAME: &str = "SKILL.md";

/// Text sent in place of a manifest when nothing is selectable.
pub const NO_SKILLS_MANIFEST: &str = "No skills available.";

/// Selectable-skill listing for the selection call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Manifest {
    /// Nothing is selectable; selection is skipped.
    Empty,
    /// `- name: description` lines in load order.
    Listing(String),
}

impl Manifest {
    pub fn as_str(&self) -> &str {
        match self {
            Manifest::Empty => NO_SKILLS_MANIFEST,
            Manifest::Listing(s) => s,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Manifest::Empty)
    }
}

/// Skill collections. Populated at startup, read-only afterwards.
#[derive(Debug, Default, Clone)]
pub struct SkillStore {
    system: Vec<Skill>,
    selectable: Vec<Skill>,
}

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{([A-Z0-9_]+)\}\}").expect("placeholder regex is valid"))
}

/// Replace `{{TOKEN}}` with the configured value of `TOKEN`; unknown tokens stay verbatim.
pub(crate) fn interpolate(content: &str, env: &dyn EnvLookup) -> String {
    placeholder_re()
        .replace_all(content, |caps: &regex::Captures| {
            env.lookup(&caps[1]).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

impl SkillStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `<dir>/<name>/SKILL.md` under `dir` as a selectable skill named `<name>`.
    /// Subdirectories are visited in name order. A missing or unreadable root is
    /// logged and skipped. Returns the number of skills loaded.
    pub fn load_from_directory(&mut self, dir: &Path, env: &dyn EnvLookup) -> usize {
        if !dir.is_dir() {
            tracing::warn!(path = %dir.display(), "skills directory not found, skipping");
            return 0;
        }
        let entries = match fs::read_dir(dir) {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!(path = %dir.display(), error = %e, "cannot read skills directory");
                return 0;
            }
        };
        let mut skill_dirs: Vec<_> = entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.is_dir() && p.join(SKILL_FILE_NAME).is_file())
            .collect();
        skill_dirs.sort();

        let mut loaded = 0;
        for skill_dir in skill_dirs {
            let Some(name) = skill_dir.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let skill_file = skill_dir.join(SKILL_FILE_NAME);
            let raw = match fs::read_to_string(&skill_file) {
                Ok(s) => s,
                Err(e) => {
                    tracing::warn!(path = %skill_file.display(), error = %e, "cannot read skill file");
                    continue;
                }
            };
            self.insert(parse_skill(name, &raw, env));
            loaded += 1;
        }
        tracing::debug!(path = %dir.display(), loaded, "skills directory loaded");
        loaded
    }

    /// Add a selectable skill. A skill with the same name is replaced in place.
    pub fn insert(&mut self, skill: Skill) {
        let existing = self
            .system
            .iter_mut()
            .chain(self.selectable.iter_mut())
            .find(|s| s.name == skill.name);
        match existing {
            Some(slot) => {
                tracing::warn!(skill = %skill.name, "duplicate skill name, later definition wins");
                *slot = skill;
            }
            None => self.selectable.push(skill),
        }
    }

    /// Move a selectable skill into the system collection. No-op when absent.
    pub fn promote(&mut self, name: &str) -> bool {
        let Some(pos) = self.selectable.iter().position(|s| s.name == name) else {
            return false;
        };
        let skill = self.selectable.remove(pos);
        self.system.push(skill);
        true
    }

    /// Remove a skill from whichever collection holds it.
    pub fn take(&mut self, name: &str) -> Option<Skill> {
        if let Some(pos) = self.system.iter().position(|s| s.name == name) {
            return Some(self.system.remove(pos));
        }
        let pos = self.selectable.iter().position(|s| s.name == name)?;
        Some(self.selectable.remove(pos))
    }

    pub fn build_manifest(&self) -> Manifest {
        if self.selectable.is_empty() {
            return Manifest::Empty;
        }
        Manifest::Listing(
            self.selectable
                .iter()
                .map(|s| format!("- {}: {}", s.name, s.description))
                .collect::<Vec<_>>()
                .join("\n"),
        )
    }

    /// System skills followed by the selected ones, each group in load order.
    /// Names that are not selectable are dropped.
    pub fn skills_for_prompt<S: AsRef<str>>(&self, selected: &[S]) -> Vec<&Skill> {
        let wanted: HashSet<&str> = selected.iter().map(AsRef::as_ref).collect();
        self.system
            .iter()
            .chain(self.selectable.iter().filter(|s| wanted.contains(s.name.as_str())))
            .collect()
    }

    pub fn system(&self) -> &[Skill] {
        &self.system
    }

    pub fn selectable(&self) -> &[Skill] {
        &self.selectable
    }

    /// All skills, system first.
    pub fn iter(&self) -> impl Iterator<Item = &Skill> {
        self.system.iter().chain(self.selectable.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Skill> {
        self.system.iter_mut().chain(self.selectable.iter_mut())
    }

    pub fn get(&self, name: &str) -> Option<&Skill> {
        self.iter().find(|s| s.name == name)
    }

    pub fn is_system(&self, name: &str) -> bool {
        self.system.iter().any(|s| s.name == name)
    }

    pub fn len(&self) -> usize {
        self.system.len() + self.selectable.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn parse_skill(name: &str, raw: &str, env: &dyn EnvLookup) -> Skill {
    let doc = parse_skill_document(raw);
    let description = doc.description().unwrap_or_default().to_string();
    let secrets = doc.declared_secrets();
    Skill::new(name, description, interpolate(&doc.body, env)).with_secrets(secrets)
}
