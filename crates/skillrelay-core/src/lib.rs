//! SkillRelay core: configuration, observability and the skill domain
//! (SKILL.md parsing, the skill store and credential resolution).

pub mod config;
pub mod observability;
pub mod skill;
