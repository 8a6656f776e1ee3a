//! Skill selection: one small model call that picks skills from the manifest.

use serde_json::Value;

use skillrelay_core::skill::Manifest;

use crate::types::{Message, MessagesRequest, SystemBlock};

pub const SKILL_SELECTOR_SYSTEM: &str = "You are a skill selector. Given a user message and a list of available skills, \
respond ONLY with a JSON array of skill names that are needed to answer the request. \
If no skills are needed respond with an empty array []. \
Example: [\"swap-integration\"]";

pub const SELECTION_MAX_TOKENS: usize = 256;

pub(crate) fn selection_request(model: &str, manifest: &Manifest, user_message: &str) -> MessagesRequest {
    MessagesRequest {
        model: model.to_string(),
        max_tokens: SELECTION_MAX_TOKENS,
        system: vec![SystemBlock::text(SKILL_SELECTOR_SYSTEM)],
        messages: vec![Message::user(format!(
            "Available skills:\n{}\n\nUser message: {}",
            manifest.as_str(),
            user_message
        ))],
        tools: Vec::new(),
    }
}

/// Parse the selector's reply. Code fences are stripped; anything that is not
/// a JSON array selects nothing, and non-string elements are skipped.
pub fn parse_selection(text: &str) -> Vec<String> {
    let clean = strip_code_fence(text.trim());
    match serde_json::from_str::<Value>(clean) {
        Ok(Value::Array(items)) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        Ok(_) => {
            tracing::warn!(reply = %text, "skill selector reply is not an array");
            Vec::new()
        }
        Err(_) => {
            tracing::warn!(reply = %text, "skill selector returned unparseable response");
            Vec::new()
        }
    }
}

fn strip_code_fence(text: &str) -> &str {
    let mut s = text;
    if let Some(rest) = s.strip_prefix("```") {
        let rest = rest.strip_prefix("json").unwrap_or(rest);
        s = rest.strip_prefix('\n').unwrap_or(rest);
    }
    if let Some(rest) = s.strip_suffix("```") {
        s = rest.strip_suffix('\n').unwrap_or(rest);
    }
    s.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_and_fenced() {
        assert_eq!(parse_selection("[\"weather\"]"), vec!["weather"]);
        assert_eq!(
            parse_selection("```json\n[\"weather\", \"swap\"]\n```"),
            vec!["weather", "swap"]
        );
        assert_eq!(parse_selection("```\n[]\n```"), Vec::<String>::new());
        assert_eq!(parse_selection("  [\"a\"]  "), vec!["a"]);
    }

    #[test]
    fn test_parse_failures_select_nothing() {
        assert!(parse_selection("I think you need the weather skill").is_empty());
        assert!(parse_selection("{\"skills\": [\"weather\"]}").is_empty());
        assert!(parse_selection("\"weather\"").is_empty());
        assert!(parse_selection("").is_empty());
    }

    #[test]
    fn test_non_string_elements_are_skipped() {
        assert_eq!(parse_selection("[\"weather\", 3, null, {\"x\": 1}, \"swap\"]"), vec!["weather", "swap"]);
    }

    #[test]
    fn test_selection_request_shape() {
        let manifest = Manifest::Listing("- weather: Weather by city".into());
        let req = selection_request("claude-sonnet-4-6", &manifest, "rain in Paris?");
        assert_eq!(req.max_tokens, 256);
        assert!(req.tools.is_empty());
        assert_eq!(req.system[0].as_text(), SKILL_SELECTOR_SYSTEM);
        assert_eq!(
            req.messages[0],
            Message::user("Available skills:\n- weather: Weather by city\n\nUser message: rain in Paris?")
        );
    }
}
