//! Tests for the model client.

use super::*;
use crate::types::{Message, StopReason, SystemBlock};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request() -> MessagesRequest {
    MessagesRequest {
        model: "claude-sonnet-4-6".to_string(),
        max_tokens: 256,
        system: vec![SystemBlock::text("You are a skill selector.")],
        messages: vec![Message::user("hi")],
        tools: vec![],
    }
}

#[test]
fn test_extract_error_message() {
    let body = r#"{"type":"error","error":{"type":"rate_limit_error","message":"Number of requests exceeded"}}"#;
    assert_eq!(extract_error_message(body), "Number of requests exceeded");
    assert_eq!(extract_error_message(" upstream down \n"), "upstream down");
    assert_eq!(extract_error_message(""), "");
}

#[test]
fn test_messages_url_tolerates_v1_suffix() {
    let a = LlmClient::new("https://api.anthropic.com/", "k", None).unwrap();
    let b = LlmClient::new("https://proxy.test/v1", "k", None).unwrap();
    assert_eq!(a.messages_url(), "https://api.anthropic.com/v1/messages");
    assert_eq!(b.messages_url(), "https://proxy.test/v1/messages");
}

#[test]
fn test_request_serialization_omits_empty_tools() {
    let v = serde_json::to_value(request()).unwrap();
    assert_eq!(v["model"], "claude-sonnet-4-6");
    assert_eq!(v["max_tokens"], 256);
    assert!(v.get("tools").is_none());
    assert_eq!(v["system"][0]["type"], "text");
    assert_eq!(v["messages"][0]["content"][0]["text"], "hi");
}

#[tokio::test]
async fn test_create_sends_headers_and_parses_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "sk-test"))
        .and(header("anthropic-version", ANTHROPIC_VERSION))
        .and(body_partial_json(json!({"model": "claude-sonnet-4-6", "max_tokens": 256})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "msg_1",
            "type": "message",
            "role": "assistant",
            "model": "claude-sonnet-4-6",
            "content": [{"type": "text", "text": "[\"weather\"]"}],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 12, "output_tokens": 4, "cache_creation_input_tokens": 0, "cache_read_input_tokens": 0}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = LlmClient::new(&server.uri(), "sk-test", None).unwrap();
    let resp = client.create(&request()).await.unwrap();
    assert_eq!(resp.first_text(), Some("[\"weather\"]"));
    assert_eq!(resp.stop_reason, Some(StopReason::EndTurn));
    assert_eq!(resp.usage.input_tokens, 12);
}

#[tokio::test]
async fn test_create_maps_api_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "type": "error",
            "error": {"type": "rate_limit_error", "message": "slow down"}
        })))
        .mount(&server)
        .await;

    let client = LlmClient::new(&server.uri(), "sk-test", None).unwrap();
    let err = client.create(&request()).await.unwrap_err();
    assert_eq!(err.status(), Some(429));
    assert_eq!(err.detail(), "slow down");
}

#[tokio::test]
async fn test_create_reports_undecodable_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = LlmClient::new(&server.uri(), "sk-test", None).unwrap();
    let err = client.create(&request()).await.unwrap_err();
    assert!(matches!(err, LlmError::Decode(_)));
    assert_eq!(err.status(), None);
}
