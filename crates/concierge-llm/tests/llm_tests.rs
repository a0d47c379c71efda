//! Tests for concierge-llm: message types, tool calls, and the OpenAI provider surface

use concierge_llm::*;

// ===========================================================================
// Role
// ===========================================================================

#[test]
fn role_serde_lowercase() {
    assert_eq!(serde_json::to_string(&Role::User).unwrap(), r#""user""#);
    assert_eq!(serde_json::to_string(&Role::Tool).unwrap(), r#""tool""#);
    let r: Role = serde_json::from_str(r#""assistant""#).unwrap();
    assert_eq!(r, Role::Assistant);
}

#[test]
fn role_as_str() {
    assert_eq!(Role::System.as_str(), "system");
    assert_eq!(Role::Assistant.as_str(), "assistant");
}

// ===========================================================================
// LlmMessage
// ===========================================================================

#[test]
fn message_constructors() {
    let m = LlmMessage::user("hello");
    assert_eq!(m.role, Role::User);
    assert_eq!(m.content, "hello");
    assert!(m.tool_calls.is_none());
    assert!(!m.has_tool_calls());

    let m = LlmMessage::tool_result("call-1", "result text");
    assert_eq!(m.role, Role::Tool);
    assert_eq!(m.tool_call_id.as_deref(), Some("call-1"));
}

#[test]
fn message_with_tool_calls() {
    let m = LlmMessage::assistant_with_tools(
        "",
        vec![ToolCall {
            id: "call-1".into(),
            name: "knowledge_search".into(),
            arguments: r#"{"query":"opening hours"}"#.into(),
        }],
    );
    assert!(m.has_tool_calls());
    assert_eq!(m.tool_calls.as_ref().unwrap()[0].name, "knowledge_search");
}

#[test]
fn message_serde_skips_empty_optionals() {
    let m = LlmMessage::user("hi");
    let json = serde_json::to_string(&m).unwrap();
    assert!(!json.contains("tool_calls"));
    assert!(!json.contains("tool_call_id"));
}

// ===========================================================================
// ToolCall
// ===========================================================================

#[test]
fn tool_call_parse_arguments() {
    let tc = ToolCall {
        id: "call-1".into(),
        name: "knowledge_search".into(),
        arguments: r#"{"query":"menu","match_count":3}"#.into(),
    };
    let args = tc.parse_arguments().unwrap();
    assert_eq!(args["query"], "menu");
    assert_eq!(args["match_count"], 3);
}

#[test]
fn tool_call_parse_arguments_invalid() {
    let tc = ToolCall {
        id: "call-1".into(),
        name: "knowledge_search".into(),
        arguments: "not json".into(),
    };
    assert!(tc.parse_arguments().is_err());
}

// ===========================================================================
// LlmRequest / LlmResponse
// ===========================================================================

#[test]
fn llm_request_default() {
    let req = LlmRequest::default();
    assert_eq!(req.model, "gpt-4o");
    assert!(req.messages.is_empty());
    assert!(req.tools.is_none());
    assert!(req.system.is_none());
}

#[test]
fn llm_response_accessors() {
    let resp = LlmResponse {
        message: LlmMessage::assistant("the answer"),
        stop_reason: Some("stop".into()),
        usage: Some(Usage {
            input_tokens: 10,
            output_tokens: 5,
        }),
    };
    assert_eq!(resp.text(), "the answer");
    assert!(resp.tool_calls().is_empty());

    let resp = LlmResponse {
        message: LlmMessage::assistant_with_tools(
            "",
            vec![ToolCall {
                id: "c1".into(),
                name: "knowledge_search".into(),
                arguments: "{}".into(),
            }],
        ),
        stop_reason: Some("tool_calls".into()),
        usage: None,
    };
    assert_eq!(resp.tool_calls().len(), 1);
}

// ===========================================================================
// OpenAiProvider
// ===========================================================================

#[test]
fn provider_name_and_models() {
    let p = OpenAiProvider::new("sk-test");
    assert_eq!(p.name(), "openai");
    assert!(p.supports_model("gpt-4o"));
    assert!(p.supports_model("gpt-4o-2024-08-06"));
    assert!(!p.supports_model("claude-3"));
}

// ===========================================================================
// LlmError
// ===========================================================================

#[test]
fn llm_error_display() {
    let e = LlmError::RequestFailed("500: boom".into());
    assert_eq!(e.to_string(), "request failed: 500: boom");

    let e = LlmError::RateLimited {
        retry_after_ms: 60_000,
    };
    assert!(e.to_string().contains("60000ms"));
}
