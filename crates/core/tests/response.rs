//! Tests for response parsing.

use delegate_core::model::FinishReason;
use delegate_core::{Message, Response, ToolCall};

const TEXT_RESPONSE: &str = r#"{
  "id": "gen-1",
  "object": "chat.completion",
  "created": 1735689600,
  "model": "openai/gpt-4o",
  "choices": [
    {
      "index": 0,
      "message": { "role": "assistant", "content": "Paris." },
      "finish_reason": "stop"
    }
  ],
  "usage": { "prompt_tokens": 12, "completion_tokens": 2, "total_tokens": 14 }
}"#;

const TOOL_RESPONSE: &str = r#"{
  "id": "gen-2",
  "choices": [
    {
      "message": {
        "role": "assistant",
        "content": null,
        "tool_calls": [
          {
            "id": "call_7",
            "type": "function",
            "function": { "name": "ask_research_agent", "arguments": "{\"input\":\"capital of France\"}" }
          }
        ]
      },
      "finish_reason": "tool_calls"
    }
  ]
}"#;

#[test]
fn parse_text_response() {
    let response: Response = serde_json::from_str(TEXT_RESPONSE).unwrap();
    assert_eq!(response.content().map(String::as_str), Some("Paris."));
    assert_eq!(response.reason(), Some(&FinishReason::Stop));
    assert_eq!(response.usage.total_tokens, 14);
    assert!(response.message().unwrap().tool_calls.is_empty());
}

#[test]
fn parse_tool_call_response_without_usage() {
    let response: Response = serde_json::from_str(TOOL_RESPONSE).unwrap();
    let message = response.message().unwrap();
    assert!(message.content.is_empty());
    assert_eq!(
        message.tool_calls[0],
        ToolCall::function(
            "call_7",
            "ask_research_agent",
            r#"{"input":"capital of France"}"#
        )
    );
    assert_eq!(response.usage.total_tokens, 0);
}

#[test]
fn from_message_sets_finish_reason() {
    let calls = [ToolCall::function("c1", "current_date", "{}")];
    let tool = Response::from_message(Message::assistant("", Some(&calls)));
    assert_eq!(tool.reason(), Some(&FinishReason::ToolCalls));
    assert_eq!(tool.tool_calls().unwrap().len(), 1);

    let text = Response::from_message(Message::assistant("done", None));
    assert_eq!(text.reason(), Some(&FinishReason::Stop));
    assert!(text.tool_calls().is_none());
}
