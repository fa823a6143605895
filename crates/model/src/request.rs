//! OpenAI-compatible request body.
//!
//! Fields use `Option` + `skip_serializing_if` so parameters the agent did
//! not set are simply absent on the wire.

use dcore::{Message, ReasoningEffort, Tool, ToolChoice};
use serde::Serialize;
use serde_json::{Value, json};

/// OpenAI-compatible chat completions request body.
#[derive(Debug, Clone, Serialize)]
pub struct Request {
    /// The messages to send.
    pub messages: Vec<Message>,
    /// The model identifier.
    pub model: String,
    /// Reasoning controls (OpenRouter-specific).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<Value>,
    /// Temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Tool choice control.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<Value>,
    /// Tools the model may call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Value>,
    /// Top-p sampling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
}

impl Request {
    /// Set the tools for the request.
    fn with_tools(self, tools: Vec<Tool>) -> Self {
        let tools = tools
            .into_iter()
            .map(|tool| {
                json!({
                    "type": "function",
                    "function": json!(tool),
                })
            })
            .collect::<Vec<_>>();
        Self {
            tools: Some(json!(tools)),
            ..self
        }
    }

    /// Set the tool choice for the request.
    fn with_tool_choice(self, tool_choice: ToolChoice) -> Self {
        Self {
            tool_choice: match tool_choice {
                ToolChoice::None => Some(json!("none")),
                ToolChoice::Auto => Some(json!("auto")),
                ToolChoice::Required => Some(json!("required")),
                ToolChoice::Function(name) => Some(json!({
                    "type": "function",
                    "function": { "name": name }
                })),
            },
            ..self
        }
    }

    /// Ask for reasoning at the given effort, kept out of the answer.
    fn with_reasoning(self, effort: ReasoningEffort) -> Self {
        Self {
            reasoning: Some(json!({ "effort": effort.as_str(), "exclude": true })),
            ..self
        }
    }
}

impl From<dcore::Request> for Request {
    fn from(req: dcore::Request) -> Self {
        let mut wire = Self {
            messages: req.messages,
            model: req.model.to_string(),
            reasoning: None,
            temperature: req.temperature,
            tool_choice: None,
            tools: None,
            top_p: req.top_p,
        };

        if let Some(tools) = req.tools {
            wire = wire.with_tools(tools);
        }
        if let Some(tool_choice) = req.tool_choice {
            wire = wire.with_tool_choice(tool_choice);
        }
        if let Some(effort) = req.reasoning {
            wire = wire.with_reasoning(effort);
        }

        wire
    }
}
