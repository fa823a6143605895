//! Tool abstractions shared by agents and providers

use compact_str::CompactString;
use schemars::Schema;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A tool the model may call
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Tool {
    /// The name of the tool
    pub name: CompactString,

    /// The description of the tool
    pub description: String,

    /// The parameters of the tool
    pub parameters: Schema,

    /// Whether to strictly validate the parameters
    pub strict: bool,
}

/// A tool call made by the model
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ToolCall {
    /// The ID of the tool call
    #[serde(default, skip_serializing_if = "CompactString::is_empty")]
    pub id: CompactString,

    /// The type of tool (currently only "function")
    #[serde(default, rename = "type")]
    pub call_type: CompactString,

    /// The function to call
    pub function: FunctionCall,
}

impl ToolCall {
    /// Create a function call with the given id, name and JSON arguments.
    pub fn function(
        id: impl Into<CompactString>,
        name: impl Into<CompactString>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            call_type: "function".into(),
            function: FunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            },
        }
    }
}

/// A function call within a tool call
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct FunctionCall {
    /// The name of the function to call
    #[serde(default, skip_serializing_if = "CompactString::is_empty")]
    pub name: CompactString,

    /// The arguments to pass to the function (JSON string)
    #[serde(default)]
    pub arguments: String,
}

/// Controls which tool is called by the model
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub enum ToolChoice {
    /// Model will not call any tool
    #[serde(rename = "none")]
    None,

    /// Model can pick between generating a message or calling tools
    #[serde(rename = "auto")]
    #[default]
    Auto,

    /// Model must call one or more tools
    #[serde(rename = "required")]
    Required,

    /// Model must call the specified function
    Function(CompactString),
}

impl From<&str> for ToolChoice {
    fn from(value: &str) -> Self {
        ToolChoice::Function(value.into())
    }
}

/// The outcome of one tool invocation.
pub type ToolOutput = Result<String, ToolError>;

/// What went wrong inside a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolErrorKind {
    /// The model sent arguments that do not match the tool's contract.
    InvalidArguments,
    /// A delegated agent failed terminally.
    Delegation,
    /// The delegation chain is already as deep as allowed.
    DepthExceeded,
    /// The tool itself failed while running.
    Execution,
    /// No tool with the requested name is in the catalog.
    Unavailable,
}

impl fmt::Display for ToolErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::InvalidArguments => "invalid arguments",
            Self::Delegation => "delegation failed",
            Self::DepthExceeded => "delegation depth exceeded",
            Self::Execution => "tool failed",
            Self::Unavailable => "tool unavailable",
        })
    }
}

/// A tagged tool failure.
///
/// Tools never fail the conversation they run in: the runtime renders the
/// error with [`Display`](fmt::Display) and hands it to the model as the
/// tool's output, keeping the kind available to callers that inspect
/// [`ToolOutput`] directly.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct ToolError {
    /// The failure category.
    pub kind: ToolErrorKind,
    /// Human (and model) readable description.
    pub message: String,
}

impl ToolError {
    /// Create a new tool error.
    pub fn new(kind: ToolErrorKind, message: impl fmt::Display) -> Self {
        Self {
            kind,
            message: message.to_string(),
        }
    }

    /// Arguments did not match the tool contract.
    pub fn invalid_arguments(message: impl fmt::Display) -> Self {
        Self::new(ToolErrorKind::InvalidArguments, message)
    }

    /// The tool failed while running.
    pub fn execution(message: impl fmt::Display) -> Self {
        Self::new(ToolErrorKind::Execution, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_error_renders_kind_and_message() {
        let err = ToolError::new(ToolErrorKind::Delegation, "upstream timed out");
        assert_eq!(err.to_string(), "delegation failed: upstream timed out");
    }

    #[test]
    fn tool_call_deserializes_openai_shape() {
        let json = r#"{"id":"call_1","type":"function","function":{"name":"ask_x","arguments":"{\"input\":\"hi\"}"}}"#;
        let call: ToolCall = serde_json::from_str(json).unwrap();
        assert_eq!(call, ToolCall::function("call_1", "ask_x", r#"{"input":"hi"}"#));
    }
}
