//! Core abstractions for the delegate agent runtime.
//!
//! Provides the shared vocabulary used across the workspace: the
//! [`AgentSpec`] configuration value, the [`Model`] gateway trait with its
//! request/response types, tool schemas and the tagged [`ToolError`], and
//! the [`RetryPolicy`] backoff primitive.

pub use agent::AgentSpec;
pub use model::{
    FunctionCall, Message, Model, ModelError, ReasoningEffort, Request, Response, Role, Tool,
    ToolCall, ToolChoice, ToolError, ToolErrorKind, ToolOutput,
};
pub use retry::{RetryError, RetryPolicy};

mod agent;
pub mod model;
pub mod retry;
