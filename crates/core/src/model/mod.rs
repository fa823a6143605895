//! Model gateway types and trait.
//!
//! Provides the shared types used between agents and LLM providers:
//! `Message`, `Request`, `Response`, `Tool`, and the `Model` trait.

pub use error::ModelError;
pub use message::{Message, Role};
pub use request::{ReasoningEffort, Request};
pub use response::{Choice, CompletionMeta, Delta, FinishReason, Response, Usage};
#[cfg(feature = "testing")]
pub use testing::ScriptedModel;
pub use tool::{FunctionCall, Tool, ToolCall, ToolChoice, ToolError, ToolErrorKind, ToolOutput};

mod error;
mod message;
mod request;
mod response;
#[cfg(feature = "testing")]
mod testing;
mod tool;

/// Unified model gateway trait.
///
/// Sends a conversation plus tool catalog to a remote provider and returns
/// either a final answer or a request to invoke tools. Constructors are
/// inherent methods on each provider, never called polymorphically.
pub trait Model: Clone + Send + Sync + 'static {
    /// Send a chat completion request.
    fn send(
        &self,
        request: &Request,
    ) -> impl Future<Output = Result<Response, ModelError>> + Send;
}
