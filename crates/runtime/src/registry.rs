//! Tool registry: name → (schema, handler), built once per agent.

use compact_str::CompactString;
use dcore::{Message, Tool, ToolCall, ToolError, ToolErrorKind, ToolOutput};
use std::{future::Future, pin::Pin, sync::Arc};
use thiserror::Error;

/// A type-erased async tool handler.
pub type Handler =
    Arc<dyn Fn(String) -> Pin<Box<dyn Future<Output = ToolOutput> + Send>> + Send + Sync>;

/// Catalog construction errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("tool '{0}' is already registered")]
    Duplicate(CompactString),

    #[error("tool '{0}' is not registered")]
    Unknown(CompactString),
}

/// An ordered tool catalog with unique names.
///
/// Insertion order is catalog order: tools are offered to the model in the
/// order they were registered.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    entries: Vec<(Tool, Handler)>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool with its handler. Rejects a name already present.
    pub fn register<F, Fut>(&mut self, tool: Tool, handler: F) -> Result<(), RegistryError>
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ToolOutput> + Send + 'static,
    {
        let handler: Handler = Arc::new(move |args| Box::pin(handler(args)));
        self.insert(tool, handler)
    }

    /// Register an already type-erased handler.
    pub fn insert(&mut self, tool: Tool, handler: Handler) -> Result<(), RegistryError> {
        if self.contains(&tool.name) {
            return Err(RegistryError::Duplicate(tool.name));
        }
        self.entries.push((tool, handler));
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    fn get(&self, name: &str) -> Option<&(Tool, Handler)> {
        self.entries.iter().find(|(tool, _)| tool.name == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tool names in catalog order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(tool, _)| tool.name.as_str())
    }

    /// Tool schemas in catalog order.
    pub fn tools(&self) -> Vec<Tool> {
        self.entries.iter().map(|(tool, _)| tool.clone()).collect()
    }

    /// Build the sub-catalog for the given names, in the given order.
    pub fn resolve(&self, names: &[CompactString]) -> Result<Self, RegistryError> {
        let mut resolved = Self::new();
        for name in names {
            let (tool, handler) = self
                .get(name)
                .ok_or_else(|| RegistryError::Unknown(name.clone()))?;
            resolved.insert(tool.clone(), Arc::clone(handler))?;
        }
        Ok(resolved)
    }

    /// Dispatch tool calls in order and collect results as tool messages.
    ///
    /// Handler errors and unknown tools become result text; nothing here
    /// fails the calling agent.
    pub async fn dispatch(&self, calls: &[ToolCall]) -> Vec<Message> {
        let mut results = Vec::with_capacity(calls.len());
        for call in calls {
            let name = call.function.name.as_str();
            let output = match self.get(name) {
                Some((_, handler)) => handler(call.function.arguments.clone()).await,
                None => {
                    tracing::warn!(tool = name, "model called an unregistered tool");
                    Err(ToolError::new(
                        ToolErrorKind::Unavailable,
                        format!("function {name} not available"),
                    ))
                }
            };
            let output = output.unwrap_or_else(|e| {
                if e.kind != ToolErrorKind::Unavailable {
                    tracing::warn!(tool = name, error = %e, "tool call failed");
                }
                e.to_string()
            });
            results.push(Message::tool(output, call.id.clone()));
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn echo_tool(name: &str) -> Tool {
        Tool {
            name: name.into(),
            description: "Echoes the input".into(),
            parameters: schemars::schema_for!(String),
            strict: false,
        }
    }

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry
            .register(echo_tool("echo"), |args| async move { Ok(format!("got: {args}")) })
            .unwrap();
        registry
            .register(echo_tool("broken"), |_| async move {
                Err(ToolError::execution("disk full"))
            })
            .unwrap();
        registry
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut registry = registry();
        let err = registry
            .register(echo_tool("echo"), |args| async move { Ok(args) })
            .unwrap_err();
        assert_eq!(err, RegistryError::Duplicate("echo".into()));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn resolve_keeps_requested_order() {
        let resolved = registry()
            .resolve(&["broken".into(), "echo".into()])
            .unwrap();
        assert_eq!(resolved.names().collect::<Vec<_>>(), ["broken", "echo"]);
    }

    #[test]
    fn resolve_rejects_unknown() {
        let err = registry().resolve(&["missing".into()]).err();
        assert_eq!(err, Some(RegistryError::Unknown("missing".into())));
    }

    #[tokio::test]
    async fn dispatch_renders_results_and_errors() {
        let calls = [
            ToolCall::function("call_1", "echo", "hello"),
            ToolCall::function("call_2", "broken", "{}"),
            ToolCall::function("call_3", "missing", "{}"),
        ];
        let results = registry().dispatch(&calls).await;
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].content, "got: hello");
        assert_eq!(results[0].tool_call_id, "call_1");
        assert_eq!(results[1].content, "tool failed: disk full");
        assert_eq!(
            results[2].content,
            "tool unavailable: function missing not available"
        );
        assert_eq!(results[2].tool_call_id, "call_3");
    }
}
