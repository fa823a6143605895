//! Agent-as-tool delegation.
//!
//! [`expose`] and [`expose_structured`] register a sub-agent as a tool on a
//! parent agent. The parent's model then delegates by calling
//! `ask_<agent name>`. Delegation failures never escape the tool boundary:
//! they come back as tool output the parent's model can read.
//!
//! # Example
//!
//! ```rust,ignore
//! use delegate_runtime::bridge;
//!
//! let research = Arc::new(Agent::new(research_spec, model.clone(), &toolbox)?);
//! let descriptor = bridge::expose(research, &mut manager)?;
//! assert_eq!(descriptor.name, "ask_research_agent");
//! ```

use crate::{Agent, RegistryError};
use compact_str::CompactString;
use dcore::{AgentSpec, Model, Tool, ToolError, ToolErrorKind, ToolOutput};
use schemars::{JsonSchema, Schema};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::sync::Arc;

tokio::task_local! {
    /// Delegations currently open on this task.
    static DELEGATION_DEPTH: usize;
}

/// Maximum nesting of agent-as-tool calls.
pub const MAX_DEPTH: usize = 1;

/// Characters of a free-text answer kept in the delegation log.
const PREVIEW_CHARS: usize = 50;

/// How the delegated tool takes its argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Contract {
    /// A single `input` string.
    FreeText,
    /// A typed request object matching the schema.
    Structured(Schema),
}

/// A sub-agent as its parent sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDescriptor {
    /// `ask_<agent name>`, see [`AgentSpec::tool_name`].
    pub name: CompactString,
    /// The sub-agent's description.
    pub description: String,
    pub contract: Contract,
}

impl ToolDescriptor {
    pub fn free_text(spec: &AgentSpec) -> Self {
        Self {
            name: spec.tool_name(),
            description: spec.description.clone(),
            contract: Contract::FreeText,
        }
    }

    pub fn structured<T: JsonSchema>(spec: &AgentSpec) -> Self {
        Self {
            name: spec.tool_name(),
            description: spec.description.clone(),
            contract: Contract::Structured(schemars::schema_for!(T)),
        }
    }

    /// The tool definition offered to the parent's model.
    pub fn tool(&self) -> Tool {
        let (parameters, strict) = match &self.contract {
            Contract::FreeText => (schemars::schema_for!(DelegateInput), true),
            Contract::Structured(schema) => (schema.clone(), false),
        };
        Tool {
            name: self.name.clone(),
            description: self.description.clone(),
            parameters,
            strict,
        }
    }
}

/// Arguments of a free-text delegation tool.
#[derive(Deserialize, JsonSchema)]
struct DelegateInput {
    /// The task or question to delegate to this agent.
    input: String,
}

/// Extract the `input` field from free-text tool call arguments.
pub fn extract_input(arguments: &str) -> Result<String, ToolError> {
    serde_json::from_str::<DelegateInput>(arguments)
        .map(|args| args.input)
        .map_err(ToolError::invalid_arguments)
}

/// Expose `agent` on `parent` as a free-text tool.
pub fn expose<M: Model, P: Model>(
    agent: Arc<Agent<M>>,
    parent: &mut Agent<P>,
) -> Result<ToolDescriptor, RegistryError> {
    let descriptor = ToolDescriptor::free_text(agent.spec());
    parent.register(descriptor.tool(), move |args| {
        let agent = Arc::clone(&agent);
        async move {
            let input = extract_input(&args)?;
            let output = delegate(&agent, input).await;
            if let Ok(text) = &output {
                let preview = text.chars().take(PREVIEW_CHARS).collect::<String>();
                tracing::info!(agent = agent.name(), %preview, "delegation answered");
            }
            output
        }
    })?;
    Ok(descriptor)
}

/// Expose `agent` on `parent` as a tool taking a typed `T` request.
///
/// The arguments are validated by deserializing into `T`, then passed to the
/// sub-agent as canonical JSON text.
pub fn expose_structured<T, M, P>(
    agent: Arc<Agent<M>>,
    parent: &mut Agent<P>,
) -> Result<ToolDescriptor, RegistryError>
where
    T: JsonSchema + Serialize + DeserializeOwned + Send + 'static,
    M: Model,
    P: Model,
{
    let descriptor = ToolDescriptor::structured::<T>(agent.spec());
    parent.register(descriptor.tool(), move |args| {
        let agent = Arc::clone(&agent);
        async move {
            let request: T = serde_json::from_str(&args).map_err(|e| {
                tracing::warn!(agent = agent.name(), error = %e, "invalid delegation request");
                ToolError::invalid_arguments(e)
            })?;
            let input = serde_json::to_string(&request).map_err(ToolError::invalid_arguments)?;
            delegate(&agent, input).await
        }
    })?;
    Ok(descriptor)
}

/// Run the sub-agent one delegation level deeper.
async fn delegate<M: Model>(agent: &Agent<M>, input: String) -> ToolOutput {
    let depth = DELEGATION_DEPTH.try_with(|d| *d).unwrap_or(0);
    if depth >= MAX_DEPTH {
        tracing::warn!(agent = agent.name(), depth, "delegation depth exceeded");
        return Err(ToolError::new(
            ToolErrorKind::DepthExceeded,
            format!("'{}' cannot delegate more than {MAX_DEPTH} level deep", agent.name()),
        ));
    }

    DELEGATION_DEPTH
        .scope(depth + 1, agent.run(&input))
        .await
        .map_err(|e| {
            tracing::error!(agent = agent.name(), error = %e, "delegation failed");
            ToolError::new(ToolErrorKind::Delegation, e)
        })
}
