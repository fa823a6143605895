//! Agent specification.
//!
//! An [`AgentSpec`] is pure config: name, model, system prompt, description
//! and the names of the tools it may call. Tool handlers and the model
//! gateway live in the runtime.

use compact_str::CompactString;
use smallvec::SmallVec;

/// An agent specification.
///
/// Specs are portable: they describe *what* an agent is but not *how*
/// its tool calls are dispatched. The runtime resolves the tool names
/// against its registry when the agent is built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentSpec {
    /// Agent identifier, also the source of its delegation tool name.
    pub name: CompactString,
    /// Model identifier sent with every request of this agent.
    pub model: CompactString,
    /// Human-readable description (shown as tool description when delegated to).
    pub description: String,
    /// System prompt sent before each conversation.
    pub system_prompt: String,
    /// Names of tools this agent can use, in catalog order.
    pub tools: SmallVec<[CompactString; 4]>,
}

impl AgentSpec {
    /// Create a new spec with the given name.
    pub fn new(name: impl Into<CompactString>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the model identifier.
    pub fn model(mut self, model: impl Into<CompactString>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the system prompt.
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Set the description.
    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    /// Add a tool by name.
    pub fn tool(mut self, name: impl Into<CompactString>) -> Self {
        self.tools.push(name.into());
        self
    }

    /// The name of the tool this agent is exposed as when delegated to.
    ///
    /// Lower-cased, spaces replaced with underscores, prefixed `ask_`.
    pub fn tool_name(&self) -> CompactString {
        let mut name = CompactString::from("ask_");
        for c in self.name.chars() {
            match c {
                ' ' => name.push('_'),
                c => name.extend(c.to_lowercase()),
            }
        }
        name
    }
}
