//! The retrying agent.
//!
//! Every attempt starts a fresh conversation (system prompt + user message)
//! and loops through tool calls until the model answers in text. Transient
//! gateway failures restart the whole attempt after an exponential backoff;
//! anything else ends the run immediately.

use crate::registry::{RegistryError, ToolRegistry};
use compact_str::CompactString;
use dcore::{
    AgentSpec, Message, Model, ModelError, ReasoningEffort, Request, RetryError, RetryPolicy,
    Tool, ToolChoice, ToolOutput, model::FinishReason,
};
use serde::{Deserialize, Serialize};
use std::future::Future;
use thiserror::Error;

/// Maximum model turns with tool calls within one attempt.
pub const MAX_TOOL_ROUNDS: usize = 16;

/// Sampling parameters sent with every request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Generation {
    pub temperature: f32,
    pub top_p: f32,
    /// Reasoning hint; the reasoning itself is excluded from the answer.
    pub reasoning_effort: Option<ReasoningEffort>,
}

impl Default for Generation {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            top_p: 0.1,
            reasoning_effort: Some(ReasoningEffort::High),
        }
    }
}

/// A terminal agent failure.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Every attempt failed with a transient gateway error.
    #[error("agent '{agent}' failed after {attempts} attempts: {source}")]
    Exhausted {
        agent: CompactString,
        attempts: u32,
        source: ModelError,
    },

    /// The gateway failed in a way retrying cannot fix.
    #[error("agent '{agent}' request rejected: {source}")]
    Rejected {
        agent: CompactString,
        attempts: u32,
        source: ModelError,
    },
}

impl AgentError {
    fn from_retry(agent: &str, error: RetryError<ModelError>) -> Self {
        let agent = CompactString::from(agent);
        match error {
            RetryError::Exhausted { attempts, error } => Self::Exhausted {
                agent,
                attempts,
                source: error,
            },
            RetryError::Fatal { attempts, error } => Self::Rejected {
                agent,
                attempts,
                source: error,
            },
        }
    }

    /// Attempts made before giving up.
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Exhausted { attempts, .. } | Self::Rejected { attempts, .. } => *attempts,
        }
    }

    /// The gateway error that ended the run.
    pub fn model_error(&self) -> &ModelError {
        match self {
            Self::Exhausted { source, .. } | Self::Rejected { source, .. } => source,
        }
    }
}

/// One configured model + prompt + tool catalog.
pub struct Agent<M> {
    spec: AgentSpec,
    model: M,
    tools: ToolRegistry,
    generation: Generation,
    retry: RetryPolicy,
}

impl<M: Model> Agent<M> {
    /// Build an agent, resolving the spec's tool names against `toolbox`.
    pub fn new(spec: AgentSpec, model: M, toolbox: &ToolRegistry) -> Result<Self, RegistryError> {
        let tools = toolbox.resolve(&spec.tools)?;
        Ok(Self {
            spec,
            model,
            tools,
            generation: Generation::default(),
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_generation(mut self, generation: Generation) -> Self {
        self.generation = generation;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn spec(&self) -> &AgentSpec {
        &self.spec
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn retry(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Add a tool to this agent's catalog.
    pub fn register<F, Fut>(&mut self, tool: Tool, handler: F) -> Result<(), RegistryError>
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ToolOutput> + Send + 'static,
    {
        let name = tool.name.clone();
        self.tools.register(tool, handler)?;
        self.spec.tools.push(name);
        Ok(())
    }

    /// Run `message` to completion with the configured retry policy.
    pub async fn run(&self, message: &str) -> Result<String, AgentError> {
        self.run_with_attempts(message, self.retry.max_attempts)
            .await
    }

    /// Run `message` to completion with an explicit attempt bound.
    pub async fn run_with_attempts(
        &self,
        message: &str,
        max_attempts: u32,
    ) -> Result<String, AgentError> {
        tracing::debug!(agent = %self.spec.name, max_attempts, "running agent");
        self.retry
            .with_max_attempts(max_attempts)
            .run(
                &self.spec.name,
                |_| self.attempt(message),
                ModelError::is_transient,
            )
            .await
            .map_err(|e| AgentError::from_retry(&self.spec.name, e))
    }

    async fn attempt(&self, message: &str) -> Result<String, ModelError> {
        let mut messages = vec![
            Message::system(&self.spec.system_prompt),
            Message::user(message),
        ];
        let tools = self.tools.tools();

        for _ in 0..MAX_TOOL_ROUNDS {
            let request = self.request(messages.clone(), tools.clone());
            let response = self.model.send(&request).await?;
            match response.reason() {
                Some(FinishReason::Length) => {
                    return Err(ModelError::Incomplete(
                        "response truncated at the token limit".into(),
                    ));
                }
                Some(FinishReason::Error) => {
                    return Err(ModelError::Incomplete(
                        "provider aborted generation".into(),
                    ));
                }
                _ => {}
            }
            let Some(reply) = response.message() else {
                return Err(ModelError::Incomplete("response has no choices".into()));
            };

            if reply.tool_calls.is_empty() {
                if reply.content.trim().is_empty() {
                    return Err(ModelError::Incomplete("empty response".into()));
                }
                return Ok(reply.content);
            }

            for call in &reply.tool_calls {
                tracing::debug!(agent = %self.spec.name, tool = %call.function.name, "tool call");
            }
            let results = self.tools.dispatch(&reply.tool_calls).await;
            messages.push(reply);
            messages.extend(results);
        }

        Err(ModelError::Incomplete(format!(
            "exceeded {MAX_TOOL_ROUNDS} tool rounds"
        )))
    }

    fn request(&self, messages: Vec<Message>, tools: Vec<Tool>) -> Request {
        let mut request = Request::new(self.spec.model.clone())
            .with_messages(messages)
            .with_temperature(self.generation.temperature)
            .with_top_p(self.generation.top_p);
        if !tools.is_empty() {
            request = request.with_tools(tools).with_tool_choice(ToolChoice::Auto);
        }
        if let Some(effort) = self.generation.reasoning_effort {
            request = request.with_reasoning(effort);
        }
        request
    }
}
