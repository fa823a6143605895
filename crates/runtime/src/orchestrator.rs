//! The fixed manager/legal/research team.

use crate::{Agent, AgentError, Config, RegistryError, ToolRegistry, bridge};
use anyhow::{Context, Result};
use dcore::{AgentSpec, Model};
use model::Client;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tools::{CurrentDate, DocumentWriter, DuckDuckGo, WebSearch};

const MANAGER: &str = "Manager Agent";
const LEGAL: &str = "Legal Agent";
const RESEARCH: &str = "Research Agent";

/// The kind of legal work requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum LegalMode {
    Draft,
    Review,
    Compliance,
    RiskAssessment,
    Writing,
}

/// Structured request accepted by the legal agent's delegation tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct LegalRequest {
    /// The kind of legal work to perform.
    pub mode: LegalMode,
    /// The legal question or drafting instructions.
    pub prompt: String,
    /// Whether to render the result as a document file.
    #[serde(default)]
    pub write_document: bool,
}

/// A manager agent with the specialists wired into its tool catalog.
///
/// Specialists are reachable only through the manager's model calling
/// `ask_legal_agent` or `ask_research_agent`.
pub struct Orchestrator<M> {
    manager: Agent<M>,
}

impl<M: Model> Orchestrator<M> {
    /// Build the team from config, resolving tools against `toolbox`.
    pub fn new(config: &Config, model: M, toolbox: &ToolRegistry) -> Result<Self> {
        let build = |role: &str, spec: AgentSpec| -> Result<Agent<M>> {
            let agent_config = config.agent(role)?;
            let spec = spec
                .model(agent_config.model.clone())
                .system_prompt(agent_config.system_prompt.clone());
            let agent = Agent::new(spec, model.clone(), toolbox)
                .with_context(|| format!("failed to build the {role} agent"))?;
            Ok(agent
                .with_generation(config.generation)
                .with_retry(config.retry.policy()))
        };

        let manager = build("manager", manager_spec())?;
        let legal = build("legal", legal_spec())?;
        let research = build("research", research_spec())?;
        Self::from_agents(manager, legal, research).context("failed to wire the team")
    }

    /// Wire pre-built agents: legal as a structured tool, research as a
    /// free-text tool, both on the manager.
    pub fn from_agents(
        mut manager: Agent<M>,
        legal: Agent<M>,
        research: Agent<M>,
    ) -> Result<Self, RegistryError> {
        bridge::expose_structured::<LegalRequest, _, _>(Arc::new(legal), &mut manager)?;
        bridge::expose(Arc::new(research), &mut manager)?;
        tracing::debug!(
            tools = ?manager.tools().names().collect::<Vec<_>>(),
            "orchestrator wired"
        );
        Ok(Self { manager })
    }

    /// Answer `prompt` through the manager.
    pub async fn run(&self, prompt: &str) -> Result<String, AgentError> {
        self.manager.run(prompt).await
    }

    pub fn manager(&self) -> &Agent<M> {
        &self.manager
    }
}

/// The manager role. It has no tools of its own.
pub fn manager_spec() -> AgentSpec {
    AgentSpec::new(MANAGER).description(
        "Handle overall project management, task delegation, strategic planning, \
         and quality assurance.",
    )
}

pub fn legal_spec() -> AgentSpec {
    AgentSpec::new(LEGAL)
        .description("Handle legal matters, contracts, compliance, and regulatory frameworks.")
        .tool("write_document")
        .tool("current_date")
}

pub fn research_spec() -> AgentSpec {
    AgentSpec::new(RESEARCH)
        .description(
            "Conduct research, gather information, and synthesize findings from web searches.",
        )
        .tool("web_search")
        .tool("current_date")
}

/// Register the standard tools: `current_date`, `web_search` and
/// `write_document`.
pub fn toolbox(config: &Config, client: Client) -> Result<ToolRegistry, RegistryError> {
    let mut registry = ToolRegistry::new();

    registry.register(CurrentDate::tool(), |args| async move {
        CurrentDate::call(&args).await
    })?;

    let search = Arc::new(
        WebSearch::new(DuckDuckGo::new(client))
            .with_max_results(config.search.max_results)
            .with_retry(config.search.policy()),
    );
    registry.register(WebSearch::<DuckDuckGo>::tool(), move |args| {
        let search = Arc::clone(&search);
        async move { search.call(&args).await }
    })?;

    let writer = Arc::new(DocumentWriter::new(config.documents.output_dir.clone()));
    registry.register(DocumentWriter::tool(), move |args| {
        let writer = Arc::clone(&writer);
        async move { writer.call(&args).await }
    })?;

    Ok(registry)
}
