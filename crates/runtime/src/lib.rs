//! Delegate runtime: retrying agents wired into a manager/specialist team.
//!
//! An [`Agent`] runs one prompt to completion against a [`Model`], retrying
//! transient gateway failures with exponential backoff and dispatching the
//! tool calls the model asks for through its [`ToolRegistry`]. The
//! [`bridge`] exposes an agent as a tool on another agent, and the
//! [`Orchestrator`] wires the fixed manager/legal/research team behind a
//! single `run` entry point.
//!
//! # Example
//!
//! ```rust,ignore
//! use delegate_runtime::{Config, Orchestrator, toolbox};
//! use model::{Client, OpenRouter};
//!
//! let config = Config::load("delegate.toml".as_ref())?;
//! let client = Client::new();
//! let model = OpenRouter::new(client.clone(), &config.provider)?;
//! let orchestrator = Orchestrator::new(&config, model, &toolbox(&config, client)?)?;
//! let answer = orchestrator.run("Draft a mutual NDA").await?;
//! ```
//!
//! [`Model`]: dcore::Model

pub use agent::{Agent, AgentError, Generation, MAX_TOOL_ROUNDS};
pub use bridge::{Contract, ToolDescriptor, extract_input};
pub use config::{AgentConfig, Config, DocumentsConfig, RetryConfig, SearchConfig, scaffold};
pub use orchestrator::{
    LegalMode, LegalRequest, Orchestrator, legal_spec, manager_spec, research_spec, toolbox,
};
pub use registry::{Handler, RegistryError, ToolRegistry};

mod agent;
pub mod bridge;
pub mod config;
mod orchestrator;
mod registry;
