//! Configuration loaded from `delegate.toml`.
//!
//! Loaded once at startup and read-only afterwards. String values may
//! reference environment variables as `${VAR}`. Agent prompt paths resolve
//! relative to the config file's directory, and a missing or empty prompt
//! fails the load.

use crate::Generation;
use anyhow::{Context, Result};
use compact_str::CompactString;
use dcore::RetryPolicy;
use model::ProviderConfig;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    time::Duration,
};

/// Default config file name.
pub const CONFIG_FILE: &str = "delegate.toml";
/// Prompt subdirectory created by [`scaffold`].
pub const PROMPTS_DIR: &str = "prompts";

/// Roles every config must define.
pub const ROLES: [&str; 3] = ["manager", "legal", "research"];

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub provider: ProviderConfig,
    #[serde(default)]
    pub generation: Generation,
    #[serde(default)]
    pub retry: RetryConfig,
    /// Per-role agent settings, keyed by role name.
    pub agents: BTreeMap<CompactString, AgentConfig>,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub documents: DocumentsConfig,
}

/// One agent role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Model identifier, e.g. `openai/gpt-4o`.
    pub model: CompactString,
    /// Path of the system prompt file.
    pub prompt: PathBuf,
    /// Prompt text, filled in by [`Config::load`].
    #[serde(skip)]
    pub system_prompt: String,
}

/// Model-call retry settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: dcore::retry::DEFAULT_MAX_ATTEMPTS,
            base_delay_ms: 1000,
        }
    }
}

impl RetryConfig {
    /// Pure exponential backoff.
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::exponential(self.max_attempts, Duration::from_millis(self.base_delay_ms))
    }
}

/// Web search settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub max_results: usize,
    pub max_attempts: u32,
    pub base_delay_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: 5,
            max_attempts: dcore::retry::DEFAULT_MAX_ATTEMPTS,
            base_delay_ms: 1000,
        }
    }
}

impl SearchConfig {
    /// Exponential backoff with jitter.
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy::exponential(self.max_attempts, Duration::from_millis(self.base_delay_ms))
            .with_jitter()
    }
}

/// Rendered document settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentsConfig {
    /// Output directory, relative to the config file's directory.
    pub output_dir: PathBuf,
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
        }
    }
}

impl Config {
    /// Parse a TOML string, expanding `${VAR}` references first.
    ///
    /// Prompt files are not read; see [`Config::load`].
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let expanded = expand_env_vars(toml_str);
        let config: Self = toml::from_str(&expanded).context("invalid config")?;
        for role in ROLES {
            if !config.agents.contains_key(role) {
                anyhow::bail!("missing [agents.{role}] section");
            }
        }
        Ok(config)
    }

    /// Load a config file and every agent prompt it references.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let mut config = Self::from_toml(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        let base = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(base)?;
        Ok(config)
    }

    /// Read prompts and anchor relative paths at `base`.
    pub fn resolve_paths(&mut self, base: &Path) -> Result<()> {
        for (role, agent) in &mut self.agents {
            let path = base.join(&agent.prompt);
            let prompt = std::fs::read_to_string(&path).with_context(|| {
                format!("failed to read {role} prompt {}", path.display())
            })?;
            let prompt = prompt.trim();
            if prompt.is_empty() {
                anyhow::bail!("{role} prompt {} is empty", path.display());
            }
            agent.system_prompt = prompt.to_owned();
            agent.prompt = path;
        }
        self.documents.output_dir = base.join(&self.documents.output_dir);
        Ok(())
    }

    /// The settings of one role.
    pub fn agent(&self, role: &str) -> Result<&AgentConfig> {
        self.agents
            .get(role)
            .with_context(|| format!("no agent configured for role '{role}'"))
    }
}

/// Expand `${VAR}` patterns with environment variable values.
///
/// Unknown variables expand to an empty string.
pub fn expand_env_vars(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek() == Some(&'{') {
            chars.next();
            let mut var_name = String::new();
            for c in chars.by_ref() {
                if c == '}' {
                    break;
                }
                var_name.push(c);
            }
            if let Ok(val) = std::env::var(&var_name) {
                result.push_str(&val);
            }
        } else {
            result.push(ch);
        }
    }

    result
}

/// Default `delegate.toml` written by [`scaffold`].
pub const DEFAULT_CONFIG: &str = r#"[provider]
api_key = "${OPENROUTER_API_KEY}"

[generation]
temperature = 0.1
top_p = 0.1
reasoning_effort = "high"

[retry]
max_attempts = 3
base_delay_ms = 1000

[agents.manager]
model = "openai/gpt-4o"
prompt = "prompts/manager_agent.md"

[agents.legal]
model = "openai/gpt-4o"
prompt = "prompts/legal_agent.md"

[agents.research]
model = "openai/gpt-4o-mini"
prompt = "prompts/research_agent.md"

[search]
max_results = 5
max_attempts = 3
base_delay_ms = 1000

[documents]
output_dir = "output"
"#;

const MANAGER_PROMPT: &str = "You coordinate a team of specialists. Break the request \
into sub-tasks, delegate legal work to the legal agent and fact finding to the research \
agent, then combine their answers into one reply.\n";

const LEGAL_PROMPT: &str = "You are a legal specialist. Handle drafting, review, \
compliance and risk assessment requests. When asked to write a document, render it with \
the write_document tool and report the file path.\n";

const RESEARCH_PROMPT: &str = "You are a research specialist. Search the web, check \
dates with the current_date tool, and summarize the findings with their sources.\n";

/// Write a default config and prompt files into `dir`.
///
/// Existing files are left untouched.
pub fn scaffold(dir: &Path) -> Result<()> {
    let prompts = dir.join(PROMPTS_DIR);
    std::fs::create_dir_all(&prompts).context("failed to create prompts directory")?;

    let files = [
        (dir.join(CONFIG_FILE), DEFAULT_CONFIG),
        (prompts.join("manager_agent.md"), MANAGER_PROMPT),
        (prompts.join("legal_agent.md"), LEGAL_PROMPT),
        (prompts.join("research_agent.md"), RESEARCH_PROMPT),
    ];
    for (path, contents) in files {
        if path.exists() {
            tracing::info!(path = %path.display(), "keeping existing file");
            continue;
        }
        std::fs::write(&path, contents)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    Ok(())
}
