//! Delegate CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use model::{Client, OpenRouter};
use runtime::{Config, Orchestrator, config::CONFIG_FILE, scaffold, toolbox};
use std::{path::PathBuf, sync::Arc, time::Duration};
use tracing_subscriber::{EnvFilter, fmt};
pub use job::{JobError, JobRunner, TaskRecord, TaskStatus, TaskStore};

pub mod job;

/// Delegate: a manager agent with legal and research specialists
#[derive(Debug, Parser)]
#[command(name = "delegate", version, about)]
pub struct App {
    /// Path to the config file
    #[arg(short, long, global = true, default_value = CONFIG_FILE)]
    pub config: PathBuf,

    /// Verbosity level (use -v, -vv, -vvv, etc.)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Answer a prompt with the agent team
    Run {
        /// The prompt to answer
        prompt: String,

        /// Fail the task after this many seconds
        #[arg(short, long)]
        timeout: Option<u64>,

        /// Print the task record as JSON instead of the answer
        #[arg(long)]
        json: bool,
    },

    /// Load the config and wire the team without calling the model
    Check,

    /// Write a default config and prompts into a directory
    Init {
        /// Target directory
        #[arg(default_value = ".")]
        dir: PathBuf,
    },
}

impl App {
    /// Initialize tracing subscriber based on verbosity
    pub fn init_tracing(&self) {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let directive = match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "delegate_runtime=debug,delegate_tools=debug,info",
                3 => "debug",
                _ => "trace",
            };
            EnvFilter::new(directive)
        });

        fmt()
            .without_time()
            .with_env_filter(filter)
            .with_target(self.verbose != 0)
            .init();
    }

    /// Run the selected command
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Run {
                ref prompt,
                timeout,
                json,
            } => {
                let orchestrator = self.orchestrator()?;
                let mut runner = JobRunner::new(Arc::new(orchestrator), TaskStore::new());
                if let Some(secs) = timeout {
                    runner = runner.with_timeout(Duration::from_secs(secs));
                }

                let record = runner.run(prompt.as_str()).await?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&record)?);
                    return Ok(());
                }
                let result = record.result.unwrap_or_default();
                match record.status {
                    TaskStatus::Completed => {
                        println!("{result}");
                        Ok(())
                    }
                    _ => anyhow::bail!("task {} failed: {result}", record.id),
                }
            }
            Command::Check => {
                let orchestrator = self.orchestrator()?;
                let tools = orchestrator.manager().tools().names().collect::<Vec<_>>();
                println!("{}: ok (manager tools: {})", self.config.display(), tools.join(", "));
                Ok(())
            }
            Command::Init { ref dir } => {
                scaffold(dir)?;
                println!("wrote {}", dir.join(CONFIG_FILE).display());
                Ok(())
            }
        }
    }

    fn orchestrator(&self) -> Result<Orchestrator<OpenRouter>> {
        let config = Config::load(&self.config)?;
        let client = Client::new();
        let model = OpenRouter::new(client.clone(), &config.provider)
            .context("failed to create the model gateway")?;
        let toolbox = toolbox(&config, client).context("failed to register tools")?;
        Orchestrator::new(&config, model, &toolbox)
    }
}
