//! In-memory job runner.
//!
//! Tasks move `PENDING → RUNNING → COMPLETED | FAILED`. The runner owns task
//! identity and status; the orchestrator only sees the prompt.

use chrono::{DateTime, Utc};
use dcore::Model;
use parking_lot::Mutex;
use runtime::Orchestrator;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, sync::Arc, time::Duration};
use thiserror::Error;
use ulid::Ulid;

/// Lifecycle state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

/// One submitted prompt and its outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: Ulid,
    pub prompt: String,
    pub status: TaskStatus,
    /// Answer text when completed, error text when failed.
    pub result: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskRecord {
    fn new(prompt: String) -> Self {
        let now = Utc::now();
        Self {
            id: Ulid::new(),
            prompt,
            status: TaskStatus::Pending,
            result: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum JobError {
    #[error("task {0} not found")]
    NotFound(Ulid),

    #[error("task {0} has already been started")]
    AlreadyStarted(Ulid),
}

/// Shared task table.
#[derive(Clone, Default)]
pub struct TaskStore {
    tasks: Arc<Mutex<Tasks>>,
}

#[derive(Default)]
struct Tasks {
    records: HashMap<Ulid, TaskRecord>,
    /// Submission order.
    order: Vec<Ulid>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: Ulid) -> Option<TaskRecord> {
        self.tasks.lock().records.get(&id).cloned()
    }

    /// All tasks in submission order.
    pub fn list(&self) -> Vec<TaskRecord> {
        let tasks = self.tasks.lock();
        tasks
            .order
            .iter()
            .filter_map(|id| tasks.records.get(id).cloned())
            .collect()
    }

    fn insert(&self, record: TaskRecord) {
        let mut tasks = self.tasks.lock();
        tasks.order.push(record.id);
        tasks.records.insert(record.id, record);
    }

    /// Move a pending task to running.
    fn start(&self, id: Ulid) -> Result<String, JobError> {
        let mut tasks = self.tasks.lock();
        let task = tasks.records.get_mut(&id).ok_or(JobError::NotFound(id))?;
        if task.status != TaskStatus::Pending {
            return Err(JobError::AlreadyStarted(id));
        }
        task.status = TaskStatus::Running;
        task.updated_at = Utc::now();
        Ok(task.prompt.clone())
    }

    fn finish(&self, id: Ulid, status: TaskStatus, result: String) -> Option<TaskRecord> {
        let mut tasks = self.tasks.lock();
        let task = tasks.records.get_mut(&id)?;
        task.status = status;
        task.result = Some(result);
        task.updated_at = Utc::now();
        Some(task.clone())
    }
}

/// Runs submitted prompts through an orchestrator.
pub struct JobRunner<M> {
    orchestrator: Arc<Orchestrator<M>>,
    store: TaskStore,
    timeout: Option<Duration>,
}

impl<M: Model> JobRunner<M> {
    pub fn new(orchestrator: Arc<Orchestrator<M>>, store: TaskStore) -> Self {
        Self {
            orchestrator,
            store,
            timeout: None,
        }
    }

    /// Fail tasks that run longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    /// Record a new pending task.
    pub fn submit(&self, prompt: impl Into<String>) -> Ulid {
        let record = TaskRecord::new(prompt.into());
        let id = record.id;
        tracing::info!(task = %id, "task submitted");
        self.store.insert(record);
        id
    }

    /// Run a pending task to a terminal state.
    ///
    /// Orchestrator failures and timeouts end in `FAILED` with the error
    /// text as result; they are not errors of this call.
    pub async fn execute(&self, id: Ulid) -> Result<TaskRecord, JobError> {
        let prompt = self.store.start(id)?;
        tracing::info!(task = %id, "task running");

        let run = self.orchestrator.run(&prompt);
        let outcome = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, run).await {
                Ok(outcome) => outcome.map_err(|e| e.to_string()),
                Err(_) => Err(format!("timed out after {}s", limit.as_secs_f64())),
            },
            None => run.await.map_err(|e| e.to_string()),
        };

        let (status, result) = match outcome {
            Ok(answer) => {
                tracing::info!(task = %id, "task completed");
                (TaskStatus::Completed, answer)
            }
            Err(error) => {
                tracing::error!(task = %id, %error, "task failed");
                (TaskStatus::Failed, error)
            }
        };
        self.store
            .finish(id, status, result)
            .ok_or(JobError::NotFound(id))
    }

    /// Submit and execute in one step.
    pub async fn run(&self, prompt: impl Into<String>) -> Result<TaskRecord, JobError> {
        let id = self.submit(prompt);
        self.execute(id).await
    }
}
