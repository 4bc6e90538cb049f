//! Terminal result store and status projection.
//!
//! Workers record one terminal outcome per task attempt; the job-visible
//! record lands under the job key only when the last stage of the pipeline
//! is terminal. The Status Tracker reads the job key and nothing else.

use std::collections::HashSet;
use std::path::PathBuf;

use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use tracing::debug;

use scriba_models::{ArtifactKind, JobId, StageResult, TaskId, TaskOutcome};

use crate::error::QueueResult;

const TASK_KEY_PREFIX: &str = "scriba:result:task:";
const JOB_KEY_PREFIX: &str = "scriba:result:job:";
const ACTIVE_PATHS_KEY: &str = "scriba:active_paths";

/// Result backend configuration.
#[derive(Debug, Clone)]
pub struct ResultStoreConfig {
    /// Result backend connection endpoint
    pub backend_url: String,
    /// Seconds a terminal record stays retrievable
    pub result_ttl_secs: u64,
}

impl Default for ResultStoreConfig {
    fn default() -> Self {
        Self {
            backend_url: "redis://localhost:6379".to_string(),
            result_ttl_secs: 86400,
        }
    }
}

impl ResultStoreConfig {
    /// Create config from environment variables. The result backend
    /// defaults to the broker endpoint.
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            backend_url: std::env::var("RESULT_BACKEND_URL")
                .or_else(|_| std::env::var("BROKER_URL"))
                .unwrap_or(default.backend_url),
            result_ttl_secs: std::env::var("RESULT_TTL_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.result_ttl_secs),
        }
    }
}

/// Client-facing job state, read any number of times without side effects.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Completed {
        result: StageResult,
        file_type: ArtifactKind,
    },
    Failed {
        error: String,
    },
}

impl JobStatus {
    /// Project a stored terminal outcome (or its absence) into the
    /// client-facing status.
    pub fn from_outcome(outcome: Option<TaskOutcome>) -> Self {
        match outcome {
            None => JobStatus::Pending,
            Some(TaskOutcome::Completed { result }) => {
                let file_type = result.artifact_kind();
                JobStatus::Completed { result, file_type }
            }
            Some(TaskOutcome::Failed { error }) => JobStatus::Failed { error },
        }
    }
}

/// Terminal outcome storage keyed by task and job identifiers.
pub struct ResultStore {
    client: redis::Client,
    config: ResultStoreConfig,
}

impl ResultStore {
    /// Create a new result store client.
    pub fn new(config: ResultStoreConfig) -> QueueResult<Self> {
        let client = redis::Client::open(config.backend_url.as_str())?;
        Ok(Self { client, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> QueueResult<Self> {
        Self::new(ResultStoreConfig::from_env())
    }

    /// Record a task attempt's terminal outcome. A plain SET so a newer
    /// terminal record from a post-crash redelivery wins.
    pub async fn record_task(&self, task_id: &TaskId, outcome: &TaskOutcome) -> QueueResult<()> {
        self.set(&format!("{TASK_KEY_PREFIX}{task_id}"), outcome)
            .await
    }

    /// Record the job-visible terminal outcome. Only the last stage of a
    /// pipeline (or the first failing one) writes here.
    pub async fn record_job(&self, job_id: &JobId, outcome: &TaskOutcome) -> QueueResult<()> {
        self.set(&format!("{JOB_KEY_PREFIX}{job_id}"), outcome).await
    }

    /// Read a job's terminal outcome, if any.
    pub async fn job_outcome(&self, job_id: &JobId) -> QueueResult<Option<TaskOutcome>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let payload: Option<String> = conn.get(format!("{JOB_KEY_PREFIX}{job_id}")).await?;
        match payload {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// The Status Tracker: pending until terminal, stable thereafter.
    pub async fn job_status(&self, job_id: &JobId) -> QueueResult<JobStatus> {
        Ok(JobStatus::from_outcome(self.job_outcome(job_id).await?))
    }

    /// Register artifact paths referenced by a non-terminal task; the
    /// sweeper must not touch them.
    pub async fn register_paths(&self, paths: &[PathBuf]) -> QueueResult<()> {
        if paths.is_empty() {
            return Ok(());
        }
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let members: Vec<String> = paths
            .iter()
            .map(|p| p.to_string_lossy().to_string())
            .collect();
        conn.sadd::<_, _, ()>(ACTIVE_PATHS_KEY, members).await?;
        Ok(())
    }

    /// Release paths once their owning job is terminal.
    pub async fn release_paths(&self, paths: &[PathBuf]) -> QueueResult<()> {
        if paths.is_empty() {
            return Ok(());
        }
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let members: Vec<String> = paths
            .iter()
            .map(|p| p.to_string_lossy().to_string())
            .collect();
        conn.srem::<_, _, ()>(ACTIVE_PATHS_KEY, members).await?;
        Ok(())
    }

    /// Paths currently referenced by non-terminal tasks.
    pub async fn active_paths(&self) -> QueueResult<HashSet<PathBuf>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let members: Vec<String> = conn.smembers(ACTIVE_PATHS_KEY).await?;
        Ok(members.into_iter().map(PathBuf::from).collect())
    }

    async fn set(&self, key: &str, outcome: &TaskOutcome) -> QueueResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let payload = serde_json::to_string(outcome)?;
        conn.set_ex::<_, _, ()>(key, payload, self.config.result_ttl_secs)
            .await?;
        debug!(key, "Recorded terminal outcome");
        Ok(())
    }
}
