//! Application state.

use std::sync::Arc;

use scriba_media::{CliTools, ExternalTool, ToolConfig};
use scriba_queue::{ResultStore, TaskQueue};
use scriba_storage::{ArtifactStore, Ledger};

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ApiConfig>,
    pub queue: Arc<TaskQueue>,
    pub results: Arc<ResultStore>,
    pub ledger: Arc<Ledger>,
    pub artifacts: ArtifactStore,
    pub tools: Arc<dyn ExternalTool>,
    pub http: reqwest::Client,
}

impl AppState {
    /// Create new application state.
    pub async fn new(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let queue = TaskQueue::from_env()?;
        let results = ResultStore::from_env()?;
        let ledger = Ledger::new(&config.ledger_path);
        let artifacts = ArtifactStore::new(&config.upload_dir);
        artifacts.ensure_root().await?;

        let tools: Arc<dyn ExternalTool> = Arc::new(CliTools::new(ToolConfig::from_env()));

        Ok(Self {
            config: Arc::new(config),
            queue: Arc::new(queue),
            results: Arc::new(results),
            ledger: Arc::new(ledger),
            artifacts,
            tools,
            http: reqwest::Client::new(),
        })
    }
}
