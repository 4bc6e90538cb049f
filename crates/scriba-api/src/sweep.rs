//! Periodic retention sweep.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use scriba_queue::ResultStore;
use scriba_storage::RetentionSweeper;

/// Background task deleting expired upload-root artifacts, skipping any
/// path still referenced by a non-terminal task.
pub struct RetentionTask {
    sweeper: RetentionSweeper,
    results: Arc<ResultStore>,
    interval: Duration,
}

impl RetentionTask {
    pub fn new(sweeper: RetentionSweeper, results: Arc<ResultStore>, interval: Duration) -> Self {
        Self {
            sweeper,
            results,
            interval,
        }
    }

    /// Run forever; spawn this on the runtime.
    pub async fn run(self) {
        let mut interval = tokio::time::interval(self.interval);
        loop {
            interval.tick().await;

            // Without the in-flight set a sweep could delete artifacts a
            // worker is still writing; skip the round instead.
            let in_flight = match self.results.active_paths().await {
                Ok(paths) => paths,
                Err(e) => {
                    warn!("Skipping sweep, active paths unavailable: {}", e);
                    continue;
                }
            };

            match self.sweeper.sweep(&in_flight).await {
                Ok(removed) if removed.is_empty() => debug!("Sweep found nothing expired"),
                Ok(removed) => debug!(count = removed.len(), "Sweep removed expired artifacts"),
                Err(e) => warn!("Retention sweep failed: {}", e),
            }
        }
    }
}
