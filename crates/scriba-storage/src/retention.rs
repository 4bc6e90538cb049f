//! Age-based artifact retention.

use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{info, warn};

use crate::error::StorageResult;

/// Deletes upload-root artifacts whose mtime is strictly older than the
/// configured maximum age. The ledger file and any path referenced by a
/// non-terminal task are never eligible.
pub struct RetentionSweeper {
    root: PathBuf,
    max_age: Duration,
    protected: Vec<PathBuf>,
}

impl RetentionSweeper {
    pub fn new(root: impl AsRef<Path>, max_age: Duration) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            max_age,
            protected: Vec::new(),
        }
    }

    /// Mark a path (the ledger, typically) as never sweepable.
    pub fn protect(mut self, path: impl AsRef<Path>) -> Self {
        self.protected.push(path.as_ref().to_path_buf());
        self
    }

    /// Run one sweep. `in_flight` holds paths currently referenced by
    /// non-terminal tasks. Returns the removed paths; a second run right
    /// after deletes nothing new.
    pub async fn sweep(&self, in_flight: &HashSet<PathBuf>) -> StorageResult<Vec<PathBuf>> {
        let now = SystemTime::now();
        let mut removed = Vec::new();

        let mut dir = match tokio::fs::read_dir(&self.root).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(removed),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();

            let meta = match entry.metadata().await {
                Ok(m) => m,
                Err(e) => {
                    warn!(path = %path.display(), "Failed to stat artifact: {}", e);
                    continue;
                }
            };
            if !meta.is_file() {
                continue;
            }
            if self.protected.contains(&path) || in_flight.contains(&path) {
                continue;
            }

            let Ok(mtime) = meta.modified() else {
                continue;
            };
            let age = now.duration_since(mtime).unwrap_or_default();
            if age <= self.max_age {
                continue;
            }

            match tokio::fs::remove_file(&path).await {
                Ok(()) => removed.push(path),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => warn!(path = %path.display(), "Failed to remove artifact: {}", e),
            }
        }

        if !removed.is_empty() {
            info!(count = removed.len(), "Swept expired artifacts");
        }

        Ok(removed)
    }
}
