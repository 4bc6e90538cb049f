//! Append-only metadata ledger.
//!
//! One JSON-array file rewritten wholesale on each append. The whole
//! read-modify-write cycle runs under an async mutex: concurrent
//! submissions serialize here instead of losing each other's entries.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;

use scriba_models::MetadataRecord;

use crate::error::StorageResult;

/// Persistent ordered collection of every accepted job.
pub struct Ledger {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl Ledger {
    /// Create a ledger over the given file. The file need not exist yet.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record. Existing entries are never mutated or removed.
    pub async fn append(&self, record: MetadataRecord) -> StorageResult<()> {
        let _guard = self.write_lock.lock().await;

        let mut records = read_records(&self.path).await?;
        records.push(record);

        let json = serde_json::to_vec_pretty(&records)?;
        tokio::fs::write(&self.path, json).await?;

        debug!(
            path = %self.path.display(),
            total = records.len(),
            "Appended ledger record"
        );
        Ok(())
    }

    /// All records in insertion order. A missing file reads as empty.
    pub async fn list(&self) -> StorageResult<Vec<MetadataRecord>> {
        read_records(&self.path).await
    }
}

async fn read_records(path: &Path) -> StorageResult<Vec<MetadataRecord>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use scriba_models::{JobId, OutputFormat, PipelineKind, SourceDescriptor};
    use std::sync::Arc;

    fn record(n: usize) -> MetadataRecord {
        MetadataRecord {
            job_id: JobId::from_string(format!("job-{n}")),
            submitted_at: Utc::now(),
            source: SourceDescriptor::Upload {
                filename: format!("file-{n}.mp3"),
            },
            input_path: PathBuf::from(format!("/uploads/uid_{n}")),
            output_path: Some(PathBuf::from(format!("/uploads/uid_{n}.srt"))),
            language: "auto".to_string(),
            format: OutputFormat::Srt,
            model: None,
            pipeline: PipelineKind::Transcription,
            processing_secs: None,
        }
    }

    #[tokio::test]
    async fn missing_file_lists_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ledger = Ledger::new(dir.path().join("ledger.json"));
        assert!(ledger.list().await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn append_preserves_insertion_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ledger = Ledger::new(dir.path().join("ledger.json"));

        for n in 0..5 {
            ledger.append(record(n)).await.expect("append");
        }

        let records = ledger.list().await.expect("list");
        assert_eq!(records.len(), 5);
        for (n, r) in records.iter().enumerate() {
            assert_eq!(r.job_id.as_str(), format!("job-{n}"));
        }
    }

    #[tokio::test]
    async fn concurrent_appends_lose_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let ledger = Arc::new(Ledger::new(dir.path().join("ledger.json")));

        let mut handles = Vec::new();
        for n in 0..16 {
            let ledger = Arc::clone(&ledger);
            handles.push(tokio::spawn(async move {
                ledger.append(record(n)).await
            }));
        }
        for h in handles {
            h.await.expect("join").expect("append");
        }

        let records = ledger.list().await.expect("list");
        assert_eq!(records.len(), 16);
    }
}
