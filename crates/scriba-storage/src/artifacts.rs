//! Upload-root artifact persistence and path derivation.

use std::path::{Path, PathBuf};
use tracing::debug;

use scriba_models::OutputFormat;

use crate::error::StorageResult;

/// The filesystem namespace all job artifacts live under.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the upload root if it does not exist yet.
    pub async fn ensure_root(&self) -> StorageResult<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    /// Input artifact path, name-spaced by the file uuid to avoid
    /// collisions. Only the client filename's stem survives.
    pub fn input_path(&self, file_id: &str, filename: &str) -> PathBuf {
        let stem = Path::new(filename)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "artifact".to_string());
        self.root.join(format!("{file_id}_{stem}"))
    }

    /// Transcript path: the input path with the format extension appended.
    pub fn transcript_path(input_path: &Path, format: OutputFormat) -> PathBuf {
        PathBuf::from(format!("{}{}", input_path.display(), format.extension()))
    }

    /// Persist uploaded bytes at the given path.
    pub async fn save_bytes(&self, path: &Path, bytes: &[u8]) -> StorageResult<()> {
        tokio::fs::write(path, bytes).await?;
        debug!(path = %path.display(), size = bytes.len(), "Persisted artifact");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_path_namespaces_by_file_id() {
        let store = ArtifactStore::new("/uploads");
        let path = store.input_path("uid-1", "talk.mp3");
        assert_eq!(path, PathBuf::from("/uploads/uid-1_talk"));
    }

    #[test]
    fn input_path_ignores_client_directories() {
        let store = ArtifactStore::new("/uploads");
        let path = store.input_path("uid-1", "../../etc/passwd");
        assert_eq!(path, PathBuf::from("/uploads/uid-1_passwd"));
    }

    #[test]
    fn transcript_path_appends_format_extension() {
        let input = PathBuf::from("/uploads/uid-1_talk");
        assert_eq!(
            ArtifactStore::transcript_path(&input, OutputFormat::Srt),
            PathBuf::from("/uploads/uid-1_talk.srt")
        );
        assert_eq!(
            ArtifactStore::transcript_path(&input, OutputFormat::Txt),
            PathBuf::from("/uploads/uid-1_talk.txt")
        );
    }

    #[tokio::test]
    async fn save_bytes_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ArtifactStore::new(dir.path());
        let path = store.input_path("uid-1", "talk.mp3");

        store.save_bytes(&path, b"audio bytes").await.expect("save");
        let read = tokio::fs::read(&path).await.expect("read back");
        assert_eq!(read, b"audio bytes");
    }
}
