//! Best-effort artifact classification from file extensions.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Kind of artifact a path points at, inferred from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Text,
    Video,
    Audio,
    Unknown,
}

impl ArtifactKind {
    /// Classify a path by its extension (case-insensitive).
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("srt" | "txt" | "vtt") => ArtifactKind::Text,
            Some("mp4" | "mov" | "avi" | "mkv") => ArtifactKind::Video,
            Some("mp3" | "wav" | "ogg" | "flac") => ArtifactKind::Audio,
            _ => ArtifactKind::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Text => "text",
            ArtifactKind::Video => "video",
            ArtifactKind::Audio => "audio",
            ArtifactKind::Unknown => "unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_text_extensions() {
        assert_eq!(ArtifactKind::from_path("a/b/out.srt"), ArtifactKind::Text);
        assert_eq!(ArtifactKind::from_path("out.txt"), ArtifactKind::Text);
        assert_eq!(ArtifactKind::from_path("out.vtt"), ArtifactKind::Text);
    }

    #[test]
    fn classifies_video_extensions() {
        assert_eq!(ArtifactKind::from_path("clip.mp4"), ArtifactKind::Video);
        assert_eq!(ArtifactKind::from_path("clip.MKV"), ArtifactKind::Video);
    }

    #[test]
    fn classifies_audio_extensions() {
        assert_eq!(ArtifactKind::from_path("a.wav"), ArtifactKind::Audio);
        assert_eq!(ArtifactKind::from_path("a.flac"), ArtifactKind::Audio);
    }

    #[test]
    fn unknown_for_everything_else() {
        assert_eq!(ArtifactKind::from_path("a.bin"), ArtifactKind::Unknown);
        assert_eq!(ArtifactKind::from_path("noext"), ArtifactKind::Unknown);
    }
}
