//! The `ExternalTool` contract and its CLI-backed implementation.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::info;

use scriba_models::{OutputFormat, TranscriptResult, VideoResult};

use crate::command::ToolCommand;
use crate::error::MediaResult;
use crate::filter::subtitles_filter_arg;
use crate::probe;

/// Render target: fixed-resolution color background with burned subtitles.
const RENDER_WIDTH: u32 = 1280;
const RENDER_HEIGHT: u32 = 720;
const RENDER_FPS: u32 = 25;

/// Engine binary paths and model resolution.
#[derive(Debug, Clone)]
pub struct ToolConfig {
    /// Transcription engine binary
    pub transcriber_bin: PathBuf,
    /// ffmpeg binary
    pub ffmpeg_bin: PathBuf,
    /// ffprobe binary
    pub ffprobe_bin: PathBuf,
    /// Directory model names resolve against
    pub model_dir: PathBuf,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            transcriber_bin: PathBuf::from("whisper-cli"),
            ffmpeg_bin: PathBuf::from("ffmpeg"),
            ffprobe_bin: PathBuf::from("ffprobe"),
            model_dir: PathBuf::from("/app/models"),
        }
    }
}

impl ToolConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            transcriber_bin: std::env::var("WHISPER_CLI")
                .map(PathBuf::from)
                .unwrap_or(default.transcriber_bin),
            ffmpeg_bin: std::env::var("FFMPEG_BIN")
                .map(PathBuf::from)
                .unwrap_or(default.ffmpeg_bin),
            ffprobe_bin: std::env::var("FFPROBE_BIN")
                .map(PathBuf::from)
                .unwrap_or(default.ffprobe_bin),
            model_dir: std::env::var("MODEL_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.model_dir),
        }
    }

    /// Resolve a model name to a model file path.
    pub fn resolve_model(&self, name: &str) -> PathBuf {
        self.model_dir.join(name)
    }
}

/// Parameters for one transcription invocation.
#[derive(Debug, Clone)]
pub struct TranscribeRequest {
    /// Media artifact to transcribe
    pub input_path: PathBuf,
    /// Transcript file the engine must produce
    pub output_path: PathBuf,
    /// Language hint, empty = auto-detect
    pub language: String,
    /// Transcript format
    pub format: OutputFormat,
    /// Model name resolved against the configured model directory
    pub model: String,
}

/// Deterministic rendered-video path for an audio artifact.
pub fn rendered_video_path(audio_path: &Path) -> PathBuf {
    PathBuf::from(format!("{}.mp4", audio_path.display()))
}

/// Uniform contract for the out-of-process engines.
///
/// The worker depends on this abstraction; invocations must be safe to
/// repeat with identical inputs (outputs are overwritten).
#[async_trait]
pub trait ExternalTool: Send + Sync {
    /// Run the transcription engine to completion.
    async fn transcribe(&self, req: &TranscribeRequest) -> MediaResult<TranscriptResult>;

    /// Render a fixed-resolution color-background video with the subtitle
    /// file burned in and the original audio muxed.
    async fn render_subtitled_video(
        &self,
        audio_path: &Path,
        subtitle_path: &Path,
    ) -> MediaResult<VideoResult>;

    /// Probe a media file's duration in seconds.
    async fn probe_duration(&self, path: &Path) -> MediaResult<f64>;
}

/// Production implementation invoking the engines as CLI processes.
pub struct CliTools {
    config: ToolConfig,
}

impl CliTools {
    pub fn new(config: ToolConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ToolConfig {
        &self.config
    }

    fn transcribe_command(&self, req: &TranscribeRequest) -> ToolCommand {
        let output_base = req.output_path.with_extension("");

        let mut cmd = ToolCommand::new(&self.config.transcriber_bin)
            .arg("-m")
            .path_arg(self.config.resolve_model(&req.model))
            .arg("-f")
            .path_arg(&req.input_path)
            .arg("-of")
            .path_arg(output_base);

        cmd = match req.format {
            OutputFormat::Srt => cmd.arg("--output-srt"),
            OutputFormat::Txt => cmd.arg("--output-txt"),
        };

        if !req.language.is_empty() {
            cmd = cmd.arg("--language").arg(&req.language);
        }

        cmd
    }

    fn render_command(
        &self,
        audio_path: &Path,
        subtitle_path: &Path,
        output_path: &Path,
        duration_secs: f64,
    ) -> ToolCommand {
        ToolCommand::new(&self.config.ffmpeg_bin)
            .args(["-y", "-v", "error"])
            .args(["-f", "lavfi"])
            .arg("-i")
            .arg(format!(
                "color=c=black:s={}x{}:r={}:d={:.3}",
                RENDER_WIDTH, RENDER_HEIGHT, RENDER_FPS, duration_secs
            ))
            .arg("-i")
            .path_arg(audio_path)
            .arg("-vf")
            .arg(subtitles_filter_arg(subtitle_path))
            .args(["-c:v", "libx264", "-c:a", "aac", "-shortest"])
            .path_arg(output_path)
    }
}

#[async_trait]
impl ExternalTool for CliTools {
    async fn transcribe(&self, req: &TranscribeRequest) -> MediaResult<TranscriptResult> {
        info!(
            input = %req.input_path.display(),
            model = %req.model,
            format = %req.format,
            "Transcribing"
        );

        self.transcribe_command(req).run().await?;

        Ok(TranscriptResult {
            input_path: req.input_path.clone(),
            output_path: req.output_path.clone(),
        })
    }

    async fn render_subtitled_video(
        &self,
        audio_path: &Path,
        subtitle_path: &Path,
    ) -> MediaResult<VideoResult> {
        let output_path = rendered_video_path(audio_path);
        let duration = self.probe_duration(audio_path).await?;

        info!(
            audio = %audio_path.display(),
            subtitles = %subtitle_path.display(),
            duration_secs = duration,
            "Rendering subtitled video"
        );

        self.render_command(audio_path, subtitle_path, &output_path, duration)
            .run()
            .await?;

        Ok(VideoResult { output_path })
    }

    async fn probe_duration(&self, path: &Path) -> MediaResult<f64> {
        probe::probe_duration(&self.config.ffprobe_bin, path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tools() -> CliTools {
        CliTools::new(ToolConfig {
            transcriber_bin: PathBuf::from("whisper-cli"),
            ffmpeg_bin: PathBuf::from("ffmpeg"),
            ffprobe_bin: PathBuf::from("ffprobe"),
            model_dir: PathBuf::from("/app/models"),
        })
    }

    #[test]
    fn transcribe_args_with_language() {
        let req = TranscribeRequest {
            input_path: PathBuf::from("/uploads/uid_talk"),
            output_path: PathBuf::from("/uploads/uid_talk.srt"),
            language: "de".to_string(),
            format: OutputFormat::Srt,
            model: "base".to_string(),
        };

        let cmd = tools().transcribe_command(&req);
        let args = cmd.build_args();

        assert_eq!(args[0], "-m");
        assert_eq!(args[1], "/app/models/base");
        assert_eq!(args[2], "-f");
        assert_eq!(args[3], "/uploads/uid_talk");
        assert_eq!(args[4], "-of");
        assert_eq!(args[5], "/uploads/uid_talk");
        assert!(args.contains(&"--output-srt".to_string()));
        let lang_pos = args.iter().position(|a| a == "--language").unwrap();
        assert_eq!(args[lang_pos + 1], "de");
    }

    #[test]
    fn transcribe_args_omit_empty_language() {
        let req = TranscribeRequest {
            input_path: PathBuf::from("/uploads/uid_talk"),
            output_path: PathBuf::from("/uploads/uid_talk.txt"),
            language: String::new(),
            format: OutputFormat::Txt,
            model: "base".to_string(),
        };

        let args = tools().transcribe_command(&req).build_args().to_vec();
        assert!(args.contains(&"--output-txt".to_string()));
        assert!(!args.contains(&"--language".to_string()));
    }

    #[test]
    fn render_args_fix_resolution_and_shortest() {
        let cmd = tools().render_command(
            Path::new("/uploads/uid_talk"),
            Path::new("/uploads/uid_talk.srt"),
            Path::new("/uploads/uid_talk.mp4"),
            42.5,
        );
        let args = cmd.build_args();

        let color = args
            .iter()
            .find(|a| a.starts_with("color="))
            .expect("color source present");
        assert!(color.contains("s=1280x720"));
        assert!(color.contains("r=25"));
        assert!(color.contains("d=42.500"));
        assert!(args.contains(&"-shortest".to_string()));
        assert!(args.contains(&"subtitles='/uploads/uid_talk.srt'".to_string()));
        assert_eq!(args.last().unwrap(), "/uploads/uid_talk.mp4");
    }

    #[test]
    fn rendered_path_derives_from_audio() {
        assert_eq!(
            rendered_video_path(Path::new("/uploads/uid_talk")),
            PathBuf::from("/uploads/uid_talk.mp4")
        );
    }
}
