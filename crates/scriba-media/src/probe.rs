//! FFprobe duration probing.

use serde::Deserialize;
use std::path::Path;

use crate::command::ToolCommand;
use crate::error::{MediaError, MediaResult};

/// FFprobe JSON output, trimmed to what the render stage needs.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

/// Probe a media file's duration in seconds.
pub async fn probe_duration(ffprobe_bin: &Path, path: &Path) -> MediaResult<f64> {
    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    let stdout = ToolCommand::new(ffprobe_bin)
        .args(["-v", "quiet", "-print_format", "json", "-show_format"])
        .path_arg(path)
        .run()
        .await
        .map_err(|e| match e {
            MediaError::EngineFailed { stderr, .. } => MediaError::ProbeFailed {
                message: "FFprobe failed".to_string(),
                stderr: Some(stderr),
            },
            other => other,
        })?;

    parse_duration(&stdout)
}

/// Parse the duration field out of ffprobe's JSON output.
pub fn parse_duration(stdout: &[u8]) -> MediaResult<f64> {
    let probe: FfprobeOutput = serde_json::from_slice(stdout)?;

    probe
        .format
        .duration
        .as_deref()
        .and_then(|d| d.parse::<f64>().ok())
        .ok_or(MediaError::MissingDuration)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_duration_from_probe_json() {
        let json = br#"{"format":{"duration":"12.345","size":"1024"}}"#;
        let duration = parse_duration(json).expect("parse duration");
        assert!((duration - 12.345).abs() < 1e-9);
    }

    #[test]
    fn missing_duration_is_an_error() {
        let json = br#"{"format":{"size":"1024"}}"#;
        assert!(matches!(
            parse_duration(json),
            Err(MediaError::MissingDuration)
        ));
    }
}
