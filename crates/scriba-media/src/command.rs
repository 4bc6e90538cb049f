//! Engine command builder and runner.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use crate::error::{MediaError, MediaResult};

/// Builder for an external engine invocation.
///
/// Re-running the same command with identical arguments overwrites the
/// prior output, so invocations stay safe under at-least-once delivery.
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<String>,
}

impl ToolCommand {
    /// Create a new command for the given engine binary.
    pub fn new(program: impl AsRef<Path>) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
        }
    }

    /// Add one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Add a path argument.
    pub fn path_arg(self, path: impl AsRef<Path>) -> Self {
        let p = path.as_ref().to_string_lossy().to_string();
        self.arg(p)
    }

    /// The engine binary this command runs.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// The built argument list.
    pub fn build_args(&self) -> &[String] {
        &self.args
    }

    /// Run the command to completion, capturing output.
    ///
    /// A non-zero exit maps to `MediaError::EngineFailed` carrying the raw
    /// stderr text.
    pub async fn run(&self) -> MediaResult<Vec<u8>> {
        which::which(&self.program).map_err(|_| MediaError::EngineNotFound(self.program.clone()))?;

        debug!(
            "Running engine: {} {}",
            self.program.display(),
            self.args.join(" ")
        );

        let output = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if output.status.success() {
            Ok(output.stdout)
        } else {
            let engine = self
                .program
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| self.program.display().to_string());
            Err(MediaError::engine_failed(
                engine,
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
                output.status.code(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_builder() {
        let cmd = ToolCommand::new("whisper-cli")
            .arg("-m")
            .path_arg("/models/base")
            .arg("-f")
            .path_arg("/uploads/a_talk")
            .arg("--output-srt");

        let args = cmd.build_args();
        assert_eq!(args[0], "-m");
        assert_eq!(args[1], "/models/base");
        assert!(args.contains(&"--output-srt".to_string()));
        assert_eq!(cmd.program(), Path::new("whisper-cli"));
    }
}
