//! External engine adapter for the Scriba pipeline.
//!
//! This crate provides:
//! - The `ExternalTool` trait the worker depends on
//! - `CliTools`, the production implementation invoking the transcription
//!   CLI and ffmpeg/ffprobe as out-of-process commands
//! - Command building, audio probing, subtitle-filter path escaping

pub mod command;
pub mod error;
pub mod filter;
pub mod probe;
pub mod tool;

pub use command::ToolCommand;
pub use error::{MediaError, MediaResult};
pub use filter::subtitles_filter_arg;
pub use probe::parse_duration;
pub use tool::{rendered_video_path, CliTools, ExternalTool, ToolConfig, TranscribeRequest};
