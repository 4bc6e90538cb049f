//! Subtitle-filter argument construction.
//!
//! The only genuinely platform-sensitive detail of the render invocation:
//! ffmpeg's filter grammar treats `\` and `:` specially, so backslash-style
//! host paths are normalized to forward slashes and colons are escaped.

use std::path::Path;

/// Build the `-vf` argument burning a subtitle file into the video stream.
pub fn subtitles_filter_arg(subtitle_path: &Path) -> String {
    format!(
        "subtitles='{}'",
        escape_filter_path(&subtitle_path.to_string_lossy())
    )
}

fn escape_filter_path(raw: &str) -> String {
    raw.replace('\\', "/").replace(':', "\\:")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn unix_paths_pass_through() {
        let arg = subtitles_filter_arg(&PathBuf::from("/uploads/uid_talk.srt"));
        assert_eq!(arg, "subtitles='/uploads/uid_talk.srt'");
    }

    #[test]
    fn backslashes_normalized_and_colons_escaped() {
        assert_eq!(
            escape_filter_path(r"C:\media\uid_talk.srt"),
            r"C\:/media/uid_talk.srt"
        );
    }
}
