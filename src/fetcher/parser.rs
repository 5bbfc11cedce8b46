//! Parser for yt-dlp console output

use super::traits::{ProgressEvent, ProgressPhase};
use std::path::PathBuf;

/// Prefix of lines produced by our `--progress-template`
pub const PROGRESS_PREFIX: &str = "clipfetch-progress";

/// Prefix of the `--print after_move:` line carrying the final file path
pub const FILE_PREFIX: &str = "clipfetch-file";

/// Prefix of the `--print after_move:` line carrying the media title
pub const TITLE_PREFIX: &str = "clipfetch-title";

const MERGER_MARKER: &str = "[Merger] Merging formats into ";

/// One classified line of yt-dlp stdout
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputLine {
    /// A progress notification
    Progress(ProgressEvent),
    /// Final path of the artifact
    File(PathBuf),
    /// Media title
    Title(String),
    /// Separate streams are being merged into this path
    Merging(PathBuf),
    /// Anything else (extractor chatter, post-processor notices)
    Other,
}

/// Classify one line of yt-dlp stdout
pub fn parse_stdout_line(line: &str) -> OutputLine {
    let line = line.trim_end_matches(['\r', '\n']);

    if let Some(rest) = strip_field(line, PROGRESS_PREFIX) {
        let (status, percent) = match rest.split_once('|') {
            Some((status, percent)) => (status, Some(percent.to_string())),
            None => (rest, None),
        };
        return OutputLine::Progress(ProgressEvent {
            phase: ProgressPhase::from_status(status),
            percent,
        });
    }

    if let Some(path) = strip_field(line, FILE_PREFIX) {
        let path = path.trim();
        if path.is_empty() || path == "NA" {
            return OutputLine::Other;
        }
        return OutputLine::File(PathBuf::from(path));
    }

    if let Some(title) = strip_field(line, TITLE_PREFIX) {
        let title = title.trim();
        if title.is_empty() || title == "NA" {
            return OutputLine::Other;
        }
        return OutputLine::Title(title.to_string());
    }

    if let Some(target) = line.strip_prefix(MERGER_MARKER) {
        return OutputLine::Merging(PathBuf::from(target.trim().trim_matches('"')));
    }

    OutputLine::Other
}

/// The most relevant error line from yt-dlp stderr
///
/// Prefers the last `ERROR:` line, falling back to the last non-empty line.
pub fn last_error_line(stderr: &str) -> Option<String> {
    let lines: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    lines
        .iter()
        .rev()
        .find(|line| line.starts_with("ERROR:"))
        .or_else(|| lines.last())
        .map(|line| line.to_string())
}

fn strip_field<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    line.strip_prefix(prefix)?.strip_prefix('|')
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_line_keeps_raw_percent_text() {
        let line = "clipfetch-progress|downloading|\x1b[0;94m 45.2%\x1b[0m";
        assert_eq!(
            parse_stdout_line(line),
            OutputLine::Progress(ProgressEvent::downloading("\x1b[0;94m 45.2%\x1b[0m"))
        );
    }

    #[test]
    fn finished_progress_line() {
        let line = "clipfetch-progress|finished|100.0%";
        match parse_stdout_line(line) {
            OutputLine::Progress(event) => assert_eq!(event.phase, ProgressPhase::Finished),
            other => panic!("expected progress, got {other:?}"),
        }
    }

    #[test]
    fn progress_line_without_percent() {
        assert_eq!(
            parse_stdout_line("clipfetch-progress|downloading"),
            OutputLine::Progress(ProgressEvent {
                phase: ProgressPhase::Downloading,
                percent: None,
            })
        );
    }

    #[test]
    fn file_and_title_lines() {
        assert_eq!(
            parse_stdout_line("clipfetch-file|downloads/3f2a.mp4\n"),
            OutputLine::File(PathBuf::from("downloads/3f2a.mp4"))
        );
        assert_eq!(
            parse_stdout_line("clipfetch-title|Rick | Roll"),
            OutputLine::Title("Rick | Roll".into())
        );
        assert_eq!(parse_stdout_line("clipfetch-title|NA"), OutputLine::Other);
        assert_eq!(parse_stdout_line("clipfetch-file|"), OutputLine::Other);
    }

    #[test]
    fn merger_notice_is_detected() {
        assert_eq!(
            parse_stdout_line(r#"[Merger] Merging formats into "downloads/3f2a.mp4""#),
            OutputLine::Merging(PathBuf::from("downloads/3f2a.mp4"))
        );
    }

    #[test]
    fn unrelated_lines_are_other() {
        for line in [
            "[youtube] Extracting URL: https://www.youtube.com/watch?v=abc",
            "[download] Destination: downloads/3f2a.f137.mp4",
            "clipfetch-progressive|nope",
            "",
        ] {
            assert_eq!(parse_stdout_line(line), OutputLine::Other, "line {line:?}");
        }
    }

    #[test]
    fn last_error_line_prefers_error_prefix() {
        let stderr = "WARNING: something odd\nERROR: [youtube] abc: Video unavailable\nsome trailing noise\n";
        assert_eq!(
            last_error_line(stderr).as_deref(),
            Some("ERROR: [youtube] abc: Video unavailable")
        );

        assert_eq!(
            last_error_line("\nTraceback follows\nKeyError: 'x'\n\n").as_deref(),
            Some("KeyError: 'x'")
        );
        assert_eq!(last_error_line("  \n"), None);
    }
}
