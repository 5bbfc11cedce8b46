//! Fetch engine driving the external yt-dlp binary

use super::format::PostProcess;
use super::parser::{
    FILE_PREFIX, OutputLine, PROGRESS_PREFIX, TITLE_PREFIX, last_error_line, parse_stdout_line,
};
use super::traits::{ArtifactInfo, FetchRequest, FetcherCapabilities, MediaFetcher, ProgressSink};
use crate::config::ToolsConfig;
use crate::error::FetchError;
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;

/// Fetch engine that runs `yt-dlp` as a child process
///
/// Progress is read from stdout line by line while the process runs, so the
/// job record moves as the transfer does. Stderr is collected in full and
/// its last `ERROR:` line becomes the failure message.
///
/// # Examples
///
/// ```no_run
/// use clipfetch::fetcher::YtDlpFetcher;
/// use std::path::PathBuf;
///
/// // Explicit binary
/// let fetcher = YtDlpFetcher::new(PathBuf::from("/usr/local/bin/yt-dlp"));
///
/// // Or auto-discover from PATH
/// let fetcher = YtDlpFetcher::from_path().expect("yt-dlp not found in PATH");
/// ```
#[derive(Debug, Clone)]
pub struct YtDlpFetcher {
    binary_path: PathBuf,
    ffmpeg_location: Option<PathBuf>,
    ffmpeg_available: bool,
}

impl YtDlpFetcher {
    /// Create a fetcher with an explicit binary path
    ///
    /// ffmpeg is looked up in PATH to report audio extraction support.
    pub fn new(binary_path: PathBuf) -> Self {
        Self {
            binary_path,
            ffmpeg_location: None,
            ffmpeg_available: which::which("ffmpeg").is_ok(),
        }
    }

    /// Attempt to find yt-dlp in PATH
    pub fn from_path() -> Option<Self> {
        which::which("yt-dlp").ok().map(Self::new)
    }

    /// Build a fetcher from tool configuration
    ///
    /// Returns `None` when no binary is configured and PATH search is
    /// disabled or finds nothing.
    pub fn from_config(tools: &ToolsConfig) -> Option<Self> {
        let binary_path = match &tools.ytdlp_path {
            Some(path) => path.clone(),
            None if tools.search_path => which::which("yt-dlp").ok()?,
            None => return None,
        };

        let ffmpeg_available = tools.ffmpeg_location.is_some()
            || (tools.search_path && which::which("ffmpeg").is_ok());

        Some(Self {
            binary_path,
            ffmpeg_location: tools.ffmpeg_location.clone(),
            ffmpeg_available,
        })
    }

    /// Use ffmpeg from this location instead of PATH
    pub fn with_ffmpeg_location(mut self, location: PathBuf) -> Self {
        self.ffmpeg_location = Some(location);
        self.ffmpeg_available = true;
        self
    }

    /// Path of the yt-dlp binary
    pub fn binary_path(&self) -> &PathBuf {
        &self.binary_path
    }

    /// Command line arguments for one request
    pub fn build_args(&self, request: &FetchRequest) -> Vec<OsString> {
        let mut args: Vec<OsString> = [
            "--newline",
            "--no-warnings",
            "--no-playlist",
            "--no-colors",
            "--progress",
            "--progress-template",
        ]
        .iter()
        .map(OsString::from)
        .collect();

        args.push(
            format!(
                "download:{PROGRESS_PREFIX}|%(progress.status)s|%(progress._percent_str)s"
            )
            .into(),
        );
        args.push("--print".into());
        args.push(format!("after_move:{TITLE_PREFIX}|%(title)s").into());
        args.push("--print".into());
        args.push(format!("after_move:{FILE_PREFIX}|%(filepath)s").into());

        args.push("-o".into());
        args.push(request.output_template.clone().into_os_string());
        args.push("-f".into());
        args.push(request.selection.expression.clone().into());

        match &request.selection.post_process {
            PostProcess::Merge { container } => {
                args.push("--merge-output-format".into());
                args.push(container.into());
            }
            PostProcess::ExtractAudio { codec, quality } => {
                args.push("--extract-audio".into());
                args.push("--audio-format".into());
                args.push(codec.into());
                args.push("--audio-quality".into());
                args.push(quality.into());
            }
        }

        for (name, value) in &request.http_headers {
            args.push("--add-header".into());
            args.push(format!("{name}:{value}").into());
        }

        for extractor_args in &request.extractor_args {
            args.push("--extractor-args".into());
            args.push(extractor_args.into());
        }

        if let Some(cookies) = &request.cookie_file {
            args.push("--cookies".into());
            args.push(cookies.clone().into_os_string());
        }

        if let Some(ffmpeg) = &self.ffmpeg_location {
            args.push("--ffmpeg-location".into());
            args.push(ffmpeg.clone().into_os_string());
        }

        // `--` keeps a URL starting with '-' from being read as an option
        args.push("--".into());
        args.push(request.url.clone().into());
        args
    }
}

#[async_trait]
impl MediaFetcher for YtDlpFetcher {
    async fn fetch(
        &self,
        request: &FetchRequest,
        progress: &dyn ProgressSink,
    ) -> Result<ArtifactInfo, FetchError> {
        let mut child = Command::new(&self.binary_path)
            .args(self.build_args(request))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| FetchError::Spawn {
                program: self.binary_path.display().to_string(),
                source,
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| std::io::Error::other("yt-dlp stdout was not captured"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| std::io::Error::other("yt-dlp stderr was not captured"))?;

        // Both pipes are drained concurrently so neither can fill up and stall the child
        let read_stdout = async {
            let mut lines = BufReader::new(stdout).lines();
            let mut path = None;
            let mut title = None;
            let mut merged = false;

            while let Some(line) = lines.next_line().await? {
                match parse_stdout_line(&line) {
                    OutputLine::Progress(event) => progress.report(event),
                    OutputLine::File(file) => path = Some(file),
                    OutputLine::Title(name) => title = Some(name),
                    OutputLine::Merging(_) => merged = true,
                    OutputLine::Other => {}
                }
            }
            Ok::<_, std::io::Error>((path, title, merged))
        };
        let read_stderr = async {
            let mut buf = Vec::new();
            stderr.read_to_end(&mut buf).await?;
            Ok::<_, std::io::Error>(String::from_utf8_lossy(&buf).into_owned())
        };

        let (stdout_result, stderr_result) = tokio::join!(read_stdout, read_stderr);
        let status = child.wait().await?;
        let (path, title, merged) = stdout_result?;
        let stderr_text = stderr_result.unwrap_or_default();

        if !status.success() {
            let message = last_error_line(&stderr_text)
                .unwrap_or_else(|| format!("yt-dlp exited with {status}"));
            tracing::debug!(
                exit_code = ?status.code(),
                stderr = %stderr_text,
                "yt-dlp failed"
            );
            return Err(FetchError::Engine {
                message,
                exit_code: status.code(),
            });
        }

        let path = path.ok_or(FetchError::MissingOutput)?;
        Ok(ArtifactInfo {
            path,
            title,
            merged,
        })
    }

    fn capabilities(&self) -> FetcherCapabilities {
        FetcherCapabilities {
            can_fetch: true,
            can_extract_audio: self.ffmpeg_available,
        }
    }

    fn name(&self) -> &'static str {
        "yt-dlp"
    }
}
