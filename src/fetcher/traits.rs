//! Traits and types for media fetch engines

use super::format::Selection;
use crate::error::FetchError;
use crate::types::{MediaFormat, Quality};
use async_trait::async_trait;
use std::path::PathBuf;

/// Everything a fetch engine needs to produce one artifact
#[derive(Debug, Clone)]
pub struct FetchRequest {
    /// Media page URL
    pub url: String,
    /// Requested format
    pub format: MediaFormat,
    /// Requested quality ceiling
    pub quality: Quality,
    /// Output path template, e.g. `downloads/<job id>.%(ext)s`
    pub output_template: PathBuf,
    /// Format expression and post-processing derived from format and quality
    pub selection: Selection,
    /// Cookie file, only set when it exists on disk
    pub cookie_file: Option<PathBuf>,
    /// Headers presented to the media site
    pub http_headers: Vec<(String, String)>,
    /// Engine-specific extractor arguments
    pub extractor_args: Vec<String>,
}

/// What the engine produced
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactInfo {
    /// Final path of the artifact as reported by the engine
    pub path: PathBuf,
    /// Media title, if the engine reported one
    pub title: Option<String>,
    /// Whether separate video and audio streams were merged into one container
    pub merged: bool,
}

/// Phase of a progress notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressPhase {
    /// Bytes are being transferred
    Downloading,
    /// The transfer of one stream completed
    Finished,
    /// Any other engine status
    Other(String),
}

impl ProgressPhase {
    /// Map an engine status word onto a phase
    pub fn from_status(status: &str) -> Self {
        match status.trim() {
            "downloading" => Self::Downloading,
            "finished" => Self::Finished,
            other => Self::Other(other.to_string()),
        }
    }
}

/// One progress notification, as emitted by the engine
///
/// `percent` is the raw percentage text and may carry padding or terminal
/// color codes. Interpreting it is up to the sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    /// Phase reported by the engine
    pub phase: ProgressPhase,
    /// Raw percentage text, if any
    pub percent: Option<String>,
}

impl ProgressEvent {
    /// A `downloading` event carrying raw percentage text
    pub fn downloading(percent: impl Into<String>) -> Self {
        Self {
            phase: ProgressPhase::Downloading,
            percent: Some(percent.into()),
        }
    }

    /// A `finished` event
    pub fn finished() -> Self {
        Self {
            phase: ProgressPhase::Finished,
            percent: None,
        }
    }
}

/// Receiver for progress notifications
///
/// `report` cannot fail: whatever goes wrong while applying an event stays
/// inside the sink and never aborts the fetch.
pub trait ProgressSink: Send + Sync {
    /// Apply one progress notification
    fn report(&self, event: ProgressEvent);
}

/// Capabilities of a fetch engine implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetcherCapabilities {
    /// Can fetch media at all
    pub can_fetch: bool,
    /// Can convert to audio-only artifacts (needs ffmpeg)
    pub can_extract_audio: bool,
}

/// Trait for media fetch engines
///
/// Implementations turn a [`FetchRequest`] into one file on disk, reporting
/// progress along the way. The job runner holds the engine as a trait object,
/// so tests substitute scripted fakes.
///
/// # Examples
///
/// ```no_run
/// use clipfetch::fetcher::{MediaFetcher, YtDlpFetcher};
///
/// let fetcher = YtDlpFetcher::from_path().expect("yt-dlp not found in PATH");
/// println!("{} can fetch: {}", fetcher.name(), fetcher.capabilities().can_fetch);
/// ```
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Fetch the media described by `request`
    ///
    /// Progress notifications are delivered to `progress` in the order the
    /// engine emits them.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The engine binary cannot be started
    /// - The engine exits unsuccessfully (network, unavailable format, disk)
    /// - The engine never reports an output file
    /// - No engine is available (for stub implementations)
    async fn fetch(
        &self,
        request: &FetchRequest,
        progress: &dyn ProgressSink,
    ) -> Result<ArtifactInfo, FetchError>;

    /// Query capabilities of this engine
    fn capabilities(&self) -> FetcherCapabilities;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
