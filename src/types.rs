//! Core types for clipfetch

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Unique identifier for a job
///
/// A random (v4) UUID, so identifiers never collide with one another and
/// cannot be guessed from earlier submissions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = String, format = Uuid)]
pub struct JobId(pub Uuid);

impl JobId {
    /// Generate a fresh random identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the inner UUID
    pub fn get(&self) -> Uuid {
        self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for JobId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for JobId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// Job status
///
/// `Pending → Downloading → Finished | Errored`. The two last states are terminal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Accepted, waiting for a free fetch slot
    #[default]
    Pending,
    /// The fetch engine is running
    Downloading,
    /// The artifact is ready
    Finished,
    /// The fetch failed
    #[serde(rename = "error")]
    Errored,
}

impl JobStatus {
    /// Returns true if no further transitions can occur
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished | Self::Errored)
    }

    /// Returns the status as its wire identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Downloading => "downloading",
            Self::Finished => "finished",
            Self::Errored => "error",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requested media format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MediaFormat {
    /// Audio only, extracted to the configured audio codec
    #[serde(alias = "mp3")]
    Audio,
    /// Video with audio (default, and the fallback for unknown tags)
    #[default]
    #[serde(other)]
    Video,
}

impl MediaFormat {
    /// Returns the format as its wire identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
        }
    }
}

/// Requested quality ceiling
///
/// Only meaningful for [`MediaFormat::Video`]. Unknown tags select
/// [`Quality::Best`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Quality {
    /// At most 2160 lines
    #[serde(rename = "4k", alias = "2160p")]
    Uhd,
    /// At most 1080 lines
    #[serde(rename = "1080p")]
    FullHd,
    /// At most 720 lines (default)
    #[default]
    #[serde(rename = "720p")]
    Hd,
    /// Whatever the engine considers best
    #[serde(rename = "best", other)]
    Best,
}

impl Quality {
    /// Returns the quality as its wire identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uhd => "4k",
            Self::FullHd => "1080p",
            Self::Hd => "720p",
            Self::Best => "best",
        }
    }

    /// Maximum video height for this quality, if bounded
    pub fn max_height(&self) -> Option<u32> {
        match self {
            Self::Uhd => Some(2160),
            Self::FullHd => Some(1080),
            Self::Hd => Some(720),
            Self::Best => None,
        }
    }
}

/// Snapshot of one job
///
/// Serialized as the body of `GET /api/status/:id`. Optional fields are
/// omitted while unset, so a pending job reads `{status, progress, ready, …}`
/// and only a terminal job carries `file`/`title` or `error`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct JobRecord {
    /// Job identifier
    pub id: JobId,

    /// Current status
    pub status: JobStatus,

    /// Progress percentage (0.0 to 100.0)
    pub progress: f64,

    /// Whether the artifact can be fetched
    pub ready: bool,

    /// Artifact file name (basename), set when finished
    #[serde(rename = "file", skip_serializing_if = "Option::is_none")]
    pub artifact_file: Option<String>,

    /// Media title, set when finished
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Failure cause, set when errored
    #[serde(rename = "error", skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// Requested format
    pub format: MediaFormat,

    /// Requested quality
    pub quality: Quality,

    /// When the job was submitted
    pub created_at: DateTime<Utc>,

    /// When the fetch engine was started
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    /// When the job reached a terminal state
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl JobRecord {
    /// Create a pending record with zero progress
    pub fn new(id: JobId, format: MediaFormat, quality: Quality) -> Self {
        Self {
            id,
            status: JobStatus::Pending,
            progress: 0.0,
            ready: false,
            artifact_file: None,
            title: None,
            error_message: None,
            format,
            quality,
            created_at: Utc::now(),
            started_at: None,
            finished_at: None,
        }
    }

    /// Returns true if the job is in a terminal state
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Marks the fetch as started
    pub fn mark_downloading(&mut self) {
        self.status = JobStatus::Downloading;
        self.started_at = Some(Utc::now());
    }

    /// Marks the job finished with its artifact
    pub fn mark_finished(&mut self, file: String, title: String) {
        self.status = JobStatus::Finished;
        self.ready = true;
        self.progress = 100.0;
        self.artifact_file = Some(file);
        self.title = Some(title);
        self.error_message = None;
        self.finished_at = Some(Utc::now());
    }

    /// Marks the job errored with a human-readable cause
    pub fn mark_errored(&mut self, message: String) {
        self.status = JobStatus::Errored;
        self.ready = false;
        self.artifact_file = None;
        self.title = None;
        self.error_message = Some(message);
        self.finished_at = Some(Utc::now());
    }
}

/// Options for submitting a job
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DownloadRequest {
    /// Media page URL handed to the fetch engine
    #[serde(default)]
    pub url: Option<String>,

    /// Requested format (configured default when absent)
    #[serde(default)]
    pub format: Option<MediaFormat>,

    /// Requested quality (configured default when absent)
    #[serde(default)]
    pub quality: Option<Quality>,
}

impl DownloadRequest {
    /// Convenience constructor
    pub fn new(url: impl Into<String>, format: MediaFormat, quality: Quality) -> Self {
        Self {
            url: Some(url.into()),
            format: Some(format),
            quality: Some(quality),
        }
    }
}

/// Response body for a submitted job
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct SubmitResponse {
    /// Identifier to poll
    pub id: JobId,
}

/// System capabilities
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct Capabilities {
    /// Fetch engine capabilities
    pub fetcher: FetcherCapabilitiesInfo,
}

/// Fetch engine information
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct FetcherCapabilitiesInfo {
    /// Whether media can be fetched at all
    pub can_fetch: bool,
    /// Whether audio extraction is available
    pub can_extract_audio: bool,
    /// Engine implementation name
    pub engine: String,
}
