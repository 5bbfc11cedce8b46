//! Configuration types for clipfetch

use crate::error::{Error, Result};
use crate::types::{MediaFormat, Quality};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::Path, path::PathBuf, time::Duration};

/// Job execution configuration (storage, concurrency, defaults)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Directory finished artifacts are written to and served from (default: "./downloads")
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    /// Maximum number of fetch engines running at once (default: 3)
    ///
    /// Submissions beyond this limit stay `pending` until a slot frees up.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_jobs: usize,

    /// Format used when a submission does not specify one
    #[serde(default)]
    pub default_format: MediaFormat,

    /// Quality used when a submission does not specify one
    #[serde(default)]
    pub default_quality: Quality,

    /// How long shutdown waits for running jobs (default: 30 seconds)
    #[serde(default = "default_shutdown_timeout", with = "duration_serde")]
    pub shutdown_timeout: Duration,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            max_concurrent_jobs: default_max_concurrent(),
            default_format: MediaFormat::default(),
            default_quality: Quality::default(),
            shutdown_timeout: default_shutdown_timeout(),
        }
    }
}

/// External tool paths
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Path to yt-dlp executable (auto-detected if None)
    #[serde(default)]
    pub ytdlp_path: Option<PathBuf>,

    /// Directory containing ffmpeg/ffprobe, passed to yt-dlp (yt-dlp searches PATH if None)
    #[serde(default)]
    pub ffmpeg_location: Option<PathBuf>,

    /// Whether to search PATH for external binaries if explicit paths not set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: None,
            ffmpeg_location: None,
            search_path: true,
        }
    }
}

/// Options handed to the fetch engine for every job
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Netscape-format cookie file, used only when it exists (default: "cookies.txt")
    #[serde(default = "default_cookie_file")]
    pub cookie_file: Option<PathBuf>,

    /// HTTP headers presented to the media site, as (name, value) pairs
    #[serde(default = "default_http_headers")]
    pub http_headers: Vec<(String, String)>,

    /// Extractor arguments (default: "youtube:player_client=android,web")
    #[serde(default = "default_extractor_args")]
    pub extractor_args: Vec<String>,

    /// Container used when video and audio streams are merged (default: "mp4")
    #[serde(default = "default_merge_output_format")]
    pub merge_output_format: String,

    /// Codec audio-only jobs are converted to (default: "mp3")
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,

    /// Audio quality passed to the converter (default: "192")
    #[serde(default = "default_audio_quality")]
    pub audio_quality: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            cookie_file: default_cookie_file(),
            http_headers: default_http_headers(),
            extractor_args: default_extractor_args(),
            merge_output_format: default_merge_output_format(),
            audio_codec: default_audio_codec(),
            audio_quality: default_audio_quality(),
        }
    }
}

impl FetchConfig {
    /// The cookie file, if one is configured and present on disk
    pub fn existing_cookie_file(&self) -> Option<&Path> {
        self.cookie_file
            .as_deref()
            .filter(|path| path.is_file())
    }
}

/// Main configuration
///
/// Fields are organized into logical sub-configs:
/// - [`download`](DownloadConfig) - artifact directory, concurrency, defaults
/// - [`tools`](ToolsConfig) - external binary paths
/// - [`fetch`](FetchConfig) - options forwarded to the fetch engine
/// - [`server`](ServerIntegrationConfig) - REST API
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Job execution settings
    #[serde(default)]
    pub download: DownloadConfig,

    /// External tool paths
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Fetch engine options
    #[serde(default)]
    pub fetch: FetchConfig,

    /// API server settings
    #[serde(default)]
    pub server: ServerIntegrationConfig,
}

impl Config {
    /// Artifact directory
    pub fn download_dir(&self) -> &PathBuf {
        &self.download.download_dir
    }

    /// Load configuration from a JSON file
    ///
    /// Missing fields take their defaults, so `{}` is a valid file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("failed to read {}: {}", path.display(), e),
            key: None,
        })?;
        let config: Config = serde_json::from_str(&content).map_err(|e| Error::Config {
            message: format!("failed to parse {}: {}", path.display(), e),
            key: None,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that deserialize fine but cannot run
    pub fn validate(&self) -> Result<()> {
        if self.download.max_concurrent_jobs == 0 {
            return Err(Error::Config {
                message: "max_concurrent_jobs must be at least 1".into(),
                key: Some("max_concurrent_jobs".into()),
            });
        }
        if self.fetch.audio_codec.trim().is_empty() {
            return Err(Error::Config {
                message: "audio_codec must not be empty".into(),
                key: Some("audio_codec".into()),
            });
        }
        if self.fetch.merge_output_format.trim().is_empty() {
            return Err(Error::Config {
                message: "merge_output_format must not be empty".into(),
                key: Some("merge_output_format".into()),
            });
        }
        Ok(())
    }
}

/// API and external server integration configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ServerIntegrationConfig {
    /// REST API configuration
    #[serde(default)]
    pub api: ApiConfig,
}

/// REST API configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Address to bind to (default: 127.0.0.1:5000)
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,

    /// Enable CORS for browser access (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Enable Swagger UI at /swagger-ui (default: true)
    #[serde(default = "default_true")]
    pub swagger_ui: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: true,
        }
    }
}

// Default value functions
fn default_download_dir() -> PathBuf {
    PathBuf::from("downloads")
}

fn default_max_concurrent() -> usize {
    3
}

fn default_shutdown_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_true() -> bool {
    true
}

fn default_cookie_file() -> Option<PathBuf> {
    Some(PathBuf::from("cookies.txt"))
}

fn default_http_headers() -> Vec<(String, String)> {
    vec![
        (
            "User-Agent".into(),
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".into(),
        ),
        (
            "Accept".into(),
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8".into(),
        ),
        ("Accept-Language".into(), "en-us,en;q=0.5".into()),
    ]
}

fn default_extractor_args() -> Vec<String> {
    vec!["youtube:player_client=android,web".into()]
}

fn default_merge_output_format() -> String {
    "mp4".into()
}

fn default_audio_codec() -> String {
    "mp3".into()
}

fn default_audio_quality() -> String {
    "192".into()
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 5000))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".into()]
}

// Duration serialization helper (whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
