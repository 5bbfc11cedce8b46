//! No-op fetch engine for graceful degradation

use super::traits::{ArtifactInfo, FetchRequest, FetcherCapabilities, MediaFetcher, ProgressSink};
use crate::error::FetchError;
use async_trait::async_trait;

/// Fetch engine used when yt-dlp is unavailable
///
/// The server still starts and answers status queries; every job it
/// receives ends in the `error` state with an explanation.
///
/// # Examples
///
/// ```
/// use clipfetch::fetcher::{MediaFetcher, NoOpFetcher};
///
/// let fetcher = NoOpFetcher;
/// assert!(!fetcher.capabilities().can_fetch);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpFetcher;

#[async_trait]
impl MediaFetcher for NoOpFetcher {
    async fn fetch(
        &self,
        _request: &FetchRequest,
        _progress: &dyn ProgressSink,
    ) -> Result<ArtifactInfo, FetchError> {
        Err(FetchError::NotSupported(
            "media download requires the external yt-dlp binary. \
             Configure ytdlp_path in config or ensure yt-dlp is in PATH."
                .into(),
        ))
    }

    fn capabilities(&self) -> FetcherCapabilities {
        FetcherCapabilities {
            can_fetch: false,
            can_extract_audio: false,
        }
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}
