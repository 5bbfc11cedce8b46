//! Media fetch engines
//!
//! The job runner never talks to yt-dlp directly. It holds a
//! [`MediaFetcher`] trait object and hands it a [`FetchRequest`] plus a
//! [`ProgressSink`]. Implementations:
//!
//! - [`YtDlpFetcher`]: runs the external `yt-dlp` binary
//! - [`NoOpFetcher`]: stub used when yt-dlp is unavailable
//!
//! [`format`] turns a requested format and quality into the engine's format
//! expression, and [`parser`] classifies the engine's console output.
//!
//! ## Usage
//!
//! ```no_run
//! use clipfetch::config::ToolsConfig;
//! use clipfetch::fetcher::fetcher_from_config;
//!
//! let fetcher = fetcher_from_config(&ToolsConfig::default());
//! println!("using {}", fetcher.name());
//! ```

mod cli;
pub mod format;
mod noop;
pub mod parser;
mod traits;

use crate::config::ToolsConfig;
use std::sync::Arc;

pub use cli::YtDlpFetcher;
pub use format::{PostProcess, Selection};
pub use noop::NoOpFetcher;
pub use traits::{
    ArtifactInfo, FetchRequest, FetcherCapabilities, MediaFetcher, ProgressEvent, ProgressPhase,
    ProgressSink,
};

/// Pick the fetch engine described by tool configuration
///
/// Uses the configured yt-dlp path, else searches PATH when allowed, else
/// falls back to [`NoOpFetcher`].
pub fn fetcher_from_config(tools: &ToolsConfig) -> Arc<dyn MediaFetcher> {
    let fetcher: Arc<dyn MediaFetcher> = match YtDlpFetcher::from_config(tools) {
        Some(fetcher) => Arc::new(fetcher),
        None => {
            tracing::warn!("yt-dlp not found, downloads will fail until it is installed");
            Arc::new(NoOpFetcher)
        }
    };

    let caps = fetcher.capabilities();
    tracing::info!(
        fetcher = fetcher.name(),
        can_fetch = caps.can_fetch,
        can_extract_audio = caps.can_extract_audio,
        "Media fetcher initialized"
    );
    fetcher
}
