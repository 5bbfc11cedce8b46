//! Format selection: requested format and quality to engine options

use crate::config::FetchConfig;
use crate::types::{MediaFormat, Quality};

/// Post-processing applied after the streams are downloaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostProcess {
    /// Merge separate video and audio streams into this container
    Merge {
        /// Container extension, e.g. `mp4`
        container: String,
    },
    /// Convert to an audio-only file
    ExtractAudio {
        /// Target codec, also the file extension (e.g. `mp3`)
        codec: String,
        /// Codec quality, e.g. `192`
        quality: String,
    },
}

/// Engine format expression plus the post-processing that goes with it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Format expression handed to the engine (`-f`)
    pub expression: String,
    /// Post-processing step
    pub post_process: PostProcess,
}

impl Selection {
    /// Build the selection for a request
    ///
    /// Audio ignores the quality. Video expressions prefer separate streams
    /// under the height ceiling, then a combined stream under it, then
    /// anything at all.
    pub fn for_request(format: MediaFormat, quality: Quality, fetch: &FetchConfig) -> Self {
        match format {
            MediaFormat::Audio => Self {
                expression: "bestaudio/best".to_string(),
                post_process: PostProcess::ExtractAudio {
                    codec: fetch.audio_codec.clone(),
                    quality: fetch.audio_quality.clone(),
                },
            },
            MediaFormat::Video => Self {
                expression: video_expression(quality),
                post_process: PostProcess::Merge {
                    container: fetch.merge_output_format.clone(),
                },
            },
        }
    }

    /// Extension the final artifact must carry, if post-processing fixes it
    ///
    /// Audio extraction always rewrites the extension. A merge only does so
    /// when streams were actually merged.
    pub fn forced_extension(&self, merged: bool) -> Option<&str> {
        match &self.post_process {
            PostProcess::ExtractAudio { codec, .. } => Some(codec),
            PostProcess::Merge { container } if merged => Some(container),
            PostProcess::Merge { .. } => None,
        }
    }
}

/// Format expression for a video quality ceiling
pub fn video_expression(quality: Quality) -> String {
    match quality.max_height() {
        Some(height) => format!(
            "bestvideo[height<={height}]+bestaudio/best / best[height<={height}] / best"
        ),
        None => "best".to_string(),
    }
}
