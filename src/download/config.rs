//! Engine configuration derived from a download request.
//!
//! [`EngineConfig::for_request`] is a pure function of the request: building
//! it twice from the same request yields equal values. Retry counts are opaque
//! pass-through values for the engine; nothing in this crate retries.

use std::path::Path;

use serde::Serialize;

use crate::request::{DownloadMode, DownloadRequest};

/// Whole-job retries requested from the engine.
pub const ENGINE_RETRIES: u32 = 10;

/// Per-fragment retries requested from the engine.
pub const ENGINE_FRAGMENT_RETRIES: u32 = 10;

/// Extractor-level retries requested from the engine.
pub const ENGINE_EXTRACTOR_RETRIES: u32 = 5;

/// Output filename template; the engine substitutes and sanitizes the fields.
pub const OUTPUT_NAME_TEMPLATE: &str = "%(title)s.%(ext)s";

/// H.264 video paired with AAC audio, else whatever the site offers as best.
pub const VIDEO_FORMAT_SELECTOR: &str = "bestvideo[vcodec^=avc1]+bestaudio[acodec^=mp4a]/best";

/// Best audio-only stream, else best overall.
pub const AUDIO_FORMAT_SELECTOR: &str = "bestaudio/best";

/// Container that merged video streams are forced into.
pub const VIDEO_MERGE_CONTAINER: &str = "mp4";

/// Audio extraction directive handed to the engine's post-processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudioExtraction {
    /// Target lossy codec.
    pub codec: &'static str,
    /// Target bitrate in kbit/s.
    pub bitrate_kbps: u32,
    /// Output sample rate in Hz.
    pub sample_rate_hz: u32,
    /// Output channel count.
    pub channels: u8,
}

impl Default for AudioExtraction {
    fn default() -> Self {
        Self {
            codec: "mp3",
            bitrate_kbps: 192,
            sample_rate_hz: 44_100,
            channels: 2,
        }
    }
}

/// Immutable configuration for a single engine run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineConfig {
    /// Full output template, `{output_dir}/%(title)s.%(ext)s`.
    pub output_template: String,
    /// Format selector expression.
    pub format: &'static str,
    /// Whole-job retries.
    pub retries: u32,
    /// Fragment retries.
    pub fragment_retries: u32,
    /// Extractor retries.
    pub extractor_retries: u32,
    /// Resume partially downloaded files.
    pub continue_partial: bool,
    /// Suppress informational engine output.
    pub quiet: bool,
    /// Suppress engine warnings.
    pub no_warnings: bool,
    /// Container for merged audio+video output (video mode only).
    pub merge_output_format: Option<&'static str>,
    /// Audio post-processing (audio mode only).
    pub audio_extraction: Option<AudioExtraction>,
}

impl EngineConfig {
    /// Builds the configuration for a request.
    #[must_use]
    pub fn for_request(request: &DownloadRequest) -> Self {
        let output_template = output_template(request.output_dir());
        match request.mode {
            DownloadMode::Video => Self {
                format: VIDEO_FORMAT_SELECTOR,
                merge_output_format: Some(VIDEO_MERGE_CONTAINER),
                audio_extraction: None,
                ..Self::base(output_template)
            },
            DownloadMode::Audio => Self {
                format: AUDIO_FORMAT_SELECTOR,
                merge_output_format: None,
                audio_extraction: Some(AudioExtraction::default()),
                ..Self::base(output_template)
            },
        }
    }

    fn base(output_template: String) -> Self {
        Self {
            output_template,
            format: AUDIO_FORMAT_SELECTOR,
            retries: ENGINE_RETRIES,
            fragment_retries: ENGINE_FRAGMENT_RETRIES,
            extractor_retries: ENGINE_EXTRACTOR_RETRIES,
            continue_partial: true,
            quiet: true,
            no_warnings: false,
            merge_output_format: None,
            audio_extraction: None,
        }
    }
}

fn output_template(output_dir: &Path) -> String {
    output_dir
        .join(OUTPUT_NAME_TEMPLATE)
        .to_string_lossy()
        .into_owned()
}
