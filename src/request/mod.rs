//! Download request model and validation.
//!
//! A [`DownloadRequest`] is the only input the orchestrator needs: the URL,
//! the output mode, and the directory that receives the finished file.

mod error;

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

pub use error::ValidationError;

/// Default directory for downloaded files, relative to the working directory.
pub const DEFAULT_OUTPUT_DIR: &str = "downloads";

/// URL prefixes accepted by [`DownloadRequest::validate`].
const ACCEPTED_SCHEMES: [&str; 2] = ["http://", "https://"];

/// What the user wants out of the URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadMode {
    /// Best compatible video, merged into an MP4 container.
    #[default]
    Video,
    /// Audio only, transcoded to MP3.
    Audio,
}

impl DownloadMode {
    /// File extension of the finished artifact.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Video => "mp4",
            Self::Audio => "mp3",
        }
    }

    /// MIME type offered alongside the finished artifact.
    #[must_use]
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Video => "video/mp4",
            Self::Audio => "audio/mpeg",
        }
    }

    /// Returns the stable string label for display output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
        }
    }
}

impl fmt::Display for DownloadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single user-initiated download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    /// URL exactly as entered by the user.
    pub url: String,
    /// Video or audio output.
    pub mode: DownloadMode,
    /// Directory that receives the finished file. Created if absent.
    pub output_dir: PathBuf,
}

impl DownloadRequest {
    /// Creates a request. Call [`validate`](Self::validate) before submitting.
    #[must_use]
    pub fn new(url: impl Into<String>, mode: DownloadMode, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            mode,
            output_dir: output_dir.into(),
        }
    }

    /// Output directory as a path reference.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Checks the URL before anything touches the network or disk.
    ///
    /// The emptiness check ignores surrounding whitespace; the scheme check
    /// runs on the URL exactly as given.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyUrl`] for blank input and
    /// [`ValidationError::InvalidScheme`] for anything not starting with
    /// `http://` or `https://`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.url.trim().is_empty() {
            debug!("rejecting empty URL");
            return Err(ValidationError::EmptyUrl);
        }

        if !ACCEPTED_SCHEMES
            .iter()
            .any(|scheme| self.url.starts_with(scheme))
        {
            debug!(url = %self.url, "rejecting URL without web scheme");
            return Err(ValidationError::invalid_scheme(&self.url));
        }

        Ok(())
    }
}
