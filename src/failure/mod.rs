//! Failure classification and user-facing descriptors for download errors.

use crate::download::{DownloadError, EngineError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FailureCategory {
    Validation,
    AccessRestricted,
    Unavailable,
    Engine,
    Resolution,
    Other,
}

impl FailureCategory {
    #[must_use]
    pub fn icon(self) -> &'static str {
        match self {
            Self::Validation => "❌",
            Self::AccessRestricted => "🔐",
            Self::Unavailable => "🚫",
            Self::Engine => "🛠️",
            Self::Resolution => "📁",
            Self::Other => "⚠️",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Validation => "Input",
            Self::AccessRestricted => "Access restricted",
            Self::Unavailable => "Unavailable",
            Self::Engine => "Engine",
            Self::Resolution => "Output file",
            Self::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureDescriptor {
    pub category: FailureCategory,
    pub what: &'static str,
    /// Extra explanation shown under the raw error, when one is known.
    pub hint: Option<&'static str>,
}

const PRIVATE_HINT: &str = "This video is private or age-restricted.";
const UNAVAILABLE_HINT: &str = "The video is unavailable or has been removed.";

/// Classifies engine error text by case-insensitive substring.
#[must_use]
pub fn classify_failure(error: &str) -> FailureDescriptor {
    let lowered = error.to_lowercase();
    if lowered.contains("private video") {
        FailureDescriptor {
            category: FailureCategory::AccessRestricted,
            what: "Video is not publicly accessible",
            hint: Some(PRIVATE_HINT),
        }
    } else if lowered.contains("unavailable") {
        FailureDescriptor {
            category: FailureCategory::Unavailable,
            what: "Video unavailable",
            hint: Some(UNAVAILABLE_HINT),
        }
    } else {
        FailureDescriptor {
            category: FailureCategory::Other,
            what: "Download failed",
            hint: None,
        }
    }
}

/// Returns a descriptor for a submission error (typed variant first, then message text).
#[must_use]
pub fn describe_error(error: &DownloadError) -> FailureDescriptor {
    match error {
        DownloadError::Validation(_) => FailureDescriptor {
            category: FailureCategory::Validation,
            what: "URL was rejected",
            hint: None,
        },
        DownloadError::Engine(EngineError::Failed { message, .. }) => classify_failure(message),
        DownloadError::Engine(EngineError::Spawn { .. } | EngineError::Io { .. }) => {
            FailureDescriptor {
                category: FailureCategory::Engine,
                what: "yt-dlp could not be run",
                hint: None,
            }
        }
        DownloadError::Engine(EngineError::MissingMetadata) => FailureDescriptor {
            category: FailureCategory::Engine,
            what: "yt-dlp reported no result",
            hint: None,
        },
        DownloadError::Resolution { .. } => FailureDescriptor {
            category: FailureCategory::Resolution,
            what: "Downloaded file not found",
            hint: None,
        },
        DownloadError::Io { .. } => FailureDescriptor {
            category: FailureCategory::Other,
            what: "Output directory error",
            hint: None,
        },
    }
}
