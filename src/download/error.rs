//! Error types for the download module.
//!
//! [`EngineError`] covers everything the external engine can report;
//! [`DownloadError`] is what [`Orchestrator::submit`](super::Orchestrator::submit)
//! returns, one variant per stage of the flow.

use std::path::PathBuf;

use thiserror::Error;

use crate::request::ValidationError;

/// Errors surfaced by the external download engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine executable could not be started.
    #[error("could not start {program}: {source}\n  Suggestion: Install yt-dlp or pass --ytdlp with its path")]
    Spawn {
        /// Program that failed to start.
        program: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Reading the engine's output or waiting for it failed.
    #[error("IO error while running the engine: {source}")]
    Io {
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The engine ran and reported failure. `message` is the engine's own text.
    #[error("{message}")]
    Failed {
        /// Error text reported by the engine.
        message: String,
        /// Process exit code, if the process exited normally.
        exit_code: Option<i32>,
    },

    /// The engine exited successfully without reporting any result metadata.
    #[error("engine finished without reporting result metadata")]
    MissingMetadata,
}

impl EngineError {
    /// Creates a spawn error.
    #[must_use]
    pub fn spawn(program: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Spawn {
            program: program.into(),
            source,
        }
    }

    /// Creates an IO error.
    #[must_use]
    pub fn io(source: std::io::Error) -> Self {
        Self::Io { source }
    }

    /// Creates a reported failure.
    #[must_use]
    pub fn failed(message: impl Into<String>, exit_code: Option<i32>) -> Self {
        Self::Failed {
            message: message.into(),
            exit_code,
        }
    }
}

/// Errors returned by a download submission.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The request was rejected before any I/O.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The engine failed; not retried beyond the engine's own counters.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// The engine succeeded but no output file could be located.
    #[error("download finished but no file was found in {}", directory.display())]
    Resolution {
        /// Directory that was searched.
        directory: PathBuf,
    },

    /// Filesystem error on the output directory.
    #[error("IO error on {path}: {source}")]
    Io {
        /// Path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl DownloadError {
    /// Creates a resolution error.
    #[must_use]
    pub fn resolution(directory: impl Into<PathBuf>) -> Self {
        Self::Resolution {
            directory: directory.into(),
        }
    }

    /// Creates an IO error.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the user can fix this by re-entering input.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

// Note: `From<std::io::Error>` is not implemented. IO variants need the path
// (or engine context) that a bare io::Error lacks; use the constructors.

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_failed_display_is_verbatim() {
        let error = EngineError::failed("ERROR: [youtube] abc: Private video", Some(1));
        assert_eq!(error.to_string(), "ERROR: [youtube] abc: Private video");
    }

    #[test]
    fn test_engine_spawn_display_names_program() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "not found");
        let msg = EngineError::spawn("/opt/bin/yt-dlp", io_error).to_string();
        assert!(msg.contains("/opt/bin/yt-dlp"), "Expected program in: {msg}");
        assert!(msg.contains("--ytdlp"), "Expected suggestion in: {msg}");
    }

    #[test]
    fn test_download_error_transparent_validation() {
        let error = DownloadError::from(ValidationError::EmptyUrl);
        assert!(error.is_validation());
        assert!(error.to_string().starts_with("empty url"));
    }

    #[test]
    fn test_download_error_resolution_display() {
        let error = DownloadError::resolution("downloads");
        let msg = error.to_string();
        assert!(msg.contains("no file was found"), "Expected reason in: {msg}");
        assert!(msg.contains("downloads"), "Expected directory in: {msg}");
        assert!(!error.is_validation());
    }

    #[test]
    fn test_download_error_io_display() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let msg = DownloadError::io("/tmp/out", io_error).to_string();
        assert!(msg.contains("/tmp/out"), "Expected path in: {msg}");
    }
}
