//! Mediafetch Core Library
//!
//! This library provides the core of the mediafetch tool, which hands a single
//! video URL to `yt-dlp`, reports live progress, and locates the resulting
//! MP4 or MP3 on disk.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`request`] - Download request model and URL validation
//! - [`download`] - Engine configuration, the engine port and its `yt-dlp`
//!   adapter, progress projection, output-file resolution, orchestration
//! - [`failure`] - Classification of failures into user-facing hints

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod download;
pub mod failure;
pub mod request;

// Re-export commonly used types
pub use download::{
    DownloadError, DownloadOutcome, Engine, EngineConfig, EngineError, MediaInfo, NoopProgress,
    Orchestrator, ProgressEvent, ProgressSink, ProgressUpdate, YtDlpEngine,
};
pub use failure::{FailureCategory, FailureDescriptor, classify_failure, describe_error};
pub use request::{DEFAULT_OUTPUT_DIR, DownloadMode, DownloadRequest, ValidationError};
