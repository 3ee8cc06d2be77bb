//! Download orchestration around an external media engine.
//!
//! A [`DownloadRequest`](crate::request::DownloadRequest) flows through
//! [`Orchestrator::submit`]: the request is validated, an [`EngineConfig`] is
//! derived from it, the [`Engine`] runs while its [`ProgressEvent`]s are
//! projected onto a [`ProgressSink`], and the produced file is located on disk.
//!
//! # Example
//!
//! ```no_run
//! use mediafetch_core::download::{NoopProgress, Orchestrator, YtDlpEngine};
//! use mediafetch_core::request::{DownloadMode, DownloadRequest};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let orchestrator = Orchestrator::new(YtDlpEngine::default());
//! let request = DownloadRequest::new(
//!     "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
//!     DownloadMode::Audio,
//!     "downloads",
//! );
//! let outcome = orchestrator.submit(&request, &mut NoopProgress).await?;
//! println!("{} -> {}", outcome.title, outcome.resolution.file.path.display());
//! # Ok(())
//! # }
//! ```

mod config;
mod engine;
mod error;
mod orchestrator;
mod progress;
mod resolve;

pub use config::{
    AUDIO_FORMAT_SELECTOR, AudioExtraction, ENGINE_EXTRACTOR_RETRIES, ENGINE_FRAGMENT_RETRIES,
    ENGINE_RETRIES, EngineConfig, OUTPUT_NAME_TEMPLATE, VIDEO_FORMAT_SELECTOR,
    VIDEO_MERGE_CONTAINER,
};
pub use engine::{
    DEFAULT_YTDLP_PROGRAM, Engine, MediaInfo, ProgressCallback, YtDlpEngine,
};
pub use error::{DownloadError, EngineError};
pub use orchestrator::{DownloadOutcome, Orchestrator};
pub use progress::{
    ERROR_STATUS, FINISHED_STATUS, NoopProgress, ProgressEvent, ProgressPhase, ProgressSink,
    ProgressUpdate, dispatch, project, reset_sink,
};
pub use resolve::{
    RECENT_FALLBACK_LIMIT, Resolution, ResolutionStrategy, ResolvedFile, UNKNOWN_TITLE,
    expected_file_name, list_downloaded_files, resolve_output_file,
};

// Use `Result<T, DownloadError>` explicitly in signatures; no module-local alias.
