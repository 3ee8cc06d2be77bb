//! The external download engine port.
//!
//! The orchestrator only talks to the [`Engine`] trait. The production
//! implementation, [`YtDlpEngine`], drives the `yt-dlp` executable; tests
//! substitute scripted engines.
//!
//! # Example
//!
//! ```no_run
//! use mediafetch_core::download::{Engine, EngineConfig, YtDlpEngine};
//! use mediafetch_core::{DownloadMode, DownloadRequest};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let request = DownloadRequest::new("https://youtu.be/abc", DownloadMode::Audio, "downloads");
//! let config = EngineConfig::for_request(&request);
//! let engine = YtDlpEngine::new("yt-dlp");
//! let info = engine
//!     .run(&request.url, &config, &mut |event| println!("{event:?}"))
//!     .await?;
//! println!("title: {:?}", info.title);
//! # Ok(())
//! # }
//! ```

mod output;
mod ytdlp;

use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;

use super::config::EngineConfig;
use super::error::EngineError;
use super::progress::ProgressEvent;

pub use ytdlp::{DEFAULT_YTDLP_PROGRAM, YtDlpEngine};

/// Callback the engine invokes for each progress event.
///
/// It runs inline on the caller's task and returns unit.
pub type ProgressCallback<'a> = dyn FnMut(ProgressEvent) + Send + 'a;

/// Result metadata reported by the engine for a finished job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MediaInfo {
    /// Site-specific media id.
    pub id: Option<String>,
    /// Raw media title, before filename sanitization.
    pub title: Option<String>,
    /// Extension of the final file.
    pub ext: Option<String>,
    /// Final path the engine wrote, after post-processing.
    pub filepath: Option<PathBuf>,
}

impl MediaInfo {
    /// Creates metadata carrying only a title.
    #[must_use]
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }
}

/// Fetches media for a URL and reports progress while doing so.
#[async_trait]
pub trait Engine: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Runs one job to completion.
    ///
    /// `on_progress` is called zero or more times before this returns.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when the engine cannot be started, fails, or
    /// finishes without reporting metadata.
    async fn run(
        &self,
        url: &str,
        config: &EngineConfig,
        on_progress: &mut ProgressCallback<'_>,
    ) -> Result<MediaInfo, EngineError>;
}
