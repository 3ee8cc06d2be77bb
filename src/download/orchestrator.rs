//! The request/response flow around one engine run.
//!
//! [`Orchestrator::submit`] validates the request, resets the progress sink,
//! builds the [`EngineConfig`], awaits the engine while forwarding its
//! progress events, and finally resolves which file on disk the job produced.

use std::fs;

use tracing::{debug, info, instrument};
use url::Url;

use super::config::EngineConfig;
use super::engine::Engine;
use super::error::DownloadError;
use super::progress::{ProgressEvent, ProgressSink, dispatch, reset_sink};
use super::resolve::{Resolution, UNKNOWN_TITLE, resolve_output_file};
use crate::request::{DownloadMode, DownloadRequest};

/// Result of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOutcome {
    /// Title reported by the engine (raw, unsanitized).
    pub title: String,
    /// Mode the job ran in.
    pub mode: DownloadMode,
    /// The located file and how it was found.
    pub resolution: Resolution,
}

impl DownloadOutcome {
    /// MIME type to offer with the file.
    #[must_use]
    pub fn mime_type(&self) -> &'static str {
        self.mode.mime_type()
    }
}

/// Runs download requests against an engine.
pub struct Orchestrator {
    engine: Box<dyn Engine>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("engine", &self.engine.name())
            .finish()
    }
}

impl Orchestrator {
    /// Creates an orchestrator over `engine`.
    pub fn new(engine: impl Engine + 'static) -> Self {
        Self {
            engine: Box::new(engine),
        }
    }

    /// Runs one request to completion.
    ///
    /// Validation failures return before the sink is touched or the engine
    /// runs. The sink receives updates inline while the engine works; it
    /// cannot fail the download.
    ///
    /// # Errors
    ///
    /// - [`DownloadError::Validation`] for an empty URL or a non-web scheme
    /// - [`DownloadError::Io`] if the output directory cannot be created
    /// - [`DownloadError::Engine`] if the engine fails
    /// - [`DownloadError::Resolution`] if no output file can be found
    #[instrument(skip(self, request, sink), fields(mode = %request.mode, host = %host_of(&request.url)))]
    pub async fn submit(
        &self,
        request: &DownloadRequest,
        sink: &mut dyn ProgressSink,
    ) -> Result<DownloadOutcome, DownloadError> {
        request.validate()?;
        reset_sink(sink);

        let output_dir = request.output_dir();
        if !output_dir.exists() {
            fs::create_dir_all(output_dir).map_err(|e| DownloadError::io(output_dir, e))?;
            info!(dir = %output_dir.display(), "Created output directory");
        }

        let config = EngineConfig::for_request(request);
        debug!(engine = self.engine.name(), format = config.format, "starting engine run");

        let mut on_progress = |event: ProgressEvent| dispatch(&mut *sink, &event);
        let media = self
            .engine
            .run(&request.url, &config, &mut on_progress)
            .await?;

        let title = media
            .title
            .clone()
            .unwrap_or_else(|| UNKNOWN_TITLE.to_string());
        let resolution = resolve_output_file(
            output_dir,
            &title,
            request.mode,
            media.filepath.as_deref(),
        )?;

        info!(
            title = %title,
            path = %resolution.file.path.display(),
            strategy = resolution.strategy.as_str(),
            "Download complete"
        );

        Ok(DownloadOutcome {
            title,
            mode: request.mode,
            resolution,
        })
    }
}

fn host_of(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
        .unwrap_or_else(|| "-".to_string())
}
