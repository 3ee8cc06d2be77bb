//! Progress events from the engine and their projection onto UI state.
//!
//! The engine emits [`ProgressEvent`]s; [`project`] turns each one into at
//! most one [`ProgressUpdate`]; [`dispatch`] hands the update to a
//! [`ProgressSink`]. Dispatch never fails: a panicking sink is caught, logged,
//! and the download carries on.

use std::panic::{AssertUnwindSafe, catch_unwind, set_hook, take_hook};
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use tracing::{trace, warn};

/// Status line shown once the transfer is done and post-processing may run.
pub const FINISHED_STATUS: &str = "Download finished! Converting/processing...";

/// Status line shown when the engine reports an error event.
pub const ERROR_STATUS: &str = "An error occurred during download";

/// Phase of an engine progress event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressPhase {
    /// Bytes are being transferred.
    Downloading,
    /// The transfer of one file completed.
    Finished,
    /// The engine hit an error for the current file.
    Error,
}

impl ProgressPhase {
    /// Parses the engine's status label.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "downloading" => Some(Self::Downloading),
            "finished" => Some(Self::Finished),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

/// A transient progress notification produced by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    /// Event phase.
    pub phase: ProgressPhase,
    /// Bytes transferred so far, if known.
    pub downloaded_bytes: Option<u64>,
    /// Exact total size, if known.
    pub total_bytes: Option<u64>,
    /// Estimated total size, used when the exact total is absent.
    pub total_bytes_estimate: Option<u64>,
    /// File currently being written, as reported by the engine.
    pub filename: Option<String>,
}

impl ProgressEvent {
    /// Creates a downloading event with exact byte counts.
    #[must_use]
    pub fn downloading(downloaded: u64, total: Option<u64>, filename: Option<&str>) -> Self {
        Self {
            phase: ProgressPhase::Downloading,
            downloaded_bytes: Some(downloaded),
            total_bytes: total,
            total_bytes_estimate: None,
            filename: filename.map(str::to_string),
        }
    }

    /// Creates an event carrying only a phase.
    #[must_use]
    pub fn phase_only(phase: ProgressPhase) -> Self {
        Self {
            phase,
            downloaded_bytes: None,
            total_bytes: None,
            total_bytes_estimate: None,
            filename: None,
        }
    }

    /// Exact total if present and non-zero, else the estimate.
    #[must_use]
    pub fn effective_total(&self) -> Option<u64> {
        self.total_bytes
            .filter(|total| *total > 0)
            .or(self.total_bytes_estimate)
    }
}

/// What the UI should show after an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressUpdate {
    /// Transfer in progress.
    Downloading {
        /// Whole percent, 0..=100.
        percent: u8,
        /// Base name of the file being written.
        filename: String,
    },
    /// Transfer complete, post-processing may follow.
    Finished,
    /// The engine reported an error event.
    Failed,
}

impl ProgressUpdate {
    /// Progress bar position, or `None` when the bar should stay put.
    #[must_use]
    pub fn percent(&self) -> Option<u8> {
        match self {
            Self::Downloading { percent, .. } => Some(*percent),
            Self::Finished => Some(100),
            Self::Failed => None,
        }
    }

    /// Short human-readable status line.
    #[must_use]
    pub fn status_line(&self) -> String {
        match self {
            Self::Downloading { percent, filename } => {
                format!("Downloading: {filename} - {percent}%")
            }
            Self::Finished => FINISHED_STATUS.to_string(),
            Self::Failed => ERROR_STATUS.to_string(),
        }
    }

    /// Whether the update reports a problem.
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Failed)
    }
}

/// Receiver of progress updates (a progress bar, a log, a test recorder).
///
/// Implementations return unit: there is no way for a sink to abort the
/// download. A panic inside [`reset`](Self::reset) or [`update`](Self::update)
/// is caught by [`reset_sink`] and [`dispatch`].
pub trait ProgressSink: Send {
    /// Clears the bar to 0% with an empty status. Called once per accepted request.
    fn reset(&mut self);

    /// Applies one update.
    fn update(&mut self, update: &ProgressUpdate);
}

/// Sink that drops every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn reset(&mut self) {}

    fn update(&mut self, _update: &ProgressUpdate) {}
}

/// Projects an engine event onto a UI update.
///
/// Downloading events without a downloaded count or a non-zero total are
/// no-ops and return `None`.
#[must_use]
pub fn project(event: &ProgressEvent) -> Option<ProgressUpdate> {
    match event.phase {
        ProgressPhase::Downloading => {
            let downloaded = event.downloaded_bytes?;
            let total = event.effective_total().filter(|total| *total > 0)?;
            let filename = event
                .filename
                .as_deref()
                .map_or_else(|| "Unknown".to_string(), basename);
            Some(ProgressUpdate::Downloading {
                percent: percent_of(downloaded, total),
                filename,
            })
        }
        ProgressPhase::Finished => Some(ProgressUpdate::Finished),
        ProgressPhase::Error => Some(ProgressUpdate::Failed),
    }
}

/// Projects `event` and applies it to `sink`, swallowing sink panics.
pub fn dispatch(sink: &mut dyn ProgressSink, event: &ProgressEvent) {
    let Some(update) = project(event) else {
        trace!(?event, "progress event without usable totals ignored");
        return;
    };

    trace!(percent = ?update.percent(), "progress update");
    if catch_unwind_silent(AssertUnwindSafe(|| sink.update(&update))).is_err() {
        warn!(?update, "progress sink panicked; update discarded");
    }
}

/// Resets `sink`, swallowing sink panics.
pub fn reset_sink(sink: &mut dyn ProgressSink) {
    if catch_unwind_silent(AssertUnwindSafe(|| sink.reset())).is_err() {
        warn!("progress sink panicked during reset");
    }
}

// `catch_unwind` still runs the panic hook, which would print over the
// progress bar on every event. Swap in a silent hook for the guarded call.
static SINK_PANIC_HOOK_LOCK: Mutex<()> = Mutex::new(());

fn catch_unwind_silent<F, T>(operation: F) -> Result<T, Box<dyn std::any::Any + Send + 'static>>
where
    F: FnOnce() -> T + std::panic::UnwindSafe,
{
    let _panic_hook_guard = SINK_PANIC_HOOK_LOCK
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    let previous_hook = take_hook();
    set_hook(Box::new(|_| {}));
    let outcome = catch_unwind(operation);
    set_hook(previous_hook);
    outcome
}

/// `floor(downloaded * 100 / total)`, capped at 100.
fn percent_of(downloaded: u64, total: u64) -> u8 {
    let percent = u128::from(downloaded) * 100 / u128::from(total);
    u8::try_from(percent.min(100)).unwrap_or(100)
}

fn basename(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map_or_else(|| path.to_string(), |name| name.to_string_lossy().into_owned())
}
