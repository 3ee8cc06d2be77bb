//! Progress UI (bar) for a download run.

use indicatif::{ProgressBar, ProgressStyle};
use mediafetch_core::{ProgressSink, ProgressUpdate};
use tracing::{debug, warn};

const BAR_TEMPLATE: &str = "{spinner} [{bar:40.cyan/blue}] {pos:>3}% {wide_msg}";

/// Percent bar fed by the orchestrator. Hidden when the terminal can't draw it.
pub(crate) struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    pub(crate) fn new(visible: bool) -> Self {
        if !visible {
            return Self {
                bar: ProgressBar::hidden(),
            };
        }
        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::with_template(BAR_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
        Self { bar }
    }

    pub(crate) fn position(&self) -> u64 {
        self.bar.position()
    }

    pub(crate) fn message(&self) -> String {
        self.bar.message()
    }

    /// Clears the bar from the terminal before the result is printed.
    pub(crate) fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressSink for TerminalProgress {
    fn reset(&mut self) {
        self.bar.reset();
        self.bar.set_position(0);
        self.bar.set_message("");
    }

    fn update(&mut self, update: &ProgressUpdate) {
        if let Some(percent) = update.percent() {
            self.bar.set_position(u64::from(percent));
        }
        let status = update.status_line();
        if update.is_error() {
            warn!("{status}");
        } else {
            debug!(percent = ?update.percent(), "{status}");
        }
        self.bar.set_message(status);
    }
}
