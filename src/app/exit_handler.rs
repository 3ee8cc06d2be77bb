//! Exit code logic for the mediafetch process.
//!
//! Single responsibility: map a submission result to the process exit outcome.

use mediafetch_core::{DownloadError, DownloadOutcome};

use crate::ProcessExit;

/// Determines the process exit outcome from the submission result.
pub(crate) fn determine_exit_outcome(result: &Result<DownloadOutcome, DownloadError>) -> ProcessExit {
    match result {
        Ok(_) => ProcessExit::Success,
        Err(error) if error.is_validation() => ProcessExit::InvalidInput,
        Err(_) => ProcessExit::Failure,
    }
}
