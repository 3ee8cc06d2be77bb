//! CLI output formatting and display helpers.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use mediafetch_core::{DownloadError, DownloadOutcome, EngineConfig, describe_error};

/// Message when no URL was provided at all.
pub const NO_INPUT_GUIDANCE: &str = "No URL provided. Pass a video URL as the first argument.";

/// Example for a video download.
pub const VIDEO_EXAMPLE: &str = "Example: mediafetch https://www.youtube.com/watch?v=dQw4w9WgXcQ";

/// Example for an audio extraction.
pub const AUDIO_EXAMPLE: &str =
    "Example: mediafetch --mode audio -o music https://www.youtube.com/watch?v=dQw4w9WgXcQ";

/// Listing line for an empty output directory.
pub const EMPTY_FOLDER: &str = "Folder is empty";

/// Returns terminal width from COLUMNS, or 80 if unset/invalid.
pub fn terminal_width() -> usize {
    std::env::var("COLUMNS")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|width| *width >= 20)
        .unwrap_or(80)
}

/// Truncates text to at most `width` chars, appending ellipsis if truncated.
pub fn truncate_to_width(text: &str, width: usize) -> String {
    let text_len = text.chars().count();
    if text_len <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    if width == 1 {
        return "…".to_string();
    }

    let mut output: String = text.chars().take(width - 1).collect();
    output.push('…');
    output
}

/// Returns lines for quick-start guidance (headline + examples), truncated to width.
pub fn quick_start_guidance_lines(width: usize) -> Vec<String> {
    [NO_INPUT_GUIDANCE, VIDEO_EXAMPLE, AUDIO_EXAMPLE]
        .iter()
        .map(|line| truncate_to_width(line, width))
        .collect()
}

/// Prints quick-start guidance to stdout.
pub fn print_quick_start_guidance() {
    let width = terminal_width().min(80);
    for line in quick_start_guidance_lines(width) {
        println!("{line}");
    }
}

/// Lines reporting a successful download.
pub(crate) fn success_lines(outcome: &DownloadOutcome) -> Vec<String> {
    let mut lines = vec![
        format!("Successfully downloaded: {}", outcome.title),
        format!("Saved to: {}", outcome.resolution.file.path.display()),
        format!("Type: {}", outcome.mime_type()),
    ];
    if outcome.resolution.candidates.len() > 1 {
        lines.push(format!(
            "Matched {} files ({}); picked the first",
            outcome.resolution.candidates.len(),
            outcome.resolution.strategy.as_str()
        ));
    }
    lines
}

pub(crate) fn print_success(outcome: &DownloadOutcome) {
    for line in success_lines(outcome) {
        println!("{line}");
    }
}

/// Lines reporting a failed download. The error text is kept verbatim.
pub(crate) fn failure_lines(error: &DownloadError) -> Vec<String> {
    let descriptor = describe_error(error);
    let mut lines = vec![
        "Download failed!".to_string(),
        format!(
            "{} {}: {}",
            descriptor.category.icon(),
            descriptor.category.label(),
            descriptor.what
        ),
        error.to_string(),
    ];
    if let Some(hint) = descriptor.hint {
        lines.push(format!("Hint: {hint}"));
    }
    lines
}

pub(crate) fn print_failure(error: &DownloadError) {
    for line in failure_lines(error) {
        eprintln!("{line}");
    }
}

/// Lines listing `files` relative to `directory`.
pub(crate) fn folder_listing_lines(directory: &Path, files: &[PathBuf]) -> Vec<String> {
    if files.is_empty() {
        return vec![format!("{EMPTY_FOLDER}: {}", directory.display())];
    }
    let mut lines = vec![format!("{} ({} files):", directory.display(), files.len())];
    lines.extend(files.iter().map(|file| {
        let name = file
            .file_name()
            .map_or_else(|| file.display().to_string(), |name| name.to_string_lossy().into_owned());
        format!("  {name}")
    }));
    lines
}

pub(crate) fn print_folder_listing(directory: &Path, files: &[PathBuf]) {
    for line in folder_listing_lines(directory, files) {
        println!("{line}");
    }
}

/// Renders the resolved engine config and the command that would run.
pub(crate) fn dry_run_lines(
    program: &Path,
    args: &[OsString],
    config: &EngineConfig,
) -> Result<Vec<String>> {
    let config_json =
        serde_json::to_string_pretty(config).context("Failed to serialize engine config")?;
    let command = std::iter::once(program.as_os_str())
        .chain(args.iter().map(OsString::as_os_str))
        .map(|arg| shell_quote(&arg.to_string_lossy()))
        .collect::<Vec<_>>()
        .join(" ");
    Ok(vec![
        "Dry run: nothing will be downloaded.".to_string(),
        "Engine config:".to_string(),
        config_json,
        "Command:".to_string(),
        command,
    ])
}

pub(crate) fn print_dry_run(program: &Path, args: &[OsString], config: &EngineConfig) -> Result<()> {
    for line in dry_run_lines(program, args, config)? {
        println!("{line}");
    }
    Ok(())
}

fn shell_quote(arg: &str) -> String {
    let safe = !arg.is_empty()
        && arg
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || "-_./:=,@%+".contains(ch));
    if safe {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}
