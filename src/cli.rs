//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use mediafetch_core::DownloadMode;

/// Download a video as MP4 or extract its audio as MP3.
///
/// Mediafetch hands the URL to yt-dlp, shows a live progress bar, and reports
/// where the finished file landed.
#[derive(Parser, Debug, Clone)]
#[command(name = "mediafetch")]
#[command(author, version, about)]
pub struct Args {
    /// Video page URL (http:// or https://)
    pub url: Option<String>,

    /// Directory that receives the finished file [default: downloads]
    #[arg(short = 'o', long)]
    pub output_dir: Option<PathBuf>,

    /// Keep the video or extract the audio track
    #[arg(short = 'm', long, value_enum, default_value_t = ModeArg::Video)]
    pub mode: ModeArg,

    /// Path to the yt-dlp executable [default: yt-dlp on PATH]
    #[arg(long, value_name = "PATH")]
    pub ytdlp: Option<PathBuf>,

    /// ffmpeg binary or directory handed to yt-dlp for merging and conversion
    #[arg(long, value_name = "PATH")]
    pub ffmpeg_location: Option<PathBuf>,

    /// List files in the output directory and exit
    #[arg(long, conflicts_with = "dry_run")]
    pub list: bool,

    /// Validate the URL and print the yt-dlp invocation without running it
    #[arg(long)]
    pub dry_run: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored log output
    #[arg(long)]
    pub no_color: bool,
}

/// Output mode accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Best compatible video merged into MP4
    Video,
    /// Audio only, converted to MP3
    Audio,
}

impl From<ModeArg> for DownloadMode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Video => Self::Video,
            ModeArg::Audio => Self::Audio,
        }
    }
}

impl From<DownloadMode> for ModeArg {
    fn from(value: DownloadMode) -> Self {
        match value {
            DownloadMode::Video => Self::Video,
            DownloadMode::Audio => Self::Audio,
        }
    }
}
