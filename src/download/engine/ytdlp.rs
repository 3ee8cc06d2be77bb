//! `yt-dlp` child-process engine.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

use super::output::{
    EngineLine, INFO_PRINT_TEMPLATE, PROGRESS_TEMPLATE, RunTranscript, parse_line, read_lossy_line,
};
use super::{Engine, MediaInfo, ProgressCallback};
use crate::download::config::EngineConfig;
use crate::download::error::EngineError;
use crate::download::progress::{ProgressEvent, ProgressPhase};

/// Program looked up on `PATH` when no explicit path is configured.
pub const DEFAULT_YTDLP_PROGRAM: &str = if cfg!(target_os = "windows") {
    "yt-dlp.exe"
} else {
    "yt-dlp"
};

#[derive(Debug, Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

/// Engine backed by the `yt-dlp` executable.
#[derive(Debug, Clone)]
pub struct YtDlpEngine {
    program: PathBuf,
    ffmpeg_location: Option<PathBuf>,
}

impl Default for YtDlpEngine {
    fn default() -> Self {
        Self::new(DEFAULT_YTDLP_PROGRAM)
    }
}

impl YtDlpEngine {
    /// Creates an engine running `program`.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            ffmpeg_location: None,
        }
    }

    /// Points the engine's post-processors at a specific ffmpeg binary or directory.
    #[must_use]
    pub fn with_ffmpeg_location(mut self, location: Option<PathBuf>) -> Self {
        self.ffmpeg_location = location;
        self
    }

    /// Executable this engine runs.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Renders the full argument vector for one run, URL last.
    #[must_use]
    pub fn command_args(&self, url: &str, config: &EngineConfig) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::new();
        let mut push = |value: &str| args.push(OsString::from(value));

        if config.quiet {
            push("--quiet");
        }
        if config.no_warnings {
            push("--no-warnings");
        }
        // --print implies --quiet; --progress keeps the template lines flowing anyway.
        push("--progress");
        push("--newline");
        push(if config.continue_partial {
            "--continue"
        } else {
            "--no-continue"
        });
        push("--no-simulate");
        push("--retries");
        push(&config.retries.to_string());
        push("--fragment-retries");
        push(&config.fragment_retries.to_string());
        push("--extractor-retries");
        push(&config.extractor_retries.to_string());
        push("--progress-template");
        push(PROGRESS_TEMPLATE);
        push("--print");
        push(INFO_PRINT_TEMPLATE);
        push("-f");
        push(config.format);

        if let Some(container) = config.merge_output_format {
            push("--merge-output-format");
            push(container);
        }

        if let Some(audio) = &config.audio_extraction {
            push("-x");
            push("--audio-format");
            push(audio.codec);
            push("--audio-quality");
            push(&format!("{}K", audio.bitrate_kbps));
            push("--postprocessor-args");
            push(&format!(
                "ExtractAudio:-ar {} -ac {}",
                audio.sample_rate_hz, audio.channels
            ));
        }

        push("-o");
        push(&config.output_template);

        if let Some(location) = &self.ffmpeg_location {
            args.push(OsString::from("--ffmpeg-location"));
            args.push(location.as_os_str().to_os_string());
        }

        args.push(OsString::from("--"));
        args.push(OsString::from(url));
        args
    }
}

#[async_trait]
impl Engine for YtDlpEngine {
    fn name(&self) -> &str {
        "yt-dlp"
    }

    #[instrument(skip(self, config, on_progress), fields(program = %self.program.display()))]
    async fn run(
        &self,
        url: &str,
        config: &EngineConfig,
        on_progress: &mut ProgressCallback<'_>,
    ) -> Result<MediaInfo, EngineError> {
        let mut command = Command::new(&self.program);
        command
            .args(self.command_args(url, config))
            .env("PYTHONIOENCODING", "UTF-8")
            .env("PYTHONUTF8", "1")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!(format = config.format, "spawning engine");
        let mut child = command
            .spawn()
            .map_err(|source| EngineError::spawn(&self.program, source))?;

        let stdout = child.stdout.take().ok_or_else(|| {
            EngineError::io(std::io::Error::other("engine stdout was not captured"))
        })?;
        let stderr = child.stderr.take().ok_or_else(|| {
            EngineError::io(std::io::Error::other("engine stderr was not captured"))
        })?;

        // Both streams feed one loop so the callback always runs on this task.
        let (tx, mut rx) = mpsc::unbounded_channel();
        let stdout_task = tokio::spawn(forward_lines(stdout, Stream::Stdout, tx.clone()));
        let stderr_task = tokio::spawn(forward_lines(stderr, Stream::Stderr, tx));

        let mut transcript = RunTranscript::default();
        while let Some((stream, line)) = rx.recv().await {
            match parse_line(&line) {
                EngineLine::Progress(event) => on_progress(event),
                EngineLine::Info(media) => {
                    debug!(title = ?media.title, filepath = ?media.filepath, "engine reported result");
                    transcript.record_info(media);
                }
                EngineLine::InvalidInfo(error) => {
                    warn!(%error, "could not parse engine result metadata");
                }
                EngineLine::Warning(message) => {
                    warn!(engine = "yt-dlp", "{message}");
                    transcript.record_line(&message);
                }
                EngineLine::Error(message) => {
                    debug!(?stream, %message, "engine error line");
                    transcript.record_error(message);
                    // The progress template only fires for downloading/finished.
                    on_progress(ProgressEvent::phase_only(ProgressPhase::Error));
                }
                EngineLine::Other(text) => {
                    debug!(?stream, "{text}");
                    transcript.record_line(&text);
                }
                EngineLine::Blank => {}
            }
        }

        let status = child.wait().await.map_err(EngineError::io)?;
        for task in [stdout_task, stderr_task] {
            match task.await {
                Ok(Ok(())) => {}
                Ok(Err(error)) => warn!(%error, "failed reading engine output"),
                Err(error) => warn!(%error, "engine output reader stopped"),
            }
        }

        if !status.success() {
            let message = transcript.failure_message();
            info!(exit_code = ?status.code(), "engine reported failure");
            return Err(EngineError::failed(message, status.code()));
        }

        transcript.into_info().ok_or(EngineError::MissingMetadata)
    }
}

async fn forward_lines<R>(
    reader: R,
    stream: Stream,
    tx: mpsc::UnboundedSender<(Stream, String)>,
) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buffer = Vec::new();
    while let Some(line) = read_lossy_line(&mut reader, &mut buffer).await? {
        if tx.send((stream, line)).is_err() {
            break;
        }
    }
    Ok(())
}
