//! Integration tests for the yt-dlp process engine.
//!
//! A shell script stands in for yt-dlp and prints the same marker lines the
//! real tool prints with the progress and `--print` templates.
#![cfg(unix)]

use mediafetch_core::download::{ERROR_STATUS, ResolutionStrategy};
use mediafetch_core::{
    DownloadError, DownloadMode, DownloadRequest, EngineError, FailureCategory, Orchestrator,
    ProgressUpdate, YtDlpEngine, describe_error,
};
use tempfile::TempDir;

mod support;
use support::{
    FAKE_YTDLP_PRIVATE, FAKE_YTDLP_SILENT, FAKE_YTDLP_SUCCESS, RecordingSink, write_script,
};

#[tokio::test]
async fn test_fake_ytdlp_download_end_to_end() {
    let temp = TempDir::new().unwrap();
    let script = write_script(temp.path(), "yt-dlp", FAKE_YTDLP_SUCCESS);
    let out_dir = temp.path().join("media");
    let orchestrator = Orchestrator::new(YtDlpEngine::new(script));
    let mut sink = RecordingSink::default();

    let outcome = orchestrator
        .submit(
            &DownloadRequest::new("https://www.youtube.com/watch?v=abc", DownloadMode::Video, &out_dir),
            &mut sink,
        )
        .await
        .unwrap();

    assert_eq!(outcome.title, "Sample");
    assert_eq!(outcome.resolution.strategy, ResolutionStrategy::Reported);
    assert_eq!(outcome.resolution.file.path, out_dir.join("Sample.mp4"));
    assert_eq!(sink.percents(), vec![25, 100, 100]);
}

#[tokio::test]
async fn test_fake_ytdlp_private_video_error_is_surfaced() {
    let temp = TempDir::new().unwrap();
    let script = write_script(temp.path(), "yt-dlp", FAKE_YTDLP_PRIVATE);
    let orchestrator = Orchestrator::new(YtDlpEngine::new(script));
    let mut sink = RecordingSink::default();

    let err = orchestrator
        .submit(
            &DownloadRequest::new("https://youtu.be/abc123", DownloadMode::Audio, temp.path().join("out")),
            &mut sink,
        )
        .await
        .unwrap_err();

    match &err {
        DownloadError::Engine(EngineError::Failed { message, exit_code }) => {
            assert!(message.contains("Private video"), "{message}");
            assert_eq!(*exit_code, Some(1));
        }
        other => panic!("expected engine failure, got {other:?}"),
    }
    assert_eq!(describe_error(&err).category, FailureCategory::AccessRestricted);
    assert_eq!(sink.updates, vec![ProgressUpdate::Failed]);
    assert_eq!(
        sink.updates.last().map(ProgressUpdate::status_line).as_deref(),
        Some(ERROR_STATUS)
    );
}

#[tokio::test]
async fn test_fake_ytdlp_without_metadata_is_missing_metadata() {
    let temp = TempDir::new().unwrap();
    let script = write_script(temp.path(), "yt-dlp", FAKE_YTDLP_SILENT);
    let orchestrator = Orchestrator::new(YtDlpEngine::new(script));

    let err = orchestrator
        .submit(
            &DownloadRequest::new("https://youtu.be/abc", DownloadMode::Video, temp.path().join("out")),
            &mut RecordingSink::default(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, DownloadError::Engine(EngineError::MissingMetadata)));
}

#[tokio::test]
async fn test_missing_executable_is_spawn_error() {
    let temp = TempDir::new().unwrap();
    let orchestrator = Orchestrator::new(YtDlpEngine::new(temp.path().join("no-such-yt-dlp")));

    let err = orchestrator
        .submit(
            &DownloadRequest::new("https://youtu.be/abc", DownloadMode::Video, temp.path().join("out")),
            &mut RecordingSink::default(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, DownloadError::Engine(EngineError::Spawn { .. })));
    assert!(err.to_string().contains("--ytdlp"));
}
