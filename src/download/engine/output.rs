//! Parsing of `yt-dlp` output lines.
//!
//! The engine is launched with a progress template and a print directive that
//! prefix machine-readable lines with [`PROGRESS_MARKER`] and [`INFO_MARKER`].
//! Everything else is free-form engine chatter.

use std::path::PathBuf;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use super::MediaInfo;
use crate::download::progress::{ProgressEvent, ProgressPhase};

/// Prefix of progress lines.
pub(crate) const PROGRESS_MARKER: &str = "MF_PROGRESS|";

/// Prefix of the result metadata line.
pub(crate) const INFO_MARKER: &str = "MF_INFO|";

/// `--progress-template` value: status, downloaded, total, estimate, filename.
/// The filename goes last because it may itself contain `|`.
pub(crate) const PROGRESS_TEMPLATE: &str = "download:MF_PROGRESS|%(progress.status)s|%(progress.downloaded_bytes)s|%(progress.total_bytes)s|%(progress.total_bytes_estimate)s|%(progress.filename)s";

/// `--print` value emitting the final metadata as JSON once the file is in place.
pub(crate) const INFO_PRINT_TEMPLATE: &str = "after_move:MF_INFO|%(.{id,title,ext,filepath})j";

/// Classified engine output line.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum EngineLine {
    Progress(ProgressEvent),
    Info(MediaInfo),
    InvalidInfo(String),
    Warning(String),
    Error(String),
    Other(String),
    Blank,
}

/// Classifies one output line.
pub(crate) fn parse_line(line: &str) -> EngineLine {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return EngineLine::Blank;
    }

    if let Some(rest) = trimmed.strip_prefix(PROGRESS_MARKER) {
        return parse_progress(rest).map_or_else(
            || EngineLine::Other(trimmed.to_string()),
            EngineLine::Progress,
        );
    }

    if let Some(rest) = trimmed.strip_prefix(INFO_MARKER) {
        return match serde_json::from_str::<MediaInfo>(rest) {
            Ok(info) => EngineLine::Info(normalize_info(info)),
            Err(error) => EngineLine::InvalidInfo(error.to_string()),
        };
    }

    if let Some(rest) = trimmed.strip_prefix("ERROR:") {
        return EngineLine::Error(rest.trim().to_string());
    }

    if let Some(rest) = trimmed.strip_prefix("WARNING:") {
        return EngineLine::Warning(rest.trim().to_string());
    }

    EngineLine::Other(trimmed.to_string())
}

fn parse_progress(rest: &str) -> Option<ProgressEvent> {
    let mut fields = rest.splitn(5, '|');
    let phase = ProgressPhase::from_label(fields.next()?)?;
    let downloaded_bytes = parse_byte_count(fields.next());
    let total_bytes = parse_byte_count(fields.next());
    let total_bytes_estimate = parse_byte_count(fields.next());
    let filename = fields
        .next()
        .map(str::trim)
        .filter(|name| !name.is_empty() && *name != "NA")
        .map(str::to_string);

    Some(ProgressEvent {
        phase,
        downloaded_bytes,
        total_bytes,
        total_bytes_estimate,
        filename,
    })
}

/// Parses a byte count, accepting integers and the float form the engine
/// uses for estimates. `NA`, `None` and garbage yield `None`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn parse_byte_count(field: Option<&str>) -> Option<u64> {
    let raw = field?.trim();
    if let Ok(value) = raw.parse::<u64>() {
        return Some(value);
    }
    let value = raw.parse::<f64>().ok()?;
    (value.is_finite() && value >= 0.0).then(|| value.floor() as u64)
}

/// Strips the Windows verbatim prefix the engine sometimes reports.
fn normalize_info(mut info: MediaInfo) -> MediaInfo {
    info.filepath = info.filepath.and_then(|path| {
        let raw = path.to_string_lossy();
        let trimmed = raw.trim().trim_matches('"');
        if trimmed.is_empty() {
            return None;
        }
        let normalized = trimmed.strip_prefix("\\\\?\\").unwrap_or(trimmed);
        Some(PathBuf::from(normalized))
    });
    info
}

/// Accumulates what a run reported, for building the result afterwards.
#[derive(Debug, Default)]
pub(crate) struct RunTranscript {
    info: Option<MediaInfo>,
    last_error: Option<String>,
    last_line: Option<String>,
}

impl RunTranscript {
    /// Keeps the first metadata line; later entries of a multi-entry job are ignored.
    pub(crate) fn record_info(&mut self, info: MediaInfo) {
        if self.info.is_none() {
            self.info = Some(info);
        }
    }

    pub(crate) fn record_error(&mut self, message: String) {
        self.last_line = Some(message.clone());
        self.last_error = Some(message);
    }

    pub(crate) fn record_line(&mut self, line: &str) {
        self.last_line = Some(line.to_string());
    }

    /// Best description of why the run failed.
    pub(crate) fn failure_message(&self) -> String {
        self.last_error
            .clone()
            .or_else(|| self.last_line.clone())
            .unwrap_or_else(|| "yt-dlp failed without an error message".to_string())
    }

    pub(crate) fn into_info(self) -> Option<MediaInfo> {
        self.info
    }
}

/// Reads one line, replacing invalid UTF-8. Returns `None` at end of stream.
pub(crate) async fn read_lossy_line<R>(
    reader: &mut R,
    buffer: &mut Vec<u8>,
) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    buffer.clear();
    let bytes_read = reader.read_until(b'\n', buffer).await?;
    if bytes_read == 0 {
        return Ok(None);
    }
    while matches!(buffer.last(), Some(b'\n' | b'\r')) {
        buffer.pop();
    }
    Ok(Some(String::from_utf8_lossy(buffer).into_owned()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_downloading_line() {
        let line = "MF_PROGRESS|downloading|1024|4096|NA|/tmp/d/Clip.f137.mp4.part";
        let EngineLine::Progress(event) = parse_line(line) else {
            panic!("expected progress line");
        };
        assert_eq!(event.phase, ProgressPhase::Downloading);
        assert_eq!(event.downloaded_bytes, Some(1024));
        assert_eq!(event.total_bytes, Some(4096));
        assert_eq!(event.total_bytes_estimate, None);
        assert_eq!(event.filename.as_deref(), Some("/tmp/d/Clip.f137.mp4.part"));
    }

    #[test]
    fn test_parse_progress_accepts_float_estimate() {
        let line = "MF_PROGRESS|downloading|500|NA|2000.0|a.webm";
        let EngineLine::Progress(event) = parse_line(line) else {
            panic!("expected progress line");
        };
        assert_eq!(event.total_bytes, None);
        assert_eq!(event.total_bytes_estimate, Some(2000));
        assert_eq!(event.effective_total(), Some(2000));
    }

    #[test]
    fn test_parse_progress_keeps_pipes_in_filename() {
        let line = "MF_PROGRESS|finished|10|10|NA|/tmp/a|b.mp4";
        let EngineLine::Progress(event) = parse_line(line) else {
            panic!("expected progress line");
        };
        assert_eq!(event.phase, ProgressPhase::Finished);
        assert_eq!(event.filename.as_deref(), Some("/tmp/a|b.mp4"));
    }

    #[test]
    fn test_parse_progress_unknown_status_is_other() {
        let line = "MF_PROGRESS|processing|NA|NA|NA|NA";
        assert!(matches!(parse_line(line), EngineLine::Other(_)));
    }

    #[test]
    fn test_parse_info_line() {
        let line = r#"MF_INFO|{"id": "abc", "title": "Sample", "ext": "mp4", "filepath": "downloads/Sample.mp4"}"#;
        let EngineLine::Info(info) = parse_line(line) else {
            panic!("expected info line");
        };
        assert_eq!(info.title.as_deref(), Some("Sample"));
        assert_eq!(info.filepath, Some(PathBuf::from("downloads/Sample.mp4")));
    }

    #[test]
    fn test_parse_info_strips_verbatim_prefix() {
        let line = r#"MF_INFO|{"title": "T", "filepath": "\\\\?\\C:\\out\\T.mp4"}"#;
        let EngineLine::Info(info) = parse_line(line) else {
            panic!("expected info line");
        };
        assert_eq!(info.filepath, Some(PathBuf::from("C:\\out\\T.mp4")));
    }

    #[test]
    fn test_parse_invalid_info_line() {
        assert!(matches!(parse_line("MF_INFO|{not json"), EngineLine::InvalidInfo(_)));
    }

    #[test]
    fn test_parse_error_and_warning_lines() {
        assert_eq!(
            parse_line("ERROR: [youtube] abc: Private video. Sign in"),
            EngineLine::Error("[youtube] abc: Private video. Sign in".to_string())
        );
        assert_eq!(
            parse_line("WARNING: falling back to generic extractor"),
            EngineLine::Warning("falling back to generic extractor".to_string())
        );
        assert_eq!(parse_line("   "), EngineLine::Blank);
        assert_eq!(parse_line("[info] abc"), EngineLine::Other("[info] abc".to_string()));
    }

    #[test]
    fn test_transcript_prefers_error_line_and_first_info() {
        let mut transcript = RunTranscript::default();
        transcript.record_line("[download] 10%");
        assert_eq!(transcript.failure_message(), "[download] 10%");
        transcript.record_error("Video unavailable".to_string());
        transcript.record_line("trailing chatter");
        assert_eq!(transcript.failure_message(), "Video unavailable");

        transcript.record_info(MediaInfo::titled("first"));
        transcript.record_info(MediaInfo::titled("second"));
        assert_eq!(transcript.into_info().unwrap().title.as_deref(), Some("first"));
    }

    #[test]
    fn test_transcript_default_failure_message() {
        let transcript = RunTranscript::default();
        assert!(transcript.failure_message().contains("yt-dlp failed"));
    }

    #[tokio::test]
    async fn test_read_lossy_line_handles_crlf_and_invalid_utf8() {
        let data: &[u8] = b"first\r\nsec\xffond\nlast";
        let mut reader = tokio::io::BufReader::new(data);
        let mut buffer = Vec::new();
        assert_eq!(read_lossy_line(&mut reader, &mut buffer).await.unwrap().as_deref(), Some("first"));
        assert_eq!(
            read_lossy_line(&mut reader, &mut buffer).await.unwrap().as_deref(),
            Some("sec\u{fffd}ond")
        );
        assert_eq!(read_lossy_line(&mut reader, &mut buffer).await.unwrap().as_deref(), Some("last"));
        assert_eq!(read_lossy_line(&mut reader, &mut buffer).await.unwrap(), None);
    }
}
