//! Shared helpers for integration tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use mediafetch_core::download::ProgressCallback;
use mediafetch_core::{
    Engine, EngineConfig, EngineError, MediaInfo, ProgressEvent, ProgressSink, ProgressUpdate,
};

/// How a [`ScriptedEngine`] run ends.
#[derive(Debug, Clone)]
pub enum ScriptedResult {
    Success(MediaInfo),
    Failure(String),
}

/// Engine double: emits canned events, writes files into the output directory,
/// then returns a canned result.
#[derive(Debug, Clone)]
pub struct ScriptedEngine {
    events: Vec<ProgressEvent>,
    files: Vec<String>,
    result: ScriptedResult,
    calls: Arc<AtomicUsize>,
    seen_configs: Arc<std::sync::Mutex<Vec<EngineConfig>>>,
}

impl ScriptedEngine {
    pub fn succeeding(title: &str) -> Self {
        Self::with_result(ScriptedResult::Success(MediaInfo::titled(title)))
    }

    pub fn failing(message: &str) -> Self {
        Self::with_result(ScriptedResult::Failure(message.to_string()))
    }

    pub fn with_result(result: ScriptedResult) -> Self {
        Self {
            events: Vec::new(),
            files: Vec::new(),
            result,
            calls: Arc::new(AtomicUsize::new(0)),
            seen_configs: Arc::new(std::sync::Mutex::new(Vec::new())),
        }
    }

    #[must_use]
    pub fn emitting(mut self, events: Vec<ProgressEvent>) -> Self {
        self.events = events;
        self
    }

    /// File created in the output directory during the run.
    #[must_use]
    pub fn writing(mut self, file_name: &str) -> Self {
        self.files.push(file_name.to_string());
        self
    }

    /// Shared call counter; clone it before handing the engine away.
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    pub fn seen_configs(&self) -> Arc<std::sync::Mutex<Vec<EngineConfig>>> {
        Arc::clone(&self.seen_configs)
    }
}

/// Output directory encoded in the engine's output template.
pub fn template_dir(config: &EngineConfig) -> PathBuf {
    Path::new(&config.output_template)
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default()
}

#[async_trait]
impl Engine for ScriptedEngine {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn run(
        &self,
        _url: &str,
        config: &EngineConfig,
        on_progress: &mut ProgressCallback<'_>,
    ) -> Result<MediaInfo, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen_configs.lock().unwrap().push(config.clone());

        for event in &self.events {
            on_progress(event.clone());
        }

        let dir = template_dir(config);
        for name in &self.files {
            std::fs::write(dir.join(name), b"media").map_err(EngineError::io)?;
        }

        match &self.result {
            ScriptedResult::Success(info) => Ok(info.clone()),
            ScriptedResult::Failure(message) => Err(EngineError::failed(message.clone(), Some(1))),
        }
    }
}

/// Sink that records everything it receives.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub resets: usize,
    pub updates: Vec<ProgressUpdate>,
}

impl RecordingSink {
    pub fn percents(&self) -> Vec<u8> {
        self.updates.iter().filter_map(ProgressUpdate::percent).collect()
    }
}

impl ProgressSink for RecordingSink {
    fn reset(&mut self) {
        self.resets += 1;
    }

    fn update(&mut self, update: &ProgressUpdate) {
        self.updates.push(update.clone());
    }
}

/// Sink that panics on every reset and update.
#[derive(Debug, Default)]
pub struct PanickingSink;

impl ProgressSink for PanickingSink {
    fn reset(&mut self) {
        panic!("progress widget not ready");
    }

    fn update(&mut self, _update: &ProgressUpdate) {
        panic!("progress widget went away");
    }
}

/// Fake `yt-dlp` that downloads "Sample" into the directory of its `-o` template.
#[cfg(unix)]
pub const FAKE_YTDLP_SUCCESS: &str = r#"#!/bin/sh
out=""
prev=""
for arg in "$@"; do
  if [ "$prev" = "-o" ]; then out="$arg"; fi
  prev="$arg"
done
dir=$(dirname "$out")
echo "[youtube] Extracting URL"
echo "MF_PROGRESS|downloading|50|200|NA|$dir/Sample.mp4.part"
echo "MF_PROGRESS|downloading|NA|NA|NA|$dir/Sample.mp4.part"
echo "MF_PROGRESS|downloading|200|NA|200.0|$dir/Sample.mp4.part"
echo "MF_PROGRESS|finished|200|200|NA|$dir/Sample.mp4"
printf 'media' > "$dir/Sample.mp4"
echo "MF_INFO|{\"id\":\"abc\",\"title\":\"Sample\",\"ext\":\"mp4\",\"filepath\":\"$dir/Sample.mp4\"}"
"#;

/// Fake `yt-dlp` that fails the way a private video does.
#[cfg(unix)]
pub const FAKE_YTDLP_PRIVATE: &str = r#"#!/bin/sh
echo "[youtube] abc123: Downloading webpage"
echo "ERROR: [youtube] abc123: Private video. Sign in if you've been granted access to this video" >&2
exit 1
"#;

/// Fake `yt-dlp` that exits successfully without printing result metadata.
#[cfg(unix)]
pub const FAKE_YTDLP_SILENT: &str = "#!/bin/sh\nexit 0\n";

/// Writes an executable script into `dir`.
#[cfg(unix)]
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, body).unwrap();
    let mut permissions = std::fs::metadata(&path).unwrap().permissions();
    permissions.set_mode(0o755);
    std::fs::set_permissions(&path, permissions).unwrap();
    path
}
