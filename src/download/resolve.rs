//! Locating the file a finished job produced.
//!
//! The engine sanitizes titles into filenames on its own, so the orchestrator
//! cannot compute the final path. It searches the output directory instead:
//!
//! 1. the path the engine reported, if it is a file directly in the directory;
//! 2. files whose name starts with the raw title, the exact `{title}.{ext}`
//!    first, then newest first;
//! 3. otherwise the three most recently modified files.
//!
//! Steps 2 and 3 are heuristics. Concurrent jobs writing into the same
//! directory, or titles that collide after sanitization, can pick the wrong
//! file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::{debug, instrument};

use super::error::DownloadError;
use crate::request::DownloadMode;

/// Number of recent files kept as candidates when no name matches.
pub const RECENT_FALLBACK_LIMIT: usize = 3;

/// Title used when the engine reports none.
pub const UNKNOWN_TITLE: &str = "Unknown";

/// A file on disk produced by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFile {
    /// Location of the file.
    pub path: PathBuf,
    /// Last modification time.
    pub modified: SystemTime,
}

impl ResolvedFile {
    /// File name component for display.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map_or_else(String::new, |name| name.to_string_lossy().into_owned())
    }
}

/// Which step of the search found the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionStrategy {
    /// The engine reported the final path.
    Reported,
    /// A file name started with the title.
    TitlePrefix,
    /// Nothing matched; the newest file in the directory was taken.
    RecentFallback,
}

impl ResolutionStrategy {
    /// Returns the stable string label for display output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Reported => "reported",
            Self::TitlePrefix => "title-prefix",
            Self::RecentFallback => "recent-fallback",
        }
    }
}

/// Outcome of the search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// The selected file.
    pub file: ResolvedFile,
    /// How it was found.
    pub strategy: ResolutionStrategy,
    /// All candidates at the winning step, selected file first.
    pub candidates: Vec<PathBuf>,
}

/// `{title}.{ext}` for the mode.
#[must_use]
pub fn expected_file_name(title: &str, mode: DownloadMode) -> String {
    format!("{title}.{}", mode.extension())
}

/// Finds the file a job wrote into `directory`.
///
/// # Errors
///
/// Returns [`DownloadError::Resolution`] when the directory holds no files
/// (or does not exist), and [`DownloadError::Io`] when it cannot be read.
#[instrument(skip(directory, reported), fields(directory = %directory.display()))]
pub fn resolve_output_file(
    directory: &Path,
    title: &str,
    mode: DownloadMode,
    reported: Option<&Path>,
) -> Result<Resolution, DownloadError> {
    let files = match list_files(directory) {
        Ok(files) => files,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            return Err(DownloadError::resolution(directory));
        }
        Err(error) => return Err(DownloadError::io(directory, error)),
    };

    if let Some(file) = reported.and_then(|path| reported_file(&files, directory, path)) {
        debug!(path = %file.path.display(), "using engine-reported path");
        return Ok(Resolution {
            candidates: vec![file.path.clone()],
            file,
            strategy: ResolutionStrategy::Reported,
        });
    }

    let expected = expected_file_name(title, mode);
    let mut prefixed: Vec<&ResolvedFile> = files
        .iter()
        .filter(|file| file.file_name().starts_with(title))
        .collect();
    prefixed.sort_by(|a, b| {
        let a_exact = a.file_name() == expected;
        let b_exact = b.file_name() == expected;
        b_exact
            .cmp(&a_exact)
            .then_with(|| b.modified.cmp(&a.modified))
            .then_with(|| a.path.cmp(&b.path))
    });

    let (strategy, candidates) = if prefixed.is_empty() {
        let mut recent: Vec<&ResolvedFile> = files.iter().collect();
        recent.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| a.path.cmp(&b.path)));
        recent.truncate(RECENT_FALLBACK_LIMIT);
        debug!(
            title,
            candidates = recent.len(),
            "no file name starts with the title; using most recent files"
        );
        (ResolutionStrategy::RecentFallback, recent)
    } else {
        (ResolutionStrategy::TitlePrefix, prefixed)
    };

    let Some(first) = candidates.first() else {
        return Err(DownloadError::resolution(directory));
    };

    Ok(Resolution {
        file: (*first).clone(),
        strategy,
        candidates: candidates.iter().map(|file| file.path.clone()).collect(),
    })
}

/// Regular files in `directory`, sorted by name. A missing directory is empty.
///
/// # Errors
///
/// Returns [`DownloadError::Io`] when the directory exists but cannot be read.
pub fn list_downloaded_files(directory: &Path) -> Result<Vec<PathBuf>, DownloadError> {
    match list_files(directory) {
        Ok(files) => {
            let mut paths: Vec<PathBuf> = files.into_iter().map(|file| file.path).collect();
            paths.sort();
            Ok(paths)
        }
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(error) => Err(DownloadError::io(directory, error)),
    }
}

fn list_files(directory: &Path) -> std::io::Result<Vec<ResolvedFile>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(directory)? {
        let entry = entry?;
        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        if !metadata.is_file() {
            continue;
        }
        files.push(ResolvedFile {
            path: entry.path(),
            modified: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
        });
    }
    Ok(files)
}

fn reported_file(files: &[ResolvedFile], directory: &Path, reported: &Path) -> Option<ResolvedFile> {
    let name = reported.file_name()?;
    let in_directory = reported
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .is_none_or(|parent| same_directory(parent, directory));
    if !in_directory {
        return None;
    }
    files
        .iter()
        .find(|file| file.path.file_name() == Some(name))
        .cloned()
}

fn same_directory(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::Duration;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str, age_secs: u64) -> PathBuf {
        let path = dir.join(name);
        let file = File::create(&path).unwrap();
        let modified = SystemTime::now() - Duration::from_secs(age_secs);
        file.set_modified(modified).unwrap();
        path
    }

    #[test]
    fn test_prefix_match_finds_exact_title() {
        let temp = TempDir::new().unwrap();
        let path = touch(temp.path(), "Sample.mp4", 10);
        touch(temp.path(), "Other.mp4", 1);

        let resolution =
            resolve_output_file(temp.path(), "Sample", DownloadMode::Video, None).unwrap();
        assert_eq!(resolution.strategy, ResolutionStrategy::TitlePrefix);
        assert_eq!(resolution.file.path, path);
        assert_eq!(resolution.candidates.len(), 1);
    }

    #[test]
    fn test_prefix_match_prefers_expected_extension() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "Sample.webm", 1);
        let expected = touch(temp.path(), "Sample.mp4", 100);

        let resolution =
            resolve_output_file(temp.path(), "Sample", DownloadMode::Video, None).unwrap();
        assert_eq!(resolution.file.path, expected);
        assert_eq!(resolution.candidates.len(), 2);
    }

    #[test]
    fn test_sanitized_title_falls_back_to_recent_files() {
        let temp = TempDir::new().unwrap();
        let path = touch(temp.path(), "My_Video.mp3", 5);

        let resolution =
            resolve_output_file(temp.path(), "My Video", DownloadMode::Audio, None).unwrap();
        assert_eq!(resolution.strategy, ResolutionStrategy::RecentFallback);
        assert_eq!(resolution.file.path, path);
    }

    #[test]
    fn test_fallback_keeps_three_newest() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "a.mp4", 40);
        let newest = touch(temp.path(), "b.mp4", 1);
        touch(temp.path(), "c.mp4", 20);
        touch(temp.path(), "d.mp4", 30);

        let resolution =
            resolve_output_file(temp.path(), "Nothing Matches", DownloadMode::Video, None).unwrap();
        assert_eq!(resolution.file.path, newest);
        assert_eq!(resolution.candidates.len(), RECENT_FALLBACK_LIMIT);
        assert!(!resolution.candidates.contains(&temp.path().join("a.mp4")));
    }

    #[test]
    fn test_empty_directory_is_resolution_error() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("subdir")).unwrap();

        let err = resolve_output_file(temp.path(), "Sample", DownloadMode::Video, None).unwrap_err();
        assert!(matches!(err, DownloadError::Resolution { .. }));
    }

    #[test]
    fn test_missing_directory_is_resolution_error() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope");
        let err = resolve_output_file(&missing, "Sample", DownloadMode::Video, None).unwrap_err();
        assert!(matches!(err, DownloadError::Resolution { .. }));
    }

    #[test]
    fn test_reported_path_wins_over_heuristics() {
        let temp = TempDir::new().unwrap();
        let reported = touch(temp.path(), "Cafe_Song.mp3", 50);
        touch(temp.path(), "Caf\u{e9} Song (live).mp3", 1);

        let resolution = resolve_output_file(
            temp.path(),
            "Caf\u{e9} Song",
            DownloadMode::Audio,
            Some(&reported),
        )
        .unwrap();
        assert_eq!(resolution.strategy, ResolutionStrategy::Reported);
        assert_eq!(resolution.file.path, reported);
    }

    #[test]
    fn test_reported_path_outside_directory_is_ignored() {
        let temp = TempDir::new().unwrap();
        let other = TempDir::new().unwrap();
        let outside = touch(other.path(), "Sample.mp4", 1);
        let inside = touch(temp.path(), "Sample.mp4", 1);

        let resolution =
            resolve_output_file(temp.path(), "Sample", DownloadMode::Video, Some(&outside))
                .unwrap();
        assert_eq!(resolution.strategy, ResolutionStrategy::TitlePrefix);
        assert_eq!(resolution.file.path, inside);
    }

    #[test]
    fn test_list_downloaded_files_sorted_and_missing_dir_empty() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "b.mp3", 1);
        touch(temp.path(), "a.mp4", 1);
        std::fs::create_dir(temp.path().join("nested")).unwrap();

        let files = list_downloaded_files(temp.path()).unwrap();
        assert_eq!(files, vec![temp.path().join("a.mp4"), temp.path().join("b.mp3")]);

        let missing = list_downloaded_files(&temp.path().join("missing")).unwrap();
        assert!(missing.is_empty());
    }

    #[test]
    fn test_expected_file_name_per_mode() {
        assert_eq!(expected_file_name("Sample", DownloadMode::Video), "Sample.mp4");
        assert_eq!(expected_file_name("Sample", DownloadMode::Audio), "Sample.mp3");
    }
}
