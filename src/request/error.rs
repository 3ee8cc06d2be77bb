//! Error types for download request validation.

use thiserror::Error;

/// Errors that can occur while validating a download request.
///
/// Validation happens before any I/O; every variant is recoverable by the
/// user re-entering the URL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// URL is empty or whitespace-only.
    #[error("empty url\n  Suggestion: Provide a video URL such as https://www.youtube.com/watch?v=...")]
    EmptyUrl,

    /// URL does not start with a web scheme.
    #[error("invalid scheme in '{url}'\n  Suggestion: The URL must start with http:// or https://")]
    InvalidScheme {
        /// The URL that failed validation
        url: String,
    },
}

impl ValidationError {
    /// Creates an `InvalidScheme` error for the given URL.
    #[must_use]
    pub fn invalid_scheme(url: &str) -> Self {
        Self::InvalidScheme {
            url: url.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_url_display_starts_with_reason() {
        let msg = ValidationError::EmptyUrl.to_string();
        assert!(msg.starts_with("empty url"), "unexpected message: {msg}");
    }

    #[test]
    fn test_invalid_scheme_display_contains_url() {
        let msg = ValidationError::invalid_scheme("ftp://example.com/a.mp4").to_string();
        assert!(msg.starts_with("invalid scheme"), "unexpected message: {msg}");
        assert!(msg.contains("ftp://example.com/a.mp4"));
        assert!(msg.contains("http://"));
    }
}
