//! Error types for LakeSearch.
//!
//! Library crates use [`LakeSearchError`] via `thiserror`.
//! The CLI app crate wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all LakeSearch operations.
#[derive(Debug, thiserror::Error)]
pub enum LakeSearchError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// The metadata API rejected the bearer credential (HTTP 401/403).
    #[error("auth error (HTTP {status}): {message}")]
    Auth { status: u16, message: String },

    /// The metadata API answered with a non-success HTTP status.
    #[error("remote error (HTTP {status}): {message}")]
    Remote { status: u16, message: String },

    /// Transport-level network failure (connect, timeout, body read).
    #[error("network error: {0}")]
    Network(String),

    /// Search engine rejected a clear or a bulk write.
    #[error("index error: {0}")]
    Index(String),

    /// Database or storage layer error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (schema mismatch, invalid format, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, LakeSearchError>;

impl LakeSearchError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create an auth error for a rejected credential.
    pub fn auth(status: u16, msg: impl Into<String>) -> Self {
        Self::Auth {
            status,
            message: msg.into(),
        }
    }

    /// Create a remote error for a non-success HTTP status.
    pub fn remote(status: u16, msg: impl Into<String>) -> Self {
        Self::Remote {
            status,
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this is an HTTP 404 from the remote. Callers that treat
    /// "not found" as an empty listing branch on this.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Remote { status: 404, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = LakeSearchError::config("missing metadata base URL");
        assert_eq!(err.to_string(), "config error: missing metadata base URL");

        let err = LakeSearchError::auth(403, "/catalogs: credential rejected");
        assert!(err.to_string().contains("HTTP 403"));

        let err = LakeSearchError::remote(503, "/schemas: HTTP 503");
        assert!(err.to_string().contains("remote error"));
    }

    #[test]
    fn not_found_detection() {
        assert!(LakeSearchError::remote(404, "gone").is_not_found());
        assert!(!LakeSearchError::remote(500, "boom").is_not_found());
        assert!(!LakeSearchError::auth(404, "odd").is_not_found());
        assert!(!LakeSearchError::Network("timeout".into()).is_not_found());
    }
}
