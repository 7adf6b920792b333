//! Error types for Content Factory.
//!
//! Library crates use [`ContentFactoryError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all Content Factory operations.
#[derive(Debug, thiserror::Error)]
pub enum ContentFactoryError {
    /// Configuration loading or validation error, including missing operator input.
    #[error("config error: {message}")]
    Config { message: String },

    /// Transport-level failure talking to the generation service.
    #[error("network error: {0}")]
    Network(String),

    /// The generation service answered, but not with a usable completion.
    #[error("generation error: {0}")]
    Generation(String),

    /// The input table does not match the expected schema.
    #[error("malformed schema: {message}")]
    MalformedSchema { message: String },

    /// Data validation error (unsluggable label, bad value, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// HTML-to-document conversion error (strict mode only).
    #[error("conversion error: {0}")]
    Conversion(String),

    /// Failure producing an output artifact (document, archive).
    #[error("artifact error: {0}")]
    Artifact(String),

    /// CSV read/write error.
    #[error("csv error: {0}")]
    Csv(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ContentFactoryError>;

impl ContentFactoryError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a malformed-schema error from any displayable message.
    pub fn malformed_schema(msg: impl Into<String>) -> Self {
        Self::MalformedSchema {
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = ContentFactoryError::config("missing API key");
        assert_eq!(err.to_string(), "config error: missing API key");

        let err = ContentFactoryError::malformed_schema("missing column 'category'");
        assert_eq!(err.to_string(), "malformed schema: missing column 'category'");

        let err = ContentFactoryError::validation("label 'ßß' has no slug characters");
        assert!(err.to_string().contains("no slug characters"));
    }

    #[test]
    fn io_error_carries_path() {
        let err = ContentFactoryError::io(
            "/tmp/topics.csv",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        let msg = err.to_string();
        assert!(msg.contains("topics.csv"));
        assert!(msg.contains("gone"));
    }
}
