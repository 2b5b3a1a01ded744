//! Error types for docbinder.
//!
//! Library crates use [`DocBinderError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all docbinder operations.
#[derive(Debug, thiserror::Error)]
pub enum DocBinderError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// HTML parsing or sanitizing error for a single page.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// The crawl root page does not exist.
    #[error("starting file not found: {}", path.display())]
    MissingRoot { path: PathBuf },

    /// Table-of-contents sidecar could not be read or parsed.
    #[error("toc error at {path:?}: {message}")]
    Toc { path: PathBuf, message: String },

    /// External renderer failed to produce a batch document.
    #[error("render error: {0}")]
    Render(String),

    /// Intermediate documents could not be merged into the output.
    #[error("merge error: {0}")]
    Merge(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DocBinderError>;

impl DocBinderError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a TOC error for the sidecar at `path`.
    pub fn toc(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::Toc {
            path: path.into(),
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
