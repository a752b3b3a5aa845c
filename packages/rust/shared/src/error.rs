//! Error types for plotsift.
//!
//! Library crates use [`PlotsiftError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all plotsift operations.
#[derive(Debug, thiserror::Error)]
pub enum PlotsiftError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error while talking to the lookup service.
    #[error("network error: {0}")]
    Network(String),

    /// Response body could not be decoded.
    #[error("decode error: {message}")]
    Decode { message: String },

    /// A data line had fewer columns than the fixed layout requires.
    #[error("malformed line: expected at least {expected} fields, found {found}")]
    MalformedLine { expected: usize, found: usize },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Reading from the line source failed mid-scan.
    #[error("failed to read input: {0}")]
    Source(#[from] std::io::Error),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PlotsiftError>;

impl PlotsiftError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a decode error from any displayable message.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode {
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
