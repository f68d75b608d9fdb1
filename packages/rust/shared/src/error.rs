//! Error types for auto-bank.
//!
//! Library crates use [`AutoBankError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all auto-bank operations.
#[derive(Debug, thiserror::Error)]
pub enum AutoBankError {
    /// No sound-bank files matched in the working directory. Fatal.
    #[error("No {extension} files found in the directory.")]
    NoInputFiles { extension: String },

    /// The external parser failed for one input file.
    ///
    /// Displays as the bare message so it can be written straight into
    /// the run log.
    #[error("{message}")]
    Parse { message: String },

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// YAML serialization or deserialization error.
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, AutoBankError>;

impl AutoBankError {
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

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
