//! Unified error types for sbom-convert.
//!
//! Hard failures (unreadable files, malformed JSON text, bad configuration)
//! surface as [`ConvertError`]. Everything that happens while mapping a
//! parsed document is reported through [`crate::model::Diagnostics`] instead,
//! so a single bad record never aborts a conversion.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for sbom-convert operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ConvertError {
    /// Input text is not valid JSON
    #[error("Invalid JSON input: {context}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// IO errors with context
    #[error("IO error at {path:?}: {message}")]
    Io {
        path: Option<PathBuf>,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Document matches neither supported format
    #[error("Unknown SBOM format - expected CycloneDX or SPDX markers")]
    UnknownFormat,

    /// Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Convenient Result type for sbom-convert operations
pub type Result<T> = std::result::Result<T, ConvertError>;

impl ConvertError {
    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let message = format!("{source}");
        Self::Io {
            path: Some(path.into()),
            message,
            source,
        }
    }

    /// Create a JSON error with context
    pub fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            context: context.into(),
            source,
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

impl From<std::io::Error> for ConvertError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: None,
            message: format!("{err}"),
            source: err,
        }
    }
}

impl From<serde_json::Error> for ConvertError {
    fn from(err: serde_json::Error) -> Self {
        Self::json("JSON deserialization", err)
    }
}
