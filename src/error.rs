//! Errors raised while encoding documents.

use std::io;

use thiserror::Error;

use crate::config::ConfigError;
use crate::dialect::Dialect;

/// Result alias used throughout the encoder.
pub type Result<T> = std::result::Result<T, EncodeError>;

/// Errors raised while rendering a result or relation document.
///
/// Any error aborts the document being written; output produced before the
/// failure is not a valid document and must be discarded by the caller.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Writing to the sink failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// Expression could not be translated in any dialect of the fallback chain.
    #[error("cannot translate expression to {dialect}: {message}")]
    Translation {
        /// Last dialect attempted.
        dialect: Dialect,
        /// Failure reported for that dialect.
        message: String,
    },
    /// Literal could not be evaluated in any dialect of the fallback chain.
    #[error("cannot evaluate literal in {dialect}: {message}")]
    Evaluation {
        /// Last dialect attempted.
        dialect: Dialect,
        /// Failure reported for that dialect.
        message: String,
    },
    /// Cursor reported fewer cells (or column mappings) than its column count.
    #[error("row {row} has no cell for column {column}")]
    MissingCell {
        /// Zero-based row position.
        row: usize,
        /// Zero-based column position.
        column: usize,
    },
    /// Temporal value could not be formatted.
    #[error("temporal formatting failed: {0}")]
    Temporal(#[from] time::error::Format),
    /// Configuration could not be read or interpreted.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Fixture document is structurally invalid.
    #[error("invalid fixture: {0}")]
    Fixture(String),
    /// JSON (de)serialization failure.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl EncodeError {
    pub(crate) fn fixture(message: impl Into<String>) -> Self {
        EncodeError::Fixture(message.into())
    }
}
