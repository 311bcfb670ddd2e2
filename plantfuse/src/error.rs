//! Error types for plantfuse
//!
//! Every variant is fatal for the current run: the binary reports it and exits.

use thiserror::Error;

/// Main error type for the plantfuse library
#[derive(Error, Debug)]
pub enum Error {
    /// Input file missing, empty, or structurally unusable
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// A specific input line failed to parse (1-based line number)
    #[error("Invalid data format in line {line}: {reason}")]
    MalformedLine { line: usize, reason: String },

    /// Bad algorithm selector, ratio string, search bound or flag combination
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Fusion weights that cannot be normalized
    #[error("Invalid weights: {0}")]
    InvalidWeights(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Report serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration/bootstrap errors from plantfuse-common
    #[error(transparent)]
    Common(#[from] plantfuse_common::Error),
}

impl Error {
    pub(crate) fn line(line: usize, reason: impl Into<String>) -> Self {
        Error::MalformedLine {
            line,
            reason: reason.into(),
        }
    }
}

/// Convenience Result type using plantfuse Error
pub type Result<T> = std::result::Result<T, Error>;
