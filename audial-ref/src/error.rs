//! Error types for audial-ref
//!
//! Retrieval distinguishes fatal failures from "nothing to show" outcomes:
//! [`Error::NotFound`] and [`Error::EmptyResult`] are reported to the user
//! but do not make the process exit non-zero.

use thiserror::Error;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Chroma profile with undefined key correlation (silence, constant input)
    #[error("Degenerate signal: {0}")]
    DegenerateSignal(String),

    /// Range argument that is not `lo:hi`, `lo:`, `:hi` or a number
    #[error("Malformed range '{0}': expected lo:hi, lo:, :hi or a number")]
    MalformedRange(String),

    /// Reference track or project not found (non-fatal)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Query produced no positive-scoring candidates (non-fatal)
    #[error("No results: {0}")]
    EmptyResult(String),

    /// External feature extractor failed or returned garbage
    #[error("Feature provider error: {0}")]
    Provider(String),

    /// Audio file could not be decoded or resampled
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// audial-common error
    #[error(transparent)]
    Common(#[from] audial_common::Error),
}

impl Error {
    /// Whether the CLI should exit non-zero for this error
    pub fn is_fatal(&self) -> bool {
        match self {
            Error::NotFound(_) | Error::EmptyResult(_) => false,
            Error::Common(audial_common::Error::NotFound(_)) => false,
            _ => true,
        }
    }
}
