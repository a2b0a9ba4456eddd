//! Common error types for Audial

use std::path::PathBuf;
use thiserror::Error;

/// Common result type for Audial operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across Audial crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Track catalog file does not exist
    #[error("No track catalog found at {}", .0.display())]
    MissingCatalog(PathBuf),

    /// Catalog holds more than one record for an external id
    #[error("Duplicate track id in catalog: {0}")]
    DuplicateTrack(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
