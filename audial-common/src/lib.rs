//! # Audial Common Library
//!
//! Shared code for the Audial reference-track tooling:
//! - Error type shared by every crate
//! - TOML bootstrap configuration and path resolution
//! - Tracing initialisation
//! - Track catalog persistence (`tracks.json`)
//! - Mood-board project persistence

pub mod catalog;
pub mod config;
pub mod error;
pub mod logging;
pub mod project;

pub use catalog::{Catalog, TrackRecord, UpsertOutcome};
pub use error::{Error, Result};
