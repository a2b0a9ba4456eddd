//! audial-ref library interface
//!
//! Mood classification of audio and retrieval over the reference-track
//! catalog. Exposed as a library for the binary and integration tests.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod prompt;
pub mod report;
pub mod retrieval;
pub mod utils;

pub use crate::config::EngineConfig;
pub use crate::error::{Error, Result};
