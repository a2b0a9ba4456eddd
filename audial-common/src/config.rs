//! Configuration loading and path resolution
//!
//! Configuration is a single optional TOML file. Each crate deserializes the
//! sections it owns from the same text: this module owns the bootstrap keys
//! (`catalog_path`, `projects_dir`, `[logging]`), the engine crate owns its
//! tuning tables. Every key has a built-in default, so a missing file only
//! produces a warning.
//!
//! # Resolution priority
//!
//! Config file:
//! 1. Command-line argument (`--config`)
//! 2. Environment variable `AUDIAL_CONFIG`
//! 3. `<config dir>/audial/config.toml`
//! 4. No file: built-in defaults
//!
//! Catalog file:
//! 1. Command-line argument (`--catalog`)
//! 2. Environment variable `AUDIAL_CATALOG`
//! 3. TOML `catalog_path`
//! 4. `<local data dir>/audial/tracks.json`

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "AUDIAL_CONFIG";

/// Environment variable naming the track catalog
pub const CATALOG_ENV_VAR: &str = "AUDIAL_CATALOG";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TomlConfig {
    /// Track catalog JSON file (optional)
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,

    /// Directory holding mood-board project files (optional)
    #[serde(default)]
    pub projects_dir: Option<PathBuf>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// The located config file and its raw text
///
/// Kept as text so that several crates can deserialize their own sections
/// from the same document.
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    /// Path the text was read from, if any
    pub path: Option<PathBuf>,
    /// Raw TOML text, `None` when no file was found
    pub contents: Option<String>,
}

impl ConfigFile {
    /// Locate and read the config file
    ///
    /// A file that cannot be found or read is logged and treated as absent.
    pub fn locate(cli_arg: Option<&Path>) -> Self {
        let Some(path) = resolve_config_path(cli_arg) else {
            debug!("No config file found, using built-in defaults");
            return Self::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(contents) => {
                debug!("Loaded config file: {}", path.display());
                Self {
                    path: Some(path),
                    contents: Some(contents),
                }
            }
            Err(e) => {
                warn!(
                    "Config file {} unreadable ({}), using built-in defaults",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Build from in-memory TOML text
    pub fn from_text(contents: impl Into<String>) -> Self {
        Self {
            path: None,
            contents: Some(contents.into()),
        }
    }

    /// Deserialize a section type from the file, or its default if absent
    ///
    /// A file that exists but does not parse is an error.
    pub fn parse<T: DeserializeOwned + Default>(&self) -> Result<T> {
        match &self.contents {
            Some(text) => toml::from_str(text).map_err(|e| {
                let origin = self
                    .path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "<inline>".to_string());
                Error::Config(format!("{}: {}", origin, e))
            }),
            None => Ok(T::default()),
        }
    }
}

/// Resolve the config file path following the priority order above
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Platform config directory
    dirs::config_dir()
        .map(|d| d.join("audial").join("config.toml"))
        .filter(|p| p.exists())
}

/// Resolve the catalog path following the priority order above
pub fn resolve_catalog_path(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(CATALOG_ENV_VAR) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &config.catalog_path {
        return path.clone();
    }

    default_data_dir().join("tracks.json")
}

/// Resolve the mood-board project directory
pub fn resolve_projects_dir(config: &TomlConfig) -> PathBuf {
    config
        .projects_dir
        .clone()
        .unwrap_or_else(|| default_data_dir().join("projects"))
}

/// OS-dependent default data folder
///
/// `~/.local/share/audial` on Linux, the platform equivalent elsewhere.
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("audial"))
        .unwrap_or_else(|| PathBuf::from("./audial_data"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let file = ConfigFile::default();
        let config: TomlConfig = file.parse().unwrap();
        assert!(config.catalog_path.is_none());
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_parse_bootstrap_keys() {
        let file = ConfigFile::from_text(
            r#"
            catalog_path = "/srv/audial/tracks.json"

            [logging]
            level = "debug"
            "#,
        );
        let config: TomlConfig = file.parse().unwrap();
        assert_eq!(
            config.catalog_path,
            Some(PathBuf::from("/srv/audial/tracks.json"))
        );
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_unknown_sections_are_ignored() {
        let file = ConfigFile::from_text("[similarity]\nenergy = 3.0\n");
        let config: TomlConfig = file.parse().unwrap();
        assert!(config.projects_dir.is_none());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let file = ConfigFile::from_text("catalog_path = [");
        let result: Result<TomlConfig> = file.parse();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_cli_catalog_path_wins() {
        let config = TomlConfig {
            catalog_path: Some(PathBuf::from("/from/toml.json")),
            ..Default::default()
        };
        let path = resolve_catalog_path(Some(Path::new("/from/cli.json")), &config);
        assert_eq!(path, PathBuf::from("/from/cli.json"));
    }
}
