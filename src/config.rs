//! Store configuration, persisted as TOML at `<root>/paperbase.toml`.
//!
//! Every field has a default; a missing config file means a default config.

use std::path::Path;

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from reading or writing the store config.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(paperbase::config::read),
        help("Ensure the config file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {path}")]
    #[diagnostic(
        code(paperbase::config::parse),
        help("Check the TOML syntax in paperbase.toml.")
    )]
    Parse { path: String, message: String },

    #[error("failed to write config: {path}")]
    #[diagnostic(
        code(paperbase::config::write),
        help("Ensure you have write permissions to the store root.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Per-store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Records older than this many days are stale.
    #[serde(default = "default_stale_threshold_days")]
    pub stale_threshold_days: u32,
    /// Reminders list used when a tag names none.
    #[serde(default)]
    pub default_reminder_list: Option<String>,
    /// Calendar used when a tag names none.
    #[serde(default)]
    pub default_calendar: Option<String>,
}

fn default_stale_threshold_days() -> u32 {
    7
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            stale_threshold_days: default_stale_threshold_days(),
            default_reminder_list: None,
            default_calendar: None,
        }
    }
}

impl StoreConfig {
    /// Load from `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(ConfigError::Read {
                    path: path.display().to_string(),
                    source: e,
                });
            }
        };
        toml::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Write to `path` as TOML.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let text = toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        std::fs::write(path, text).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let config = StoreConfig::load(Path::new("/nonexistent/paperbase.toml")).unwrap();
        assert_eq!(config.stale_threshold_days, 7);
        assert!(config.default_reminder_list.is_none());
    }

    #[test]
    fn roundtrip() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("paperbase.toml");
        let config = StoreConfig {
            stale_threshold_days: 14,
            default_reminder_list: Some("Work".into()),
            default_calendar: None,
        };
        config.save(&path).unwrap();
        let loaded = StoreConfig::load(&path).unwrap();
        assert_eq!(loaded.stale_threshold_days, 14);
        assert_eq!(loaded.default_reminder_list.as_deref(), Some("Work"));
    }

    #[test]
    fn partial_config_fills_defaults() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("paperbase.toml");
        std::fs::write(&path, "default_reminder_list = \"Inbox\"\n").unwrap();
        let config = StoreConfig::load(&path).unwrap();
        assert_eq!(config.stale_threshold_days, 7);
        assert_eq!(config.default_reminder_list.as_deref(), Some("Inbox"));
    }

    #[test]
    fn bad_toml_is_an_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("paperbase.toml");
        std::fs::write(&path, "stale_threshold_days = [nope").unwrap();
        assert!(matches!(
            StoreConfig::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
