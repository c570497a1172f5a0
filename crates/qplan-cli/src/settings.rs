//! QPLAN Settings
//!
//! Optional JSON settings file, read once at startup. Every field has a
//! default, so a partial (or missing) file is fine.

use anyhow::{Context, Result};
use qplan_explain::Dialect;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct QplanSettings {
    /// Dialect used when `--dialect` is not given
    pub default_dialect: Option<Dialect>,
    /// Pretty-print JSON output
    pub pretty: bool,
    pub logging: LoggingSettings,
}

/// Logging section; each field left out falls back to the preset's value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LoggingSettings {
    /// Base configuration the other fields override
    pub preset: LoggingPreset,
    /// `EnvFilter` directives; `RUST_LOG` takes precedence
    pub filter: Option<String>,
    /// Write JSON log files to the log directory
    pub json_logs: Option<bool>,
    /// Log to stderr
    pub console_logs: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LoggingPreset {
    #[default]
    Default,
    Development,
    Production,
    Testing,
}

impl QplanSettings {
    /// Loads the settings from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::settings_path()?)
    }

    /// Loads the settings from `path`; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {:?}", path))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings JSON in {:?}", path))
    }

    pub fn settings_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not find config directory")?;
        Ok(config_dir.join("qplan").join("settings.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = QplanSettings::load_from(&dir.path().join("settings.json")).unwrap();
        assert_eq!(settings, QplanSettings::default());
        assert_eq!(settings.logging.preset, LoggingPreset::Default);
        assert_eq!(settings.logging.console_logs, None);
    }

    #[test]
    fn test_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"default_dialect": "mariadb", "logging": {"preset": "production", "json_logs": true}}"#,
        )
        .unwrap();

        let settings = QplanSettings::load_from(&path).unwrap();
        assert_eq!(settings.default_dialect, Some(Dialect::Mariadb));
        assert!(!settings.pretty);
        assert_eq!(settings.logging.preset, LoggingPreset::Production);
        assert_eq!(settings.logging.json_logs, Some(true));
        assert_eq!(settings.logging.filter, None);
    }

    #[test]
    fn test_dialect_aliases_in_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"default_dialect": "PG"}"#).unwrap();

        let settings = QplanSettings::load_from(&path).unwrap();
        assert_eq!(settings.default_dialect, Some(Dialect::Postgresql));
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"default_dialect": "oracle"}"#).unwrap();

        let err = QplanSettings::load_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse settings JSON"));
    }
}
