//! Logging and tracing setup for the qplan binary
//!
//! Stdout carries the command's output, so console logs go to stderr. JSON
//! log files (for bug reports) are written to a daily rolling file in the
//! local data directory.

use crate::settings::{LoggingPreset, LoggingSettings};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Directory where log files should be written
    pub log_dir: PathBuf,

    /// Whether to write JSON log files
    pub enable_json_logs: bool,

    /// Whether to log to stderr
    pub enable_console_logs: bool,

    /// Whether to include file/line information in logs
    pub include_location: bool,

    /// Whether to log span open/close (the parse entry point is instrumented)
    pub enable_spans: bool,

    /// Default log level filter
    pub default_filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: log_directory(),
            enable_json_logs: false,
            enable_console_logs: true,
            include_location: false,
            enable_spans: false,
            default_filter: "warn,qplan_cli=info,qplan_explain=info".to_string(),
        }
    }
}

impl LoggingConfig {
    /// Verbose console output with locations and spans
    pub fn development() -> Self {
        Self {
            include_location: true,
            enable_spans: true,
            default_filter: "info,qplan_cli=debug,qplan_explain=debug".to_string(),
            ..Self::default()
        }
    }

    /// JSON log files only
    pub fn production() -> Self {
        Self {
            enable_json_logs: true,
            enable_console_logs: false,
            default_filter: "warn,qplan_explain=info".to_string(),
            ..Self::default()
        }
    }

    /// Console only, no files
    pub fn testing() -> Self {
        Self {
            log_dir: std::env::temp_dir().join("qplan-tests"),
            enable_json_logs: false,
            enable_console_logs: true,
            include_location: true,
            enable_spans: true,
            default_filter: "debug".to_string(),
        }
    }

    pub fn preset(preset: LoggingPreset) -> Self {
        match preset {
            LoggingPreset::Default => Self::default(),
            LoggingPreset::Development => Self::development(),
            LoggingPreset::Production => Self::production(),
            LoggingPreset::Testing => Self::testing(),
        }
    }

    /// The configured preset with the settings' explicit fields applied on top
    pub fn from_settings(settings: &LoggingSettings) -> Self {
        let mut config = Self::preset(settings.preset);
        if let Some(filter) = &settings.filter {
            config.default_filter = filter.clone();
        }
        if let Some(json_logs) = settings.json_logs {
            config.enable_json_logs = json_logs;
        }
        if let Some(console_logs) = settings.console_logs {
            config.enable_console_logs = console_logs;
        }
        config
    }
}

/// Installs the global subscriber
///
/// The returned guard flushes the JSON file writer when dropped and must be
/// held until the program exits.
pub fn init(config: LoggingConfig) -> anyhow::Result<Option<WorkerGuard>> {
    // RUST_LOG takes precedence over the configured filter
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    let span_events = if config.enable_spans {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let mut layers = Vec::new();
    let mut guard = None;

    if config.enable_console_logs {
        let console_layer = fmt::layer()
            .with_target(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_span_events(span_events.clone())
            .with_writer(std::io::stderr)
            .with_filter(env_filter.clone())
            .boxed();

        layers.push(console_layer);
    }

    if config.enable_json_logs {
        std::fs::create_dir_all(&config.log_dir)?;

        let file_appender = tracing_appender::rolling::daily(&config.log_dir, "qplan.log");
        let (non_blocking, worker_guard) = tracing_appender::non_blocking(file_appender);
        guard = Some(worker_guard);

        let json_layer = fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_span_events(span_events)
            .with_ansi(false)
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_writer(non_blocking)
            .with_filter(env_filter)
            .boxed();

        layers.push(json_layer);
    }

    tracing_subscriber::registry().with(layers).try_init()?;

    tracing::debug!(
        log_dir = %config.log_dir.display(),
        json_enabled = config.enable_json_logs,
        console_enabled = config.enable_console_logs,
        "Logging system initialized"
    );

    Ok(guard)
}

/// Get the log directory path
pub fn log_directory() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("qplan")
        .join("logs")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_config_defaults() {
        let config = LoggingConfig::default();
        assert!(config.enable_console_logs);
        assert!(!config.enable_json_logs);
        assert!(config.log_dir.ends_with("qplan/logs"));
    }

    #[test]
    fn test_presets() {
        let production = LoggingConfig::production();
        assert!(!production.enable_console_logs);
        assert!(production.enable_json_logs);
        assert!(!production.include_location);

        let development = LoggingConfig::development();
        assert!(development.enable_console_logs);
        assert!(development.enable_spans);

        let testing = LoggingConfig::testing();
        assert!(!testing.enable_json_logs);
        assert_eq!(testing.default_filter, "debug");
    }

    #[test]
    fn test_from_settings() {
        let settings = LoggingSettings {
            preset: LoggingPreset::Default,
            filter: Some("trace".to_string()),
            json_logs: Some(true),
            console_logs: Some(false),
        };
        let config = LoggingConfig::from_settings(&settings);
        assert_eq!(config.default_filter, "trace");
        assert!(config.enable_json_logs);
        assert!(!config.enable_console_logs);
    }

    #[test]
    fn test_preset_from_settings() {
        let settings = LoggingSettings {
            preset: LoggingPreset::Production,
            console_logs: Some(true),
            ..LoggingSettings::default()
        };
        let config = LoggingConfig::from_settings(&settings);
        assert!(config.enable_json_logs);
        assert!(config.enable_console_logs);
        assert_eq!(config.default_filter, LoggingConfig::production().default_filter);

        let config = LoggingConfig::from_settings(&LoggingSettings {
            preset: LoggingPreset::Testing,
            ..LoggingSettings::default()
        });
        assert_eq!(config.default_filter, "debug");
        assert!(!config.enable_json_logs);
    }
}
