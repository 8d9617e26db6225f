//! Logging setup.
//!
//! Installs a global `tracing` subscriber that writes human-readable lines to
//! stderr and, optionally, to a log file through a non-blocking writer.
//! `RUST_LOG` overrides the configured default filter.
//!
//! ```ignore
//! let _guard = init_logging(&LoggingConfig::default().with_log_file("globe-terrain.log"))?;
//! tracing::info!("ready");
//! ```
//!
//! Keep the returned [`LoggingGuard`] alive until exit; dropping it flushes
//! the file writer.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_DIRECTIVE: &str = "info";

/// Errors raised while installing the subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Invalid log filter '{directive}': {message}")]
    InvalidFilter { directive: String, message: String },

    #[error("Invalid log file path: {0}")]
    InvalidLogFile(PathBuf),

    #[error("Failed to create log directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("A global logger is already installed")]
    AlreadyInitialized,
}

/// Logging options.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset, e.g. `info,globe_terrain=debug`.
    pub default_directive: String,
    /// Optional file receiving a copy of every log line.
    pub log_file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default_directive: DEFAULT_DIRECTIVE.to_string(),
            log_file: None,
        }
    }
}

impl LoggingConfig {
    pub fn with_default_directive(mut self, directive: impl Into<String>) -> Self {
        self.default_directive = directive.into();
        self
    }

    pub fn with_log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }
}

/// Keeps the file writer's background thread alive.
#[must_use = "dropping the guard stops file logging"]
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Parses a filter directive.
pub fn parse_filter(directive: &str) -> Result<EnvFilter, LoggingError> {
    EnvFilter::try_new(directive).map_err(|e| LoggingError::InvalidFilter {
        directive: directive.to_string(),
        message: e.to_string(),
    })
}

/// Installs the global subscriber.
///
/// # Errors
///
/// Returns `LoggingError` if the filter is invalid, the log directory cannot
/// be created, or a subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<LoggingGuard, LoggingError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => parse_filter(&config.default_directive)?,
    };

    let (file_layer, file_guard) = match &config.log_file {
        Some(path) => {
            let (writer, guard) = tracing_appender::non_blocking(file_appender(path)?);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()
        .map_err(|_| LoggingError::AlreadyInitialized)?;

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

fn file_appender(path: &Path) -> Result<tracing_appender::rolling::RollingFileAppender, LoggingError> {
    let file_name = path
        .file_name()
        .ok_or_else(|| LoggingError::InvalidLogFile(path.to_path_buf()))?;
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(directory).map_err(|source| LoggingError::CreateDirectory {
        path: directory.to_path_buf(),
        source,
    })?;
    Ok(tracing_appender::rolling::never(directory, file_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.default_directive, "info");
        assert!(config.log_file.is_none());

        let config = config
            .with_default_directive("debug")
            .with_log_file("/tmp/gt.log");
        assert_eq!(config.default_directive, "debug");
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/gt.log")));
    }

    #[test]
    fn test_parse_filter() {
        assert!(parse_filter("info,globe_terrain=debug").is_ok());
        assert!(matches!(
            parse_filter("globe_terrain=loud"),
            Err(LoggingError::InvalidFilter { .. })
        ));
    }

    #[test]
    fn test_file_appender_creates_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("logs/nested/globe-terrain.log");
        let _appender = file_appender(&path).unwrap();
        assert!(dir.path().join("logs/nested").is_dir());
    }

    #[test]
    fn test_file_appender_rejects_directory_path() {
        assert!(matches!(
            file_appender(Path::new("/")),
            Err(LoggingError::InvalidLogFile(_))
        ));
    }
}
