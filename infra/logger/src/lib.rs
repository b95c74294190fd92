//! # Logger
//!
//! A centralized logging utility for the project. It provides a unified way
//! to configure console and file logging with rotation, non-blocking I/O,
//! and environment-based filtering.
//!
//! * Use [`LoggerBuilder::env_filter`] to set module-directed filters
//!   (e.g., `"filehub=debug,hyper=info"`), in addition to `RUST_LOG`.
//! * File logging rotates per the configured [`Rotation`] and keeps at most
//!   `max_files` old files.
//!
//! ## Example
//!
//! ```rust
//! # use fhub_logger::{Logger, LevelFilter};
//! let _logger = Logger::builder()
//!     .name("my-app")
//!     .level(LevelFilter::DEBUG)
//!     .init()
//!     .unwrap();
//! ```

mod error;

pub use crate::error::LoggerError;
pub use tracing::level_filters::LevelFilter;
pub use tracing_appender::rolling::Rotation;

use std::fs;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const DEFAULT_MAX_FILES: usize = 10;
const LOG_FILE_SUFFIX: &str = "log";

/// A builder for configuring and initializing the global tracing subscriber.
#[must_use = "The builder must be configured before it can initialize the logger."]
#[derive(Debug)]
pub struct LoggerBuilder {
    name: String,
    console: bool,
    path: Option<PathBuf>,
    level: LevelFilter,
    rotation: Rotation,
    max_files: usize,
    json: bool,
    env_filter: Option<String>,
}

impl LoggerBuilder {
    /// Sets the name of the logger; also the rolling log file prefix.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Enables console logging.
    pub const fn console(mut self, enabled: bool) -> Self {
        self.console = enabled;
        self
    }

    /// Sets the directory to write rolling log files into.
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Configures the minimum log level to be emitted.
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    /// Configures the log file rotation strategy.
    pub const fn rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    /// Configures the maximum number of log files to keep.
    pub const fn max_files(mut self, max: usize) -> Self {
        self.max_files = max;
        self
    }

    /// Emits file logs as JSON lines.
    pub const fn json(mut self) -> Self {
        self.json = true;
        self
    }

    /// Adds an explicit env filter (e.g., `filehub=debug,hyper=info`).
    ///
    /// `RUST_LOG` still overrides; this is a programmatic default.
    pub fn env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Consumes the builder and installs the global tracing subscriber.
    ///
    /// # Returns
    /// A [`Logger`] handle. The handle owns the non-blocking file worker
    /// guard and must stay alive for the duration of the program so buffered
    /// logs are flushed.
    ///
    /// # Errors
    /// Returns [`LoggerError::Subscriber`] if a global subscriber is already
    /// set and [`LoggerError::InvalidConfiguration`] for bad settings.
    pub fn init(self) -> Result<Logger, LoggerError> {
        if self.name.trim().is_empty() {
            return Err(LoggerError::InvalidConfiguration("logger name cannot be empty".into()));
        }
        if self.max_files == 0 {
            return Err(LoggerError::InvalidConfiguration(
                "max_files must be greater than zero".into(),
            ));
        }

        let env_filter = self.build_env_filter()?;
        let mut layers = Vec::new();

        if self.console {
            layers.push(layer().compact().with_ansi(true).boxed());
        }

        let guard = if let Some(path) = self.path {
            fs::create_dir_all(&path)?;

            let file_appender = RollingFileAppender::builder()
                .rotation(self.rotation)
                .filename_prefix(&self.name)
                .filename_suffix(LOG_FILE_SUFFIX)
                .max_log_files(self.max_files)
                .build(path)?;

            let (non_blocking, g) = tracing_appender::non_blocking(file_appender);
            let file_layer = layer().with_writer(non_blocking).with_ansi(false);
            layers.push(if self.json { file_layer.json().boxed() } else { file_layer.boxed() });
            Some(g)
        } else {
            None
        };

        if layers.is_empty() {
            return Err(LoggerError::InvalidConfiguration(
                "no logging layers enabled; enable console or file output".into(),
            ));
        }

        tracing_subscriber::registry().with(env_filter).with(layers).try_init()?;

        Ok(Logger { guard })
    }

    fn build_env_filter(&self) -> Result<EnvFilter, LoggerError> {
        let builder = EnvFilter::builder().with_default_directive(self.level.into());
        self.env_filter.as_ref().map_or_else(
            || Ok(builder.from_env_lossy()),
            |filter| {
                builder.parse(filter).map_err(|e| {
                    LoggerError::InvalidConfiguration(format!("invalid env filter '{filter}': {e}"))
                })
            },
        )
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self {
            name: String::new(),
            console: true,
            path: None,
            level: LevelFilter::INFO,
            rotation: Rotation::DAILY,
            max_files: DEFAULT_MAX_FILES,
            json: false,
            env_filter: None,
        }
    }
}

/// A handle to the initialized logging system.
///
/// Holds the background worker guard; drop only at shutdown.
#[must_use = "Dropping this handle stops background logging threads."]
#[derive(Debug)]
pub struct Logger {
    guard: Option<WorkerGuard>,
}

impl Logger {
    /// Returns a new [`LoggerBuilder`].
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::default()
    }

    /// Best-effort synchronization point before shutdown.
    pub fn flush(&self) {
        tracing::debug!("Logger flushed");
    }

    /// The underlying worker guard, when file logging is active.
    #[must_use]
    pub const fn guard(&self) -> Option<&WorkerGuard> {
        self.guard.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    #[serial]
    fn builder_defaults() {
        let builder = Logger::builder().name("test-app").env_filter("filehub=debug");
        assert!(builder.console);
        assert_eq!(builder.level, LevelFilter::INFO);
        assert_eq!(builder.env_filter.as_deref(), Some("filehub=debug"));
        assert!(builder.path.is_none());
    }

    #[test]
    #[serial]
    fn rejects_empty_name_and_zero_max_files() {
        assert!(Logger::builder().init().is_err());
        assert!(Logger::builder().name("x").max_files(0).init().is_err());
    }

    #[test]
    #[serial]
    fn file_logging_creates_log_files() {
        let tmp = tempdir().unwrap();
        let log_dir = tmp.path().join("logs");

        let logger = Logger::builder()
            .name("test-app")
            .path(&log_dir)
            .level(LevelFilter::INFO)
            .init()
            .unwrap();

        tracing::info!("hello world");
        std::thread::sleep(Duration::from_millis(20));
        logger.flush();

        assert!(log_dir.exists(), "log directory should be created by logger init");
        let has_log = std::fs::read_dir(&log_dir)
            .unwrap()
            .flatten()
            .any(|entry| entry.path().extension().and_then(|e| e.to_str()) == Some("log"));
        assert!(has_log, "at least one log file should be created");
    }
}
