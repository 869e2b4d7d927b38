//! Logging configuration and initialization
//!
//! Assembly diagnostics, loader warnings and cache events are emitted with
//! `tracing`; this module wires them to a subscriber.

use std::path::PathBuf;

use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

pub use tracing_appender::non_blocking::WorkerGuard as LogGuard;

type InitError = Box<dyn std::error::Error + Send + Sync>;

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Write to stderr (default: true)
    pub console_enabled: bool,
    /// Write to a log file as well (default: false)
    pub file_path: Option<PathBuf>,
    /// JSON lines instead of compact text (default: false)
    pub json_format: bool,
    /// Filter used when no environment filter is set (default: "info")
    pub default_level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            console_enabled: true,
            file_path: None,
            json_format: false,
            default_level: "info".to_string(),
        }
    }
}

impl LogConfig {
    /// Filter directive: `STEREO_SLS_LOG`, then `RUST_LOG`, then the default.
    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_env("STEREO_SLS_LOG")
            .or_else(|_| EnvFilter::try_from_env("RUST_LOG"))
            .unwrap_or_else(|_| EnvFilter::new(&self.default_level))
    }

    /// `STEREO_SLS_LOG_FORMAT=json` overrides `json_format`.
    fn use_json(&self) -> bool {
        std::env::var("STEREO_SLS_LOG_FORMAT")
            .map(|v| v.eq_ignore_ascii_case("json"))
            .unwrap_or(self.json_format)
    }
}

/// Install the global subscriber.
///
/// Returns the file writer guard when file logging is enabled; keep it alive
/// until exit so buffered lines are flushed.
pub fn init_logging(config: &LogConfig) -> Result<Option<LogGuard>, InitError> {
    let use_json = config.use_json();
    let subscriber = tracing_subscriber::registry().with(config.env_filter());

    let mut guard = None;
    if let Some(path) = &config.file_path {
        let file = std::fs::File::create(path)?;
        let (writer, file_guard) = tracing_appender::non_blocking(file);
        guard = Some(file_guard);

        let file_layer = fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false);

        if config.console_enabled {
            subscriber
                .with(file_layer)
                .with(fmt::layer().with_target(true).compact())
                .try_init()?;
        } else {
            subscriber.with(file_layer).try_init()?;
        }
    } else if config.console_enabled {
        if use_json {
            subscriber
                .with(fmt::layer().json().with_target(true).with_thread_ids(true))
                .try_init()?;
        } else {
            subscriber
                .with(fmt::layer().with_target(true).compact())
                .try_init()?;
        }
    } else {
        subscriber.try_init()?;
    }

    tracing::debug!(
        target: "stereo_sls",
        version = env!("CARGO_PKG_VERSION"),
        json_format = use_json,
        file = ?config.file_path,
        "Logging initialized"
    );

    Ok(guard)
}
