//! Logging setup
//!
//! Two outputs:
//! - Console (stderr): INFO and above, concise
//! - File: configured level, rotated daily as `rubberpipe.log.YYYY-MM-DD`

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

const LOG_FILE_PREFIX: &str = "rubberpipe.log";

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Directory for log files
    pub log_directory: PathBuf,
    /// Level for file output; RUST_LOG overrides it (console always uses INFO)
    pub log_level: Level,
    /// Maximum number of rotated log files to keep
    pub max_files: u32,
}

impl LoggingConfig {
    /// Create from settings values; unknown levels fall back to INFO
    pub fn from_config(log_directory: &Path, log_level: &str, max_files: u32) -> Self {
        let level = match log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" | "warning" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };

        Self {
            log_directory: log_directory.to_path_buf(),
            log_level: level,
            max_files,
        }
    }
}

/// Initialize logging with console and file outputs
///
/// The returned guard flushes the file writer when dropped; keep it alive
/// for the whole program.
pub fn init_logging(config: &LoggingConfig) -> Result<LogGuard> {
    let log_dir = crate::config::expand_tilde(&config.log_directory);
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory: {:?}", log_dir))?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, LOG_FILE_PREFIX);
    let (non_blocking, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_filter(level_filter(config.log_level));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(console_filter());

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .context("Logging already initialized")?;

    cleanup_old_logs(&log_dir, config.max_files)?;

    Ok(LogGuard {
        _file_guard: file_guard,
    })
}

/// Console-only logging, for commands that run before settings are loaded
pub fn init_console_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Ignore a second initialization
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Console stays at INFO whatever RUST_LOG says
fn console_filter() -> EnvFilter {
    EnvFilter::new("info")
}

/// RUST_LOG wins over the configured level
fn level_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string().to_lowercase()))
}

/// Keep only the `max_files` most recently modified log files
fn cleanup_old_logs(log_dir: &Path, max_files: u32) -> Result<()> {
    let mut log_files: Vec<_> = fs::read_dir(log_dir)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry
                .file_name()
                .to_string_lossy()
                .starts_with(LOG_FILE_PREFIX)
        })
        .collect();

    log_files.sort_by_key(|entry| {
        std::cmp::Reverse(entry.metadata().and_then(|m| m.modified()).ok())
    });

    for file in log_files.into_iter().skip(max_files as usize) {
        match fs::remove_file(file.path()) {
            Ok(()) => tracing::debug!("Removed old log file: {:?}", file.path()),
            Err(e) => tracing::warn!("Failed to remove old log file {:?}: {}", file.path(), e),
        }
    }

    Ok(())
}

/// Guard that keeps the file writer alive
pub struct LogGuard {
    _file_guard: WorkerGuard,
}
