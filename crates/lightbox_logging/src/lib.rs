//! Shared logging utilities for Lightbox host binaries.

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_LOG_FILTER: &str =
    "lightbox_triage=info,lightbox_store=info,lightbox_model=info";

/// Logging configuration shared by Lightbox hosts.
pub struct LogConfig<'a> {
    pub app_name: &'a str,
    pub verbose: bool,
}

/// Keeps the background log writer alive; drop at process exit.
pub struct LogGuard {
    _file: WorkerGuard,
}

/// Initialize tracing with a daily-rolling file writer and stderr output.
pub fn init_logging(config: LogConfig<'_>) -> Result<LogGuard> {
    let log_dir = ensure_logs_dir().context("Failed to ensure log directory")?;
    let appender = tracing_appender::rolling::daily(
        log_dir,
        format!("{}.log", sanitize_name(config.app_name)),
    );
    let (file_writer, file_guard) = tracing_appender::non_blocking(appender);

    let console_filter = if config.verbose {
        default_filter()
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .with_filter(default_filter()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(console_filter),
        )
        .init();

    Ok(LogGuard { _file: file_guard })
}

/// Get the Lightbox home directory: ~/.lightbox
pub fn lightbox_home() -> PathBuf {
    if let Ok(override_path) = std::env::var("LIGHTBOX_HOME") {
        return PathBuf::from(override_path);
    }
    dirs::home_dir()
        .expect("Could not determine home directory")
        .join(".lightbox")
}

/// Get the logs directory: ~/.lightbox/logs
pub fn logs_dir() -> PathBuf {
    lightbox_home().join("logs")
}

/// Ensure the logs directory exists.
pub fn ensure_logs_dir() -> Result<PathBuf> {
    let logs = logs_dir();
    fs::create_dir_all(&logs)
        .with_context(|| format!("Failed to create logs directory: {}", logs.display()))?;
    Ok(logs)
}

fn default_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                ch
            } else {
                '_'
            }
        })
        .collect()
}
