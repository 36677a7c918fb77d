//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber:
//! - JSON or human-readable stdout formatting
//! - Optional daily-rolling file output, always JSON
//!
//! The library itself only emits `tracing` events; installing a
//! subscriber is the embedding application's call, and this module is
//! the batteries-included way to do it.

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Output format for the stdout layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Structured JSON lines.
    #[default]
    Json,
    /// Human-readable output for terminals.
    Pretty,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Default level directive; `RUST_LOG` still takes precedence.
    #[serde(default = "default_level")]
    pub level: String,

    /// Stdout format.
    #[serde(default)]
    pub format: LogFormat,

    /// When set, JSON logs are additionally written here with daily
    /// rotation.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
            log_dir: None,
        }
    }
}

/// Keeps the background log writer alive.
///
/// Dropping this flushes and stops the non-blocking file writer, so hold
/// it for the life of the program.
pub struct LogGuard {
    _guard: Option<WorkerGuard>,
}

/// Initializes the global tracing subscriber.
///
/// # Errors
/// Fails when the level directive does not parse or when a global
/// subscriber is already installed.
pub fn init_logging(config: &LogConfig) -> Result<LogGuard> {
    let default_level = parse_log_level(&config.level)?;
    // EnvFilter is not Clone, so each layer gets a fresh one.
    let env_filter = || {
        EnvFilter::builder()
            .with_default_directive(default_level.into())
            .from_env_lossy()
    };

    let guard = if let Some(ref log_dir) = config.log_dir {
        let file_appender = rolling::daily(log_dir, "optloop.log");
        let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

        // File output stays JSON regardless of the stdout format.
        let file_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(non_blocking_file)
            .with_ansi(false)
            .with_current_span(true)
            .with_target(true)
            .with_filter(env_filter());

        match config.format {
            LogFormat::Json => {
                let stdout_layer = tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(io::stdout)
                    .with_current_span(true)
                    .with_target(true)
                    .with_filter(env_filter());
                tracing_subscriber::registry()
                    .with(file_layer)
                    .with(stdout_layer)
                    .try_init()
                    .context("Failed to install global subscriber")?;
            }
            LogFormat::Pretty => {
                let stdout_layer = tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_writer(io::stdout)
                    .with_target(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .with_filter(env_filter());
                tracing_subscriber::registry()
                    .with(file_layer)
                    .with(stdout_layer)
                    .try_init()
                    .context("Failed to install global subscriber")?;
            }
        }

        Some(guard)
    } else {
        match config.format {
            LogFormat::Json => {
                let stdout_layer = tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(io::stdout)
                    .with_current_span(true)
                    .with_target(true)
                    .with_filter(env_filter());
                tracing_subscriber::registry()
                    .with(stdout_layer)
                    .try_init()
                    .context("Failed to install global subscriber")?;
            }
            LogFormat::Pretty => {
                let stdout_layer = tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_writer(io::stdout)
                    .with_target(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .with_filter(env_filter());
                tracing_subscriber::registry()
                    .with(stdout_layer)
                    .try_init()
                    .context("Failed to install global subscriber")?;
            }
        }

        None
    };

    tracing::info!(
        level = %config.level,
        format = ?config.format,
        file_output = config.log_dir.is_some(),
        "logger initialized"
    );

    Ok(LogGuard { _guard: guard })
}

/// Parses a log level string to a tracing Level.
fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!("Invalid log level: {level}. Must be one of: trace, debug, info, warn, error"),
    }
}
