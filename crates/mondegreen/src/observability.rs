//! Logging setup: a stderr layer plus an optional log file.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

const LOG_PATH_ENV: &str = "MONDEGREEN_LOG_PATH";
const LOG_DIR_ENV: &str = "MONDEGREEN_LOG_DIR";
const LOG_FILE_NAME: &str = "mondegreen.log";

/// Where logs go besides stderr.
#[derive(Debug, Clone, Default)]
pub struct ObservabilityConfig {
    /// Log file, if file logging is enabled.
    pub log_file: Option<PathBuf>,
}

impl ObservabilityConfig {
    /// Resolve the log file from the environment, then `config_log_dir`.
    ///
    /// `MONDEGREEN_LOG_PATH` names the file directly; `MONDEGREEN_LOG_DIR`
    /// (or the configured directory) gets `mondegreen.log`. Without any of
    /// them only stderr is used.
    pub fn from_env_with_overrides(config_log_dir: Option<PathBuf>) -> Self {
        let log_file = std::env::var_os(LOG_PATH_ENV)
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var_os(LOG_DIR_ENV)
                    .map(PathBuf::from)
                    .or(config_log_dir)
                    .map(|dir| dir.join(LOG_FILE_NAME))
            });
        Self { log_file }
    }
}

/// Keeps the file writer flushing until dropped.
#[derive(Debug)]
pub struct ObservabilityGuard {
    _file: Option<WorkerGuard>,
}

/// Global filter: `RUST_LOG` if set, otherwise from the CLI flags and config.
pub fn env_filter(quiet: bool, verbose: u8, default_level: &str) -> EnvFilter {
    if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        return EnvFilter::from_default_env();
    }
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => default_level,
            1 => "debug",
            _ => "trace",
        }
    };
    EnvFilter::new(level)
}

/// Stderr only shows warnings unless asked for more.
fn stderr_level(quiet: bool, verbose: u8) -> LevelFilter {
    if quiet {
        LevelFilter::ERROR
    } else if verbose > 0 || std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        LevelFilter::TRACE
    } else {
        LevelFilter::WARN
    }
}

/// Install the global subscriber.
pub fn init_observability(
    config: &ObservabilityConfig,
    filter: EnvFilter,
    quiet: bool,
    verbose: u8,
) -> anyhow::Result<ObservabilityGuard> {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(stderr_level(quiet, verbose));

    let (file_layer, guard) = match config.log_file.as_deref() {
        Some(path) => {
            let (writer, guard) = file_writer(path)?;
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("a global tracing subscriber is already installed")?;

    Ok(ObservabilityGuard { _file: guard })
}

fn file_writer(
    path: &Path,
) -> anyhow::Result<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .with_context(|| format!("log path has no file name: {}", path.display()))?;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create log directory {}", dir.display()))?;
    let appender = tracing_appender::rolling::never(dir, file_name);
    Ok(tracing_appender::non_blocking(appender))
}
