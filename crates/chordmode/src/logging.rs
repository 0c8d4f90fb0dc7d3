//! Logging setup with file output.
//!
//! The demo runs the terminal in raw mode, so logs only ever go to a file.
//!
//! ## Environment Variables
//!
//! 1. **`CHORDMODE_LOG`** (highest priority) - a bare level such as `debug`
//!    applies to this crate only; anything with `=`, `:` or `,` is used as a
//!    full filter
//! 2. **`RUST_LOG`** - Standard tracing environment variable
//! 3. **Default** - `warn` globally, `info` for chordmode
//!
//! ## Log File Location
//!
//! Default: `<config_dir>/chordmode/logs/chordmode-<pid>.log`, overridden by
//! `--log-file <path>`.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub const LOG_ENV: &str = "CHORDMODE_LOG";

const DEFAULT_FILTER: &str = "warn,chordmode=info";

/// Returned from [`init`]; must be held alive to ensure log file flushing.
pub struct LogGuard {
    _file_guard: WorkerGuard,
    pub log_file: PathBuf,
}

#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    /// A file, or a directory to put the default file name in.
    pub log_file_path: Option<PathBuf>,
}

/// Initialize logging.
///
/// The returned [`LogGuard`] must be held for the lifetime of the program;
/// dropping it flushes and stops the background file writer. If a global
/// subscriber is already installed the new one is discarded.
pub fn init(config: LogConfig) -> Result<LogGuard> {
    let (log_dir, filename) = resolve_log_path(config.log_file_path);
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;

    let file_appender = tracing_appender::rolling::never(&log_dir, &filename);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_filter(create_filter());

    if tracing_subscriber::registry().with(file_layer).try_init().is_err() {
        tracing::debug!("logging already initialized");
    }

    Ok(LogGuard {
        _file_guard: file_guard,
        log_file: log_dir.join(filename),
    })
}

/// Initialize logging for tests: test writer only, safe to call repeatedly.
pub fn test() {
    let _ = fmt()
        .with_env_filter(create_filter())
        .with_test_writer()
        .try_init();
}

fn resolve_log_path(override_path: Option<PathBuf>) -> (PathBuf, String) {
    let filename = format!("chordmode-{}.log", std::process::id());

    if let Some(path) = override_path {
        if path.extension().is_some() {
            let dir = path.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or(filename);
            return (dir, name);
        }
        return (path, filename);
    }

    let dir = crate::config::log_dir().unwrap_or_else(|| PathBuf::from("."));
    (dir, filename)
}

/// Implements the priority system: `CHORDMODE_LOG` > `RUST_LOG` > defaults.
fn create_filter() -> EnvFilter {
    if let Ok(level) = env::var(LOG_ENV) {
        return expand_log_env(&level);
    }
    if let Ok(rust_log) = env::var("RUST_LOG") {
        return EnvFilter::new(rust_log);
    }
    EnvFilter::new(DEFAULT_FILTER)
}

fn expand_log_env(value: &str) -> EnvFilter {
    EnvFilter::new(expand_directives(value))
}

fn expand_directives(value: &str) -> String {
    if value.contains('=') || value.contains(':') || value.contains(',') {
        return value.to_string();
    }
    format!("warn,chordmode={value}")
}
