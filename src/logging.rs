//! Tracing setup for the `dashsync` binary, driven by the `[logging]` config
//! section.
//!
//! Console output goes to stderr so the snapshot summary printed on stdout
//! stays clean. With `logging.file` on, each launch also writes
//! `dashsync_<timestamp>.log` under the app root and older files beyond
//! `logging.retain_files` are removed.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::SystemTime;

use time::{OffsetDateTime, UtcOffset, format_description::FormatItem, macros::format_description};
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{EnvFilter, Registry, filter::ParseError, fmt, prelude::*};

use crate::app_dirs::{self, AppDirError};
use crate::config::LogSettings;

const LOG_FILE_PREFIX: &str = "dashsync_";
const LOG_FILE_EXTENSION: &str = ".log";

/// Keeps the non-blocking file writer flushing for the life of the process.
static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Invalid log filter '{directive}': {source}")]
    InvalidFilter { directive: String, source: ParseError },
    #[error("No log directory: {0}")]
    LogDir(#[from] AppDirError),
    #[error("Failed to read log directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to remove old log file {path}: {source}")]
    RemoveFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to format log filename time: {0}")]
    FormatTime(#[from] time::error::Format),
    #[error("Failed to install global tracing subscriber: {0}")]
    SetGlobal(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Install the global subscriber described by `settings`.
///
/// Returns the path of this launch's log file when file output is on. On
/// error nothing is installed and the caller can carry on without logs.
pub fn init(settings: &LogSettings) -> Result<Option<PathBuf>, LoggingError> {
    let filter = build_filter(&settings.level, std::env::var(EnvFilter::DEFAULT_ENV).ok())?;
    let timer = build_timer();
    let console_layer = fmt::layer()
        .with_timer(timer.clone())
        .with_writer(std::io::stderr);

    let (file_layer, log_path) = if settings.file {
        let dir = app_dirs::logs_dir()?;
        // Leave room for the file this launch is about to create.
        prune_old_logs(&dir, settings.retain_files.saturating_sub(1))?;
        let name = log_file_name(now_local_or_utc())?;
        let (writer, guard) = tracing_appender::non_blocking(rolling::never(&dir, &name));
        let _ = FILE_GUARD.set(guard);
        let layer = fmt::layer()
            .with_ansi(false)
            .with_timer(timer)
            .with_writer(writer);
        (Some(layer), Some(dir.join(name)))
    } else {
        (None, None)
    };

    let subscriber = Registry::default()
        .with(filter)
        .with(console_layer)
        .with(file_layer);
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(log_path)
}

/// `RUST_LOG` wins over the configured level when it is set and non-blank.
fn build_filter(level: &str, env_directive: Option<String>) -> Result<EnvFilter, LoggingError> {
    let directive = env_directive
        .filter(|directive| !directive.trim().is_empty())
        .unwrap_or_else(|| level.to_string());
    EnvFilter::try_new(&directive)
        .map_err(|source| LoggingError::InvalidFilter { directive, source })
}

/// Remove the oldest `dashsync_*.log` files until at most `keep` remain.
/// Returns how many were removed.
fn prune_old_logs(dir: &Path, keep: usize) -> Result<usize, LoggingError> {
    let entries = fs::read_dir(dir).map_err(|source| LoggingError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut logs: Vec<(SystemTime, PathBuf)> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| is_log_file(path))
        .map(|path| {
            let modified = fs::metadata(&path)
                .and_then(|meta| meta.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            (modified, path)
        })
        .collect();
    logs.sort();

    let excess = logs.len().saturating_sub(keep);
    for (_, path) in logs.drain(..excess) {
        fs::remove_file(&path).map_err(|source| LoggingError::RemoveFile { path, source })?;
    }
    Ok(excess)
}

fn is_log_file(path: &Path) -> bool {
    path.is_file()
        && path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| {
                name.starts_with(LOG_FILE_PREFIX) && name.ends_with(LOG_FILE_EXTENSION)
            })
}

fn log_file_name(now: OffsetDateTime) -> Result<String, LoggingError> {
    const NAME_FORMAT: &[FormatItem<'_>] =
        format_description!("[year]-[month]-[day]_[hour]-[minute]-[second]");
    Ok(format!(
        "{LOG_FILE_PREFIX}{}{LOG_FILE_EXTENSION}",
        now.format(NAME_FORMAT)?
    ))
}

fn build_timer() -> fmt::time::OffsetTime<time::format_description::BorrowedFormatItem<'static>> {
    const DISPLAY_FORMAT: &[FormatItem<'static>] =
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    fmt::time::OffsetTime::new(offset, DISPLAY_FORMAT.into())
}

fn now_local_or_utc() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}
