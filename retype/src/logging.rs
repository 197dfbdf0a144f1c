//! File logging, so nothing interferes with the typing session on screen

use std::fs;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

use crate::config::{LOG_ENV, LogSettings};

const LOG_FILE_PREFIX: &str = "retype";
const LOG_FILE_SUFFIX: &str = "log";
const FALLBACK_FILTER: &str = "info";

/// Set up the global subscriber writing to `retype.log`
///
/// Logging is best effort: `None` is returned if the log directory is unknown
/// or unwritable, or a subscriber is already installed. The returned guard
/// flushes pending records when dropped.
pub fn init(settings: &LogSettings) -> Option<WorkerGuard> {
    let directory = settings.directory()?;
    fs::create_dir_all(&directory).ok()?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix(LOG_FILE_SUFFIX)
        .build(&directory)
        .ok()?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    // `RETYPE_LOG` wins over the configured filter
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(&settings.filter))
        .unwrap_or_else(|_| EnvFilter::new(FALLBACK_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .ok()?;

    tracing::debug!(directory = %directory.display(), "logging initialized");
    Some(guard)
}
