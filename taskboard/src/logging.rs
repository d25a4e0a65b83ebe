//! File logging for the CLI and the shell.
//!
//! Stdout carries command output only, so logs always go to a file. Without
//! `--log-file` they land in a daily-rotated file under the per-user state
//! directory, which keeps long shell sessions from growing one file forever.
//! `RUST_LOG` overrides the filter entirely.

use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};

const LOG_FILE_PREFIX: &str = "taskboard.log";

/// Directory used when no log file is given.
///
/// Falls back to the temp directory on platforms without a state or local
/// data directory.
#[must_use]
pub fn default_log_dir() -> PathBuf {
    dirs::state_dir()
        .or_else(dirs::data_local_dir)
        .map_or_else(std::env::temp_dir, |dir| dir.join("taskboard"))
}

/// Filter directive for a `--log-level` value.
///
/// A bare level applies to the taskboard crates while dependencies stay at
/// `warn`. Anything that already looks like a directive is used as is.
#[must_use]
pub fn filter_directive(level: &str) -> String {
    let level = level.trim();
    if level.contains(['=', ',']) {
        return level.to_string();
    }
    // Target matching is by prefix, so this also covers `taskboard_proto`.
    format!("warn,taskboard={level}")
}

/// Opens the log destination, creating its directory if needed.
fn appender(file: Option<&Path>) -> Option<RollingFileAppender> {
    let (dir, prefix, rotation) = match file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
            let name = path.file_name()?.to_str()?.to_string();
            (dir, name, Rotation::NEVER)
        }
        None => (default_log_dir(), LOG_FILE_PREFIX.to_string(), Rotation::DAILY),
    };

    std::fs::create_dir_all(&dir).ok()?;
    RollingFileAppender::builder()
        .rotation(rotation)
        .filename_prefix(prefix)
        .build(&dir)
        .ok()
}

/// Installs the global subscriber.
///
/// Returns the [`WorkerGuard`] that flushes buffered entries on drop, or
/// `None` (logging stays off) if the destination cannot be opened.
pub fn init(level: &str, file: Option<&Path>) -> Option<WorkerGuard> {
    let (writer, guard) = tracing_appender::non_blocking(appender(file)?);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(filter_directive(level)))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn,taskboard=info"));

    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .try_init()
        .ok()?;

    Some(guard)
}
