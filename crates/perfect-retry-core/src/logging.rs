//! Global `tracing` subscriber setup.
//!
//! Retry events reach these outputs through [`TracingSink`](crate::TracingSink).
//! `RUST_LOG` overrides [`DEFAULT_FILTER`].

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "info,perfect_retry_core=debug,perfect_retry=debug";

/// Where log lines go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    /// Appended to; parent directories are created.
    File(PathBuf),
}

/// `$XDG_STATE_HOME/perfect-retry/perfect-retry.log`.
pub fn log_file_path() -> Result<PathBuf> {
    let dirs = xdg::BaseDirectories::with_prefix("perfect-retry")?;
    Ok(dirs
        .get_state_home()
        .join("perfect-retry")
        .join("perfect-retry.log"))
}

/// Open `path` for appending, creating it and its directory if needed.
pub fn open_log_file(path: &Path) -> Result<File> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))
}

/// Install the global subscriber writing to `target` and return the target
/// actually in use. A log file that cannot be opened falls back to stderr
/// with a warning.
///
/// Only the first call in a process installs anything; later calls are no-ops.
pub fn init(target: LogTarget) -> LogTarget {
    let path = match target {
        LogTarget::Stderr => {
            install(io::stderr);
            return LogTarget::Stderr;
        }
        LogTarget::File(path) => path,
    };
    match open_log_file(&path) {
        Ok(file) => {
            install(Mutex::new(file));
            tracing::info!("perfect-retry logging to {}", path.display());
            LogTarget::File(path)
        }
        Err(err) => {
            install(io::stderr);
            tracing::warn!("{:#}; logging to stderr", err);
            LogTarget::Stderr
        }
    }
}

fn install<W>(writer: W)
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init();
    if installed.is_err() {
        tracing::debug!("global subscriber already set; keeping it");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn open_log_file_creates_dirs_and_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("perfect-retry.log");

        writeln!(open_log_file(&path).unwrap(), "first").unwrap();
        writeln!(open_log_file(&path).unwrap(), "second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn open_log_file_reports_the_path() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the directory should be.
        let blocker = dir.path().join("state");
        fs::write(&blocker, "").unwrap();

        let err = open_log_file(&blocker.join("perfect-retry.log")).unwrap_err();
        assert!(format!("{:#}", err).contains("state"));
    }

    #[test]
    fn log_file_lives_under_the_app_dir() {
        if let Ok(path) = log_file_path() {
            assert!(path.ends_with("perfect-retry/perfect-retry.log"));
        }
    }
}
