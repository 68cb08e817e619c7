//! Log file setup
//!
//! The terminal belongs to the UI, so logs go to a file. The filter comes
//! from `WEBTERM_LOG` and defaults to `info`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

pub const ENV_FILTER_VAR: &str = "WEBTERM_LOG";

/// `~/.webterm/webterm.log`
pub fn default_log_path() -> Option<PathBuf> {
    crate::config::data_dir().map(|d| d.join("webterm.log"))
}

/// Install the global subscriber writing to `path` from a background thread.
///
/// Keep the returned guard alive until exit; dropping it flushes and stops
/// the writer. `None` means a subscriber was already installed.
pub fn init(path: &Path) -> Result<Option<WorkerGuard>> {
    let dir = path.parent().filter(|d| !d.as_os_str().is_empty()).unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).with_context(|| format!("creating log directory {}", dir.display()))?;
    let name = path.file_name().with_context(|| format!("log path {} has no file name", path.display()))?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(name.to_string_lossy())
        .build(dir)
        .with_context(|| format!("opening log file {}", path.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_env(ENV_FILTER_VAR).unwrap_or_else(|_| EnvFilter::new("info"));
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init();
    if installed.is_err() {
        return Ok(None);
    }
    tracing::info!(version = env!("CARGO_PKG_VERSION"), log = %path.display(), "webterm starting");
    Ok(Some(guard))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_creates_log_file() {
        let dir = std::env::temp_dir().join(format!("webterm-log-{}", std::process::id()));
        let path = dir.join("nested").join("webterm.log");
        let guard = init(&path).unwrap();
        tracing::info!("hello from the test");
        drop(guard);
        assert!(path.is_file());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_init_rejects_directory_path() {
        assert!(init(Path::new("/")).is_err());
    }
}
