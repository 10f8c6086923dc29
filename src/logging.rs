// SPDX-License-Identifier: MIT
//
// File logging.
//
// Stdout is the screen and stderr shares the same terminal, so log output
// can only go to a file. With no `--log-file`, no subscriber is installed
// and every `tracing` call is a no-op.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::level_filters::LevelFilter;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};

#[derive(Debug, Error)]
pub enum LogError {
    #[error("log file path has no file name: {}", .0.display())]
    NoFileName(PathBuf),

    #[error("log directory does not exist: {}", .0.display())]
    NoDirectory(PathBuf),

    #[error("opening log file {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: InitError,
    },

    #[error("installing log subscriber: {0}")]
    Init(String),
}

/// Install a file subscriber if `path` is set.
///
/// # Errors
///
/// The path is unusable, or a global subscriber is already installed.
pub fn init(path: Option<&Path>, level: LevelFilter) -> Result<(), LogError> {
    let Some(path) = path else {
        return Ok(());
    };
    let appender = file_appender(path)?;
    tracing_subscriber::fmt()
        .with_writer(appender)
        .with_max_level(level)
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| LogError::Init(e.to_string()))?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "tilde starting");
    Ok(())
}

/// Open `path` for appending, never rotating.
fn file_appender(path: &Path) -> Result<RollingFileAppender, LogError> {
    let file_name = path
        .file_name()
        .ok_or_else(|| LogError::NoFileName(path.to_path_buf()))?;
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    if !dir.is_dir() {
        return Err(LogError::NoDirectory(dir.to_path_buf()));
    }
    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name.to_string_lossy())
        .build(dir)
        .map_err(|source| LogError::Open {
            path: path.to_path_buf(),
            source,
        })
}
