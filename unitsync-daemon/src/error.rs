use std::path::PathBuf;

use thiserror::Error;

/// Error surface for the daemon runtime and scheduler.
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failure while setting up the directory watcher.
    #[error("notify error: {0}")]
    Notify(#[from] notify::Error),

    /// The watcher reported an error while running. Fatal: the loop exits.
    #[error("watcher error: {0}")]
    Watcher(#[source] notify::Error),
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> DaemonError {
    DaemonError::Io {
        path: path.into(),
        source,
    }
}
