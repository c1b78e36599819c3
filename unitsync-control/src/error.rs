//! Error types for unitsync-control.

use std::time::Duration;

use thiserror::Error;

/// Failure of a single control-interface call.
#[derive(Debug, Error)]
pub enum ControlError {
    /// The control binary could not be spawned at all.
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The command ran and exited non-zero. `message` is its combined output,
    /// or the exit status when it printed nothing.
    #[error("`{command}` failed ({status}): {message}")]
    Failed {
        command: String,
        status: String,
        message: String,
    },

    /// The call did not finish within the per-call deadline and was abandoned.
    #[error("`{command}` timed out after {after:?}")]
    Timeout { command: String, after: Duration },
}
