//! Error types for unitsync-sync.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use unitsync_control::ControlError;
use unitsync_core::UnitName;

/// Which control-interface call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlOp {
    EnsureRunning,
    EnsureStopped,
    Restart,
}

impl fmt::Display for ControlOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            ControlOp::EnsureRunning => "ensure running",
            ControlOp::EnsureStopped => "ensure stopped",
            ControlOp::Restart => "restart",
        };
        f.write_str(op)
    }
}

/// Everything that can go wrong inside a reconciliation pass.
///
/// Only [`ReconcileError::Listing`] aborts the pass; every other kind skips
/// the offending unit and leaves its state entry stale for the next pass.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("error listing unit files in {path}: {source}")]
    Listing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error reading unit file '{unit}' at {path}: {source}")]
    Read {
        unit: UnitName,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error copying unit file '{unit}' to {path}: {source}")]
    Copy {
        unit: UnitName,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error removing unit file '{unit}' at {path}: {source}")]
    Remove {
        unit: UnitName,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error during {op} of unit '{unit}': {source}")]
    Control {
        unit: UnitName,
        op: ControlOp,
        #[source]
        source: ControlError,
    },
}

impl ReconcileError {
    /// The unit this error belongs to; `None` for pass-wide failures.
    pub fn unit(&self) -> Option<&UnitName> {
        match self {
            ReconcileError::Listing { .. } => None,
            ReconcileError::Read { unit, .. }
            | ReconcileError::Copy { unit, .. }
            | ReconcileError::Remove { unit, .. }
            | ReconcileError::Control { unit, .. } => Some(unit),
        }
    }
}
