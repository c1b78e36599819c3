//! # unitsync-sync
//!
//! The reconciliation pass.
//!
//! [`Reconciler::run_pass`] compares the unit files in the source directory
//! against the mirrored copies in the destination directory and the
//! in-memory [`ReconcileState`](unitsync_core::ReconcileState), writes what
//! changed, and drives the [`ServiceManager`](unitsync_control::ServiceManager)
//! until live state matches. The returned [`PassReport`] says whether every
//! unit converged.

pub mod error;
pub mod reconcile;
pub mod report;
pub mod writer;

pub use error::{ControlOp, ReconcileError};
pub use reconcile::Reconciler;
pub use report::{ActionKind, PassReport, UnitAction};
