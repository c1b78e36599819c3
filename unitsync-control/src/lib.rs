//! # unitsync-control
//!
//! The seam between the reconciler and the service manager.
//!
//! [`ServiceManager`] is the capability set the reconciler depends on;
//! [`Systemctl`] drives a real systemd instance by shelling out to
//! `systemctl`. Every call is bounded by a timeout and never retried here:
//! retry belongs to the next scheduled reconciliation pass.

pub mod error;
pub mod systemctl;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

use async_trait::async_trait;
use unitsync_core::UnitName;

pub use error::ControlError;
pub use systemctl::{Systemctl, SystemctlScope, DEFAULT_TIMEOUT};

/// Start/stop/restart operations against an external service manager.
#[async_trait]
pub trait ServiceManager: Send + Sync {
    /// Start `unit` unless it is already active. Returns whether it was started.
    async fn ensure_running(&self, unit: &UnitName) -> Result<bool, ControlError>;

    /// Stop `unit` unless it is already inactive. Returns whether it was stopped.
    async fn ensure_stopped(&self, unit: &UnitName) -> Result<bool, ControlError>;

    /// Reload manager configuration, then restart `unit` unconditionally.
    async fn restart(&self, unit: &UnitName) -> Result<(), ControlError>;
}
