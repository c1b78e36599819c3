//! In-memory [`ServiceManager`] that records every call.
//!
//! Clones share the same recording, so a test can hand one clone to the
//! reconciler and inspect the other.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use unitsync_core::UnitName;

use crate::{ControlError, ServiceManager};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlCall {
    EnsureRunning(UnitName),
    EnsureStopped(UnitName),
    Restart(UnitName),
}

#[derive(Debug, Default)]
struct Recorded {
    calls: Vec<ControlCall>,
    active: HashSet<UnitName>,
    failing: HashSet<UnitName>,
}

#[derive(Debug, Clone, Default)]
pub struct RecordingManager {
    inner: Arc<Mutex<Recorded>>,
}

impl RecordingManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Recorded> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn calls(&self) -> Vec<ControlCall> {
        self.lock().calls.clone()
    }

    /// Drain and return the calls recorded so far.
    pub fn take_calls(&self) -> Vec<ControlCall> {
        std::mem::take(&mut self.lock().calls)
    }

    pub fn is_active(&self, unit: &str) -> bool {
        self.lock().active.contains(&UnitName::from(unit))
    }

    /// Mark `unit` as already running, as if started outside unitsync.
    pub fn set_active(&self, unit: &str) {
        self.lock().active.insert(UnitName::from(unit));
    }

    /// Make every subsequent call for `unit` fail.
    pub fn fail_unit(&self, unit: &str) {
        self.lock().failing.insert(UnitName::from(unit));
    }

    pub fn heal_unit(&self, unit: &str) {
        self.lock().failing.remove(&UnitName::from(unit));
    }

    fn record(
        &self,
        call: ControlCall,
        unit: &UnitName,
    ) -> Result<MutexGuard<'_, Recorded>, ControlError> {
        let mut guard = self.lock();
        guard.calls.push(call);
        if guard.failing.contains(unit) {
            return Err(ControlError::Failed {
                command: format!("recording {unit}"),
                status: "exit status: 1".to_string(),
                message: format!("injected failure for {unit}"),
            });
        }
        Ok(guard)
    }
}

#[async_trait]
impl ServiceManager for RecordingManager {
    async fn ensure_running(&self, unit: &UnitName) -> Result<bool, ControlError> {
        let mut guard = self.record(ControlCall::EnsureRunning(unit.clone()), unit)?;
        Ok(guard.active.insert(unit.clone()))
    }

    async fn ensure_stopped(&self, unit: &UnitName) -> Result<bool, ControlError> {
        let mut guard = self.record(ControlCall::EnsureStopped(unit.clone()), unit)?;
        Ok(guard.active.remove(unit))
    }

    async fn restart(&self, unit: &UnitName) -> Result<(), ControlError> {
        let mut guard = self.record(ControlCall::Restart(unit.clone()), unit)?;
        guard.active.insert(unit.clone());
        Ok(())
    }
}
