//! Outcome of a reconciliation pass.

use serde::Serialize;

use unitsync_core::UnitName;

/// A change the pass actually made. No-op control calls are not reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Source bytes were copied over the destination record.
    Wrote,
    Started,
    Restarted,
    Stopped,
    /// The destination record of a deleted unit was removed.
    Removed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitAction {
    pub unit: UnitName,
    pub kind: ActionKind,
}

#[derive(Debug, Clone, Serialize)]
pub struct PassReport {
    /// True when every unit in the pass succeeded.
    pub converged: bool,
    pub actions: Vec<UnitAction>,
    pub failures: Vec<String>,
    pub duration_ms: u128,
}

impl Default for PassReport {
    fn default() -> Self {
        Self {
            converged: true,
            actions: Vec::new(),
            failures: Vec::new(),
            duration_ms: 0,
        }
    }
}

impl PassReport {
    pub(crate) fn push(&mut self, unit: &UnitName, kind: ActionKind) {
        self.actions.push(UnitAction {
            unit: unit.clone(),
            kind,
        });
    }

    pub(crate) fn push_failure(&mut self, message: String) {
        self.converged = false;
        self.failures.push(message);
    }

    pub fn count(&self, kind: ActionKind) -> usize {
        self.actions.iter().filter(|a| a.kind == kind).count()
    }

    /// Actions of `kind` taken on `unit`.
    pub fn count_for(&self, unit: &str, kind: ActionKind) -> usize {
        self.actions
            .iter()
            .filter(|a| a.kind == kind && a.unit.as_str() == unit)
            .count()
    }

    pub fn is_noop(&self) -> bool {
        self.actions.is_empty()
    }
}
