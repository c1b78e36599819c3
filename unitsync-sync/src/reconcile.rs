//! One reconciliation pass.
//!
//! ## Per-unit protocol
//!
//! 1. Read the source bytes and fingerprint them.
//! 2. Fingerprint the destination record (`Absent` if missing).
//! 3. Copy when the fingerprints differ.
//! 4. Restart when the fingerprint last recorded for the unit differs from
//!    the new one, or when nothing is recorded and the destination held
//!    other content. Record the new fingerprint.
//! 5. Otherwise, if the destination already matched or never existed,
//!    ensure the unit is running and record the fingerprint.
//!
//! Units recorded in state whose source file has disappeared are stopped,
//! their destination record removed, and their entry forgotten.
//!
//! A failing unit never blocks the others. Its state entry is left as it
//! was, so the next pass retries it.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;

use unitsync_control::ServiceManager;
use unitsync_core::{DestinationRecord, Fingerprint, ReconcileState, UnitName};

use crate::error::{ControlOp, ReconcileError};
use crate::report::{ActionKind, PassReport};
use crate::writer;

/// Owns the reconciliation state and the handle to the service manager.
///
/// Passes take `&mut self`, so they can never overlap.
pub struct Reconciler<M> {
    src: PathBuf,
    dest: PathBuf,
    state: ReconcileState,
    manager: M,
}

impl<M: ServiceManager> Reconciler<M> {
    pub fn new(src: impl Into<PathBuf>, dest: impl Into<PathBuf>, manager: M) -> Self {
        Self {
            src: src.into(),
            dest: dest.into(),
            state: ReconcileState::new(),
            manager,
        }
    }

    pub fn state(&self) -> &ReconcileState {
        &self.state
    }

    /// Run one full pass and report whether every unit converged.
    pub async fn run_pass(&mut self) -> PassReport {
        let started = Instant::now();
        let mut report = PassReport::default();

        match list_units(&self.src) {
            Ok(units) => {
                for unit in &units {
                    if let Err(err) = self.sync_unit(unit, &mut report).await {
                        record_failure(&mut report, err);
                    }
                }
                self.remove_deleted_units(&mut report).await;
            }
            Err(err) => record_failure(&mut report, err),
        }

        report.duration_ms = started.elapsed().as_millis();
        report
    }

    async fn sync_unit(
        &mut self,
        unit: &UnitName,
        report: &mut PassReport,
    ) -> Result<(), ReconcileError> {
        let source = self.src.join(unit.as_str());
        let bytes = match std::fs::read(&source) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                // Deleted after listing; the cleanup scan handles it.
                tracing::debug!(unit = %unit, "unit file vanished before it could be read");
                return Ok(());
            }
            Err(err) => {
                return Err(ReconcileError::Read {
                    unit: unit.clone(),
                    path: source,
                    source: err,
                })
            }
        };
        let desired = Fingerprint::of_bytes(&bytes);

        let target = self.dest.join(unit.as_str());
        let current = DestinationRecord::read(&target).map_err(|err| ReconcileError::Read {
            unit: unit.clone(),
            path: target.clone(),
            source: err,
        })?;

        if !current.matches(&desired) {
            writer::write_unit_file(&self.dest, unit, &bytes).map_err(|err| {
                ReconcileError::Copy {
                    unit: unit.clone(),
                    path: target.clone(),
                    source: err,
                }
            })?;
            tracing::info!(unit = %unit, fingerprint = desired.short(), "wrote unit");
            report.push(unit, ActionKind::Wrote);
        }

        let settled = current == DestinationRecord::Absent || current.matches(&desired);
        let needs_restart = match self.state.get(unit) {
            // A recorded fingerprint that differs means the running unit still
            // has older content, including after a restart that failed last pass.
            Some(recorded) => recorded != &desired,
            None => !settled,
        };

        if needs_restart {
            self.manager
                .restart(unit)
                .await
                .map_err(|err| control_err(unit, ControlOp::Restart, err))?;
            tracing::info!(unit = %unit, fingerprint = desired.short(), "restarted unit");
            report.push(unit, ActionKind::Restarted);
            self.state.record(unit.clone(), desired);
        } else if settled {
            let started = self
                .manager
                .ensure_running(unit)
                .await
                .map_err(|err| control_err(unit, ControlOp::EnsureRunning, err))?;
            if started {
                tracing::info!(unit = %unit, "started unit");
                report.push(unit, ActionKind::Started);
            }
            self.state.record(unit.clone(), desired);
        }

        Ok(())
    }

    async fn remove_deleted_units(&mut self, report: &mut PassReport) {
        for unit in self.state.units() {
            if let Err(err) = self.remove_unit(&unit, report).await {
                record_failure(report, err);
            }
        }
    }

    async fn remove_unit(
        &mut self,
        unit: &UnitName,
        report: &mut PassReport,
    ) -> Result<(), ReconcileError> {
        let source = self.src.join(unit.as_str());
        match std::fs::metadata(&source) {
            Ok(_) => return Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => {
                return Err(ReconcileError::Read {
                    unit: unit.clone(),
                    path: source,
                    source: err,
                })
            }
        }

        let stopped = self
            .manager
            .ensure_stopped(unit)
            .await
            .map_err(|err| control_err(unit, ControlOp::EnsureStopped, err))?;
        if stopped {
            tracing::info!(unit = %unit, "stopped unit");
            report.push(unit, ActionKind::Stopped);
        }

        let removed =
            writer::remove_unit_file(&self.dest, unit).map_err(|err| ReconcileError::Remove {
                unit: unit.clone(),
                path: self.dest.join(unit.as_str()),
                source: err,
            })?;
        if removed {
            tracing::info!(unit = %unit, "removed unit");
            report.push(unit, ActionKind::Removed);
        } else {
            tracing::debug!(unit = %unit, "destination record already absent");
        }

        self.state.forget(unit);
        Ok(())
    }
}

/// Unit names in `src`, sorted, without directories or editor artifacts.
fn list_units(src: &Path) -> Result<Vec<UnitName>, ReconcileError> {
    let listing = |err| ReconcileError::Listing {
        path: src.to_path_buf(),
        source: err,
    };

    let mut units = Vec::new();
    for entry in std::fs::read_dir(src).map_err(listing)? {
        let entry = entry.map_err(listing)?;
        if matches!(entry.file_type(), Ok(ty) if ty.is_dir()) {
            continue;
        }
        let name = match entry.file_name().into_string() {
            Ok(name) => name,
            Err(raw) => {
                tracing::warn!(name = ?raw, "skipping unit file with non UTF-8 name");
                continue;
            }
        };
        let unit = UnitName::from(name);
        if unit.is_transient_artifact() {
            tracing::debug!(unit = %unit, "skipping editor artifact");
            continue;
        }
        units.push(unit);
    }
    units.sort();
    Ok(units)
}

fn control_err(
    unit: &UnitName,
    op: ControlOp,
    source: unitsync_control::ControlError,
) -> ReconcileError {
    ReconcileError::Control {
        unit: unit.clone(),
        op,
        source,
    }
}

fn record_failure(report: &mut PassReport, err: ReconcileError) {
    match err.unit() {
        Some(unit) => tracing::error!(unit = %unit, error = %err, "reconciliation step failed"),
        None => tracing::error!(error = %err, "reconciliation pass aborted"),
    }
    report.push_failure(err.to_string());
}
