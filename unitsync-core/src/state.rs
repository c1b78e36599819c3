//! In-memory reconciliation state.
//!
//! Maps each unit to the fingerprint last confirmed running. Built empty at
//! process start and rebuilt from the destination directory and live status
//! on the first pass; it is never written to disk.

use std::collections::HashMap;

use crate::types::{Fingerprint, UnitName};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileState {
    units: HashMap<UnitName, Fingerprint>,
}

impl ReconcileState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, unit: &UnitName) -> Option<&Fingerprint> {
        self.units.get(unit)
    }

    pub fn contains(&self, unit: &UnitName) -> bool {
        self.units.contains_key(unit)
    }

    /// Record `fingerprint` as the last applied content of `unit`.
    pub fn record(&mut self, unit: UnitName, fingerprint: Fingerprint) {
        self.units.insert(unit, fingerprint);
    }

    pub fn forget(&mut self, unit: &UnitName) -> Option<Fingerprint> {
        self.units.remove(unit)
    }

    /// Sorted snapshot of tracked units, safe to iterate while mutating.
    pub fn units(&self) -> Vec<UnitName> {
        let mut units: Vec<UnitName> = self.units.keys().cloned().collect();
        units.sort();
        units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}
