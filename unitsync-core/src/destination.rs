//! The copy of a unit file that the service manager actually loads.

use std::io::{self, ErrorKind};
use std::path::Path;

use crate::types::Fingerprint;

/// What the destination directory currently holds for a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestinationRecord {
    /// No file: the unit has never been written (or was removed out of band).
    Absent,
    Present(Fingerprint),
}

impl DestinationRecord {
    /// Fingerprint the destination file at `path`.
    ///
    /// Only `NotFound` is folded into [`DestinationRecord::Absent`]; permission
    /// and other I/O failures are returned so the caller can skip the unit.
    pub fn read(path: &Path) -> io::Result<Self> {
        match Fingerprint::of_file(path) {
            Ok(fp) => Ok(Self::Present(fp)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Self::Absent),
            Err(err) => Err(err),
        }
    }

    pub fn fingerprint(&self) -> Option<&Fingerprint> {
        match self {
            Self::Absent => None,
            Self::Present(fp) => Some(fp),
        }
    }

    pub fn matches(&self, fingerprint: &Fingerprint) -> bool {
        self.fingerprint() == Some(fingerprint)
    }
}
