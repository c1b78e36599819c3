//! Domain newtypes.
//!
//! Unit files are opaque: a unit is only ever identified by its file name and
//! compared by the SHA-256 digest of its bytes.

use std::fmt;
use std::fs::File;
use std::io;
use std::path::Path;

use serde::Serialize;
use sha2::{Digest, Sha256};

/// Suffixes left behind by editors (vim swap files, backup copies).
const TRANSIENT_SUFFIXES: [&str; 2] = [".swp", "~"];

// ---------------------------------------------------------------------------
// UnitName
// ---------------------------------------------------------------------------

/// The file name of a unit definition, e.g. `nginx.service`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct UnitName(pub String);

impl UnitName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for editor swap/backup artifacts that must never be treated as units.
    pub fn is_transient_artifact(&self) -> bool {
        TRANSIENT_SUFFIXES
            .iter()
            .any(|suffix| self.0.ends_with(suffix))
    }
}

impl fmt::Display for UnitName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for UnitName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for UnitName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Fingerprint
// ---------------------------------------------------------------------------

/// Lowercase hex SHA-256 digest of a unit file's contents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn of_bytes(bytes: &[u8]) -> Self {
        let mut h = Sha256::new();
        h.update(bytes);
        Self(hex::encode(h.finalize()))
    }

    /// Stream `path` through the hasher without loading it into memory.
    pub fn of_file(path: &Path) -> io::Result<Self> {
        let mut file = File::open(path)?;
        let mut h = Sha256::new();
        io::copy(&mut file, &mut h)?;
        Ok(Self(hex::encode(h.finalize())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex characters, for log lines.
    pub fn short(&self) -> &str {
        self.0.get(..12).unwrap_or(&self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
