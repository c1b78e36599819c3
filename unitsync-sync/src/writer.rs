//! Destination record writes.
//!
//! A unit file is written to `<dest>/.<unit>.unitsync.tmp` and renamed over
//! the final path, so the service manager never loads a half-written unit.

use std::io;
use std::path::{Path, PathBuf};

use unitsync_core::UnitName;

fn tmp_path(dest: &Path, unit: &UnitName) -> PathBuf {
    dest.join(format!(".{unit}.unitsync.tmp"))
}

/// Write `bytes` verbatim to `<dest>/<unit>`, replacing any existing file.
pub fn write_unit_file(dest: &Path, unit: &UnitName, bytes: &[u8]) -> io::Result<PathBuf> {
    let target = dest.join(unit.as_str());
    let tmp = tmp_path(dest, unit);

    std::fs::create_dir_all(dest)?;
    std::fs::write(&tmp, bytes)?;

    if let Err(err) = std::fs::rename(&tmp, &target) {
        let _ = std::fs::remove_file(&tmp);
        return Err(err);
    }
    Ok(target)
}

/// Remove `<dest>/<unit>`. Returns `false` when it was already gone.
pub fn remove_unit_file(dest: &Path, unit: &UnitName) -> io::Result<bool> {
    match std::fs::remove_file(dest.join(unit.as_str())) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err),
    }
}
