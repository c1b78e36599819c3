use std::path::PathBuf;
use std::time::Duration;

use unitsync_control::{Systemctl, SystemctlScope, DEFAULT_TIMEOUT};

pub const DEFAULT_SRC: &str = ".";
pub const DEFAULT_DEST: &str = "/etc/systemd/system";
pub const DEFAULT_RESYNC: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_RETRY: Duration = Duration::from_secs(1);

/// Everything the daemon needs, supplied by the command line.
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// Directory holding the declared unit files.
    pub src: PathBuf,
    /// The service manager's unit directory.
    pub dest: PathBuf,
    pub resync: Duration,
    pub retry: Duration,
    /// Per control-call deadline.
    pub timeout: Duration,
    pub scope: SystemctlScope,
    /// Emit JSON log lines instead of human-readable ones.
    pub log_json: bool,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            src: PathBuf::from(DEFAULT_SRC),
            dest: PathBuf::from(DEFAULT_DEST),
            resync: DEFAULT_RESYNC,
            retry: DEFAULT_RETRY,
            timeout: DEFAULT_TIMEOUT,
            scope: SystemctlScope::System,
            log_json: false,
        }
    }
}

impl DaemonConfig {
    pub fn intervals(&self) -> Intervals {
        Intervals {
            resync: self.resync,
            retry: self.retry,
        }
    }

    pub fn manager(&self) -> Systemctl {
        Systemctl::new(self.timeout).with_scope(self.scope)
    }
}

/// Delays between passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Intervals {
    /// After a converged pass.
    pub resync: Duration,
    /// After a pass with failures.
    pub retry: Duration,
}

impl Intervals {
    pub fn next_delay(&self, converged: bool) -> Duration {
        if converged {
            self.resync
        } else {
            self.retry
        }
    }
}
