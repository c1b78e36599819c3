pub mod run;
pub mod sync;

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use unitsync_control::SystemctlScope;
use unitsync_daemon::config::{DEFAULT_DEST, DEFAULT_SRC};
use unitsync_daemon::DaemonConfig;

/// Flags shared by every command that reconciles.
#[derive(Args, Debug)]
pub struct UnitDirArgs {
    /// Directory containing your unit files.
    #[arg(long, default_value = DEFAULT_SRC)]
    pub src: PathBuf,

    /// The service manager's unit file directory.
    #[arg(long, default_value = DEFAULT_DEST)]
    pub dest: PathBuf,

    /// Timeout for each systemctl operation (e.g. `10s`, `1m`).
    #[arg(long, default_value = "10s", value_parser = humantime::parse_duration)]
    pub timeout: Duration,

    /// Manage the calling user's units (`systemctl --user`).
    #[arg(long)]
    pub user: bool,

    /// Emit logs as JSON lines.
    #[arg(long)]
    pub log_json: bool,
}

impl UnitDirArgs {
    pub fn into_config(self) -> DaemonConfig {
        DaemonConfig {
            src: self.src,
            dest: self.dest,
            timeout: self.timeout,
            scope: if self.user {
                SystemctlScope::User
            } else {
                SystemctlScope::System
            },
            log_json: self.log_json,
            ..DaemonConfig::default()
        }
    }
}
