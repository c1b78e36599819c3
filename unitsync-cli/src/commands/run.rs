//! `unitsync run`: the reconciliation daemon.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use unitsync_daemon::start_blocking;

use super::UnitDirArgs;

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub dirs: UnitDirArgs,

    /// How often to re-check unit files when nothing changes.
    #[arg(long, default_value = "1h", value_parser = humantime::parse_duration)]
    pub resync: Duration,

    /// How soon to retry after a pass with failures.
    #[arg(long, default_value = "1s", value_parser = humantime::parse_duration)]
    pub retry: Duration,
}

impl RunArgs {
    pub fn run(self) -> Result<()> {
        let mut config = self.dirs.into_config();
        config.resync = self.resync;
        config.retry = self.retry;

        start_blocking(config).context("daemon exited with error")
    }
}
