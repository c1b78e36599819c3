//! unitsync: keep a service manager in step with a directory of unit files.
//!
//! # Usage
//!
//! ```text
//! unitsync run  [--src <dir>] [--dest <dir>] [--resync 1h] [--retry 1s] [--timeout 10s] [--user]
//! unitsync sync [--src <dir>] [--dest <dir>] [--timeout 10s] [--user] [--json]
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{run::RunArgs, sync::SyncArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "unitsync",
    version,
    about = "Reconcile systemd units against a directory of unit files",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Watch the source directory and reconcile continuously.
    Run(RunArgs),

    /// Run a single reconciliation pass and exit.
    Sync(SyncArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => args.run(),
        Commands::Sync(args) => args.run(),
    }
}
