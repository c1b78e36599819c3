//! `unitsync sync`: one reconciliation pass.

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use unitsync_daemon::sync_once_blocking;
use unitsync_sync::{ActionKind, PassReport};

use super::UnitDirArgs;

#[derive(Args, Debug)]
pub struct SyncArgs {
    #[command(flatten)]
    pub dirs: UnitDirArgs,

    /// Print the pass report as JSON.
    #[arg(long)]
    pub json: bool,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let json = self.json;
        let config = self.dirs.into_config();
        let report = sync_once_blocking(&config).context("failed to start reconciliation")?;

        if json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("failed to render pass report")?
            );
        } else {
            print_report(&report);
        }

        if !report.converged {
            bail!(
                "reconciliation did not converge ({} failure(s))",
                report.failures.len()
            );
        }
        Ok(())
    }
}

fn print_report(report: &PassReport) {
    if report.is_noop() && report.converged {
        println!("{} nothing to do", "✓".green().bold());
        return;
    }

    for action in &report.actions {
        let verb = match action.kind {
            ActionKind::Wrote => "wrote",
            ActionKind::Started => "started",
            ActionKind::Restarted => "restarted",
            ActionKind::Stopped => "stopped",
            ActionKind::Removed => "removed",
        };
        println!("  {:<9} {}", verb.cyan(), action.unit);
    }
    for failure in &report.failures {
        println!("  {} {failure}", "✗".red().bold());
    }
    println!(
        "{} {} action(s), {} failure(s) in {}ms",
        if report.converged {
            "✓".green().bold()
        } else {
            "✗".red().bold()
        },
        report.actions.len(),
        report.failures.len(),
        report.duration_ms
    );
}
