//! `tfpromote` — reconcile two environment directories and promote changes.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use tfpromote_core::Registry;
use tfpromote_sync::{
    AutoApprove, Confirm, PromoteOptions, RunReport, RunStatus, Session, StdinConfirm, SyncError,
};

/// Arguments for the default promote action.
#[derive(Args, Debug)]
pub struct PromoteArgs {
    /// Lower environment directory (defaults to the working directory, or to
    /// the lower sibling of it when `--to` is also omitted).
    #[arg(long, value_name = "DIR")]
    pub from: Option<PathBuf>,

    /// Higher environment directory (defaults to the working directory).
    #[arg(long, value_name = "DIR")]
    pub to: Option<PathBuf>,

    /// Answer yes at every confirmation prompt.
    #[arg(long)]
    pub auto_approve: bool,

    /// Report files present on only one side instead of stopping.
    #[arg(long)]
    pub ignore_missing: bool,

    /// Keep promoting remaining files after a copy fails.
    #[arg(long)]
    pub continue_on_error: bool,

    /// Diff viewer launched as `<cmd> <from-file> <to-file>`.
    #[arg(long, env = "TFPROMOTE_DIFFTOOL", value_name = "CMD")]
    pub difftool: Option<String>,

    /// Print unified diffs instead of launching a viewer (overrides --difftool).
    #[arg(long)]
    pub printdiff: bool,

    /// Report what would be promoted without prompting or copying.
    #[arg(long)]
    pub dry_run: bool,

    /// With --dry-run, print the report as JSON.
    #[arg(long, requires = "dry_run")]
    pub json: bool,
}

impl PromoteArgs {
    pub fn run(self, registry: &Registry) -> Result<()> {
        let cwd = std::env::current_dir().context("cannot determine working directory")?;
        let json = self.json;
        if !json {
            println!("TFPromote version {}", env!("CARGO_PKG_VERSION"));
        }

        let mut confirm: Box<dyn Confirm> = if self.auto_approve {
            Box::new(AutoApprove)
        } else {
            Box::new(StdinConfirm)
        };
        let mut out: Box<dyn Write> = if json {
            Box::new(io::sink())
        } else {
            Box::new(io::stdout())
        };

        let options = self.into_options(cwd);
        let report = Session::new(registry, options, confirm.as_mut(), out.as_mut()).run()?;

        finish(&report, json)
    }

    fn into_options(self, cwd: PathBuf) -> PromoteOptions {
        PromoteOptions {
            from: self.from,
            to: self.to,
            cwd,
            ignore_missing: self.ignore_missing,
            continue_on_error: self.continue_on_error,
            difftool: self.difftool.filter(|cmd| !cmd.trim().is_empty()),
            printdiff: self.printdiff,
            dry_run: self.dry_run,
        }
    }
}

fn finish(report: &RunReport, json: bool) -> Result<()> {
    match report.status {
        RunStatus::NothingToPromote | RunStatus::Promoted => {
            if !report.promoted.is_empty() {
                println!(
                    "{} promoted {} file(s) from {} to {}",
                    "✓".green().bold(),
                    report.promoted.len(),
                    report.from.env(),
                    report.to.env()
                );
            }
            if report.failed.is_empty() {
                return Ok(());
            }
            for name in &report.failed {
                println!("  {}  {name}", "✗".red().bold());
            }
            Err(SyncError::PartialPromotion {
                count: report.failed.len(),
            }
            .into())
        }
        RunStatus::DryRun => {
            if json {
                let payload =
                    serde_json::to_string_pretty(report).context("failed to serialize report")?;
                println!("{payload}");
            } else {
                println!(
                    "{} {} changed file(s) would be promoted from {} to {}",
                    "[dry-run]".yellow(),
                    report.plain_diffs.len(),
                    report.from.env(),
                    report.to.env()
                );
            }
            if report.has_blocking() {
                bail!("unresolved file differences between {} and {}", report.from.env(), report.to.env());
            }
            Ok(())
        }
    }
}
