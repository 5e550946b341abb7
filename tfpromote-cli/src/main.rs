//! tfpromote — promote Terraform files from a lower environment to a higher one.
//!
//! # Usage
//!
//! ```text
//! tfpromote [--from <dir>] [--to <dir>] [--auto-approve] [--ignore-missing]
//!           [--continue-on-error] [--difftool <cmd> | --printdiff]
//!           [--dry-run [--json]] [--envs <list>] [-v]
//! tfpromote envs [--envs <list>]
//! ```
//!
//! Configuration from the environment:
//! - `TFPROMOTE_ENVS` — ordered environment list (default `dev,stage,prod`)
//! - `TFPROMOTE_DIFFTOOL` — diff viewer command
//! - `TFPROMOTE_LOG` — log filter (default `warn`)

mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use commands::{envs::EnvsArgs, promote::PromoteArgs};
use tfpromote_core::Registry;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "tfpromote",
    version,
    about = "Promote Terraform files between ordered deployment environments",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    promote: PromoteArgs,

    /// Ordered, comma-separated environment names, lowest first.
    #[arg(
        long,
        env = "TFPROMOTE_ENVS",
        default_value = "dev,stage,prod",
        global = true,
        value_name = "LIST"
    )]
    envs: String,

    /// Log debug detail to stderr.
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the configured environments and their promotion order.
    Envs(EnvsArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let registry = Registry::parse(&cli.envs)
        .with_context(|| format!("invalid TFPROMOTE_ENVS / --envs value '{}'", cli.envs))?;
    log::debug!("environments: {:?}", registry.known_environments());

    match cli.command {
        Some(Commands::Envs(args)) => args.run(&registry),
        None => cli.promote.run(&registry),
    }
}

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().filter_or("TFPROMOTE_LOG", "warn"));
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();
}
