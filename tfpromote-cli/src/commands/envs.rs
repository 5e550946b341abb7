//! `tfpromote envs` — show the environment registry in promotion order.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use tfpromote_core::Registry;

/// Arguments for `tfpromote envs`.
#[derive(Args, Debug)]
pub struct EnvsArgs {}

impl EnvsArgs {
    pub fn run(self, registry: &Registry) -> Result<()> {
        for env in registry.known_environments() {
            let source = match registry.lower_environment(env.as_str()) {
                Ok(lower) => format!("promoted from {lower}"),
                Err(_) => "lowest".dimmed().to_string(),
            };
            println!("  {} {source}", format!("{:<12}", env.as_str()).bold());
        }
        Ok(())
    }
}
