//! CLI module graph.

pub mod check;
pub mod command;
pub mod output;
pub mod route;
pub mod run;

use crate::error::Result;
use crate::infrastructure::config::Config;

use command::{Cli, Commands, ConfigArg};

/// Load the config named by `--config`, or the validated defaults.
fn load_config(args: &ConfigArg) -> Result<Config> {
    match &args.config {
        Some(path) => Config::load(path),
        None => {
            let config = Config::default();
            config.validate()?;
            Ok(config)
        }
    }
}

/// Dispatch a parsed command line.
pub async fn execute(cli: Cli) -> Result<()> {
    match &cli.command {
        Commands::Check(args) => check::execute(args, cli.json),
        Commands::Route(args) => route::execute(args, cli.json),
        Commands::Run(args) => run::execute(args, cli.json).await,
    }
}
