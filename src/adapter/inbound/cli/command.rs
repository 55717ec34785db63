//! Command-line interface definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Order management and risk-control plane
#[derive(Parser, Debug)]
#[command(name = "ordergate")]
#[command(version)]
pub struct Cli {
    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate configuration and print a summary
    Check(ConfigArg),

    /// Score the configured venues and show the pick
    Route(RouteArgs),

    /// Dry run: reconcile an empty in-memory ledger against paper venues
    ///
    /// No real venue is contacted and nothing is seeded, so reports are
    /// all zero. Use it to exercise configuration, wiring and scheduling.
    Run(RunArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArg {
    /// Path to the TOML config; built-in defaults when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct RouteArgs {
    #[command(flatten)]
    pub config: ConfigArg,

    /// Override the configured p99 latency cap
    #[arg(long)]
    pub max_latency_ms: Option<u32>,
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub config: ConfigArg,

    /// Run a single reconciliation pass and exit
    #[arg(long)]
    pub once: bool,
}
