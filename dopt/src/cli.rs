//! CLI command definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// dopt - DON optimizer for a single domain
#[derive(Parser)]
#[command(
    name = "dopt",
    about = "Run a DON optimizer for a single domain",
    version,
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the optimization loop until stopped or the step bound is reached
    Run {
        #[command(flatten)]
        opts: RunArgs,
    },

    /// Bind the strategy, run exactly one step, and print the outcome
    Step {
        #[command(flatten)]
        opts: RunArgs,
    },

    /// List available optimization strategies
    Strategies,
}

/// Flags shared by `run` and `step`; each overrides its config-file value
#[derive(Debug, Args)]
pub struct RunArgs {
    /// Domain ID to optimize
    #[arg(long = "domain-id")]
    pub domain_id: Option<String>,

    /// Optimization strategy name
    #[arg(long)]
    pub strategy: Option<String>,

    /// Strategy config JSON file
    #[arg(long = "strategy-config")]
    pub strategy_config: Option<PathBuf>,

    /// Node endpoint (host:port)
    #[arg(long)]
    pub node: Option<String>,

    /// Seconds between steps
    #[arg(long)]
    pub interval: Option<f64>,

    /// Maximum optimization steps
    #[arg(long = "max-steps")]
    pub max_steps: Option<u64>,

    /// PEM private key file for the peer identity
    #[arg(long = "key-file")]
    pub key_file: Option<PathBuf>,
}
