//! Main CLI parser and top-level argument handling.

use clap::Parser;

use crate::commands::Commands;

/// Turn social threads and pasted text into narrated audio.
#[derive(Debug, Parser)]
#[command(name = "threadcast")]
#[command(about = "Fetch social threads and narrate them aloud")]
#[command(version)]
pub struct Cli {
    /// Bearer credential for the upstream feed API
    #[arg(long, env = "X_BEARER_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Override the feed API base URL
    #[arg(long = "api-base", env = "THREADCAST_API_BASE", global = true)]
    pub api_base: Option<String>,

    /// Upstream request timeout in seconds
    #[arg(long = "timeout-secs", global = true, default_value_t = 15)]
    pub timeout_secs: u64,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}
