use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// `slopwatch` - announces new Slopwork.xyz tasks on Discord.
#[derive(Parser, Debug)]
#[command(name = "slopwatch")]
#[command(version)]
#[command(about = "Watch Slopwork.xyz for new tasks and post them to Discord.", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.slopwatch/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the watcher: scheduled checks plus Discord slash commands
    Run,

    /// Run a single check for new tasks, then exit
    Poll,

    /// Print the current listings without touching the cache
    List {
        /// Number of tasks to show (1-10, default 5)
        #[arg(short, long)]
        limit: Option<i64>,
    },

    /// Probe the site, selectors and API endpoints
    Check,
}
