pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "feedsync")]
#[command(about = "Keep a set of RSS/Atom feeds in sync", long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true)]
    pub config: Option<std::path::PathBuf>,

    /// Delay between polling rounds (e.g., "5s", "30m", "1h")
    #[arg(short, long, global = true)]
    pub interval: Option<String>,

    /// Number of feeds fetched concurrently
    #[arg(short, long, global = true)]
    pub workers: Option<usize>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add feeds and keep polling them until interrupted
    Watch {
        /// URLs of the feeds to add
        #[arg(required = true)]
        urls: Vec<String>,

        /// Print the final state as JSON on exit
        #[arg(long)]
        json: bool,
    },
    /// Fetch and parse a single feed once
    Fetch {
        /// URL of the feed
        url: String,
    },
}
