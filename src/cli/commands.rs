use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "signaldesk", about = "News-driven trading signal desk")]
pub struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, default_value = crate::config::DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,
    /// Override the database path from the configuration
    #[arg(long, global = true)]
    pub db: Option<String>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Watch feeds, analyze new items and manage positions until Ctrl-C
    Run,
    /// Watch feeds and analyze new items, without the lifecycle loop
    Watch,
    /// Run the position lifecycle loop only
    Lifecycle,
    /// Poll every feed once and print the per-feed results
    Poll {
        /// Ignore entries published more than this many hours ago
        #[arg(long, default_value = "24")]
        since_hours: i64,
    },
    /// Analyze one article without storing anything
    Analyze {
        link: String,
        #[arg(long)]
        title: Option<String>,
    },
    /// Run one lifecycle cycle: close expired positions, forward news
    CloseExpired,
    /// List positions
    Positions {
        /// open or closed
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        ticker: Option<String>,
        #[arg(long, default_value = "50")]
        limit: usize,
    },
    /// List the latest decisions
    Decisions {
        #[arg(long, default_value = "20")]
        limit: usize,
    },
    /// Show one stored news item with its decision
    News { link: String },
    /// Analyze stored items that have no decision yet
    Backfill {
        #[arg(long, default_value = "20")]
        limit: usize,
    },
}
