use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// pulse: metric ingestion with rolling windows and anomaly detection
///
/// Accepts timestamped samples over HTTP, keeps a bounded history per metric
/// in the store, flags outliers against a precomputed baseline and exposes
/// counters for polling and scraping.
#[derive(Parser, Debug)]
#[command(name = "pulse")]
#[command(version, about, long_about)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to custom config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP service (default)
    #[command(alias = "s")]
    Serve {
        /// Listen address override, e.g. 127.0.0.1:8080
        #[arg(short, long)]
        listen: Option<String>,
    },

    /// Check that the store is reachable
    #[command(alias = "p")]
    Ping,
}
