//! # hubcache CLI
//!
//! Command-line interface for the hub cache scanner. Renders scan reports
//! as tables and prints deletion plans; never mutates the cache itself.

use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

mod plan;
mod scan;
mod table;

/// Inspect a local hub snapshot cache.
#[derive(Parser)]
#[command(name = "hubcache")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Cache directory to operate on (defaults to the platform cache
    /// location, override with HUBCACHE_DIR)
    #[arg(long = "dir", global = true, value_name = "PATH")]
    cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan the cache directory and print an inventory report
    ScanCache {
        /// Show a more verbose output (-v: per-revision rows, -vvv: full
        /// issue listing)
        #[arg(short, long, action = ArgAction::Count)]
        verbose: u8,

        /// Emit the report as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Compute what deleting the given revisions would free (dry-run only,
    /// nothing is removed)
    PlanDelete {
        /// Revision commit hashes to include in the plan
        #[arg(value_name = "REVISION", required = true)]
        revisions: Vec<String>,

        /// Emit the strategy as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    #[cfg(unix)]
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("HUBCACHE_LOG")
                .or_else(|_| tracing_subscriber::EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::ScanCache { verbose, json } => {
            scan::run(cli.cache_dir.as_deref(), verbose, json)
        }
        Commands::PlanDelete { revisions, json } => {
            plan::run(cli.cache_dir.as_deref(), &revisions, json)
        }
    }
}
