//! Workspace Chronicle CLI - chron command

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod cmd;
mod util;

/// Workspace Chronicle - find and remember your .code-workspace files
#[derive(Parser)]
#[command(name = "chron")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use this config file instead of the default location
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Store the scan cache in this directory
    #[arg(long, global = true, value_name = "DIR")]
    cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan the configured roots for workspace files
    Scan(ScanArgs),
    /// Inspect or clear the scan cache
    #[command(subcommand)]
    Cache(CacheCommands),
    /// View configuration
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Evaluate the scan gating policy
    Gate {
        /// A folder is open
        #[arg(long)]
        primary_context: bool,
        /// A workspace file is the active context
        #[arg(long)]
        marker_context: bool,
        /// Block scanning when no folder is open
        #[arg(long)]
        deny_without_primary: bool,
        /// Block scanning while a workspace file is active
        #[arg(long)]
        deny_with_marker: bool,
    },
}

#[derive(Args)]
pub struct ScanArgs {
    /// Root to scan (repeatable; replaces configured roots)
    #[arg(long = "root", value_name = "PATH")]
    pub roots: Vec<String>,

    /// Stop after this many milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Do not apply the built-in ignore globs
    #[arg(long)]
    pub no_default_ignore: bool,

    /// Extra ignore glob (repeatable)
    #[arg(long = "ignore", value_name = "GLOB")]
    pub ignore: Vec<String>,

    /// Do not honor .gitignore files
    #[arg(long)]
    pub no_nested_ignore: bool,

    /// Keep descending below directories that contain a workspace file
    #[arg(long)]
    pub no_stop_at_marker: bool,

    /// Pretend a folder is open (gating)
    #[arg(long)]
    pub primary_context: bool,

    /// Pretend a workspace file is the active context (gating)
    #[arg(long)]
    pub marker_context: bool,

    /// Clear the cache and scan even when gated
    #[arg(long)]
    pub force: bool,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
enum CacheCommands {
    /// Show the cached scan result
    Show,
    /// Delete the cached scan result
    Clear,
    /// Print the cache file path
    Path,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// List all configuration values
    List,
    /// Show config file path
    Path {
        /// Create config file with defaults if it doesn't exist
        #[arg(long)]
        create: bool,
    },
    /// Show example configuration
    Example,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let globals = cmd::Globals {
        config: cli.config,
        cache_dir: cli.cache_dir,
    };

    match cli.command {
        Commands::Scan(args) => cmd::scan::run(&globals, args).await,
        Commands::Cache(cache_cmd) => match cache_cmd {
            CacheCommands::Show => cmd::cache::run_show(&globals).await,
            CacheCommands::Clear => cmd::cache::run_clear(&globals).await,
            CacheCommands::Path => cmd::cache::run_path(&globals),
        },
        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::List => cmd::config::run_list(&globals),
            ConfigCommands::Path { create } => cmd::config::run_path(&globals, create),
            ConfigCommands::Example => cmd::config::run_example(),
        },
        Commands::Gate {
            primary_context,
            marker_context,
            deny_without_primary,
            deny_with_marker,
        } => cmd::gate::run(
            primary_context,
            marker_context,
            !deny_without_primary,
            !deny_with_marker,
        ),
    }
}
