//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod crawl;
mod helpers;
mod score;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::config::Config;

/// Catalog file used when `--catalog` is not given.
const DEFAULT_CATALOG: &str = "stores.json";

#[derive(Parser)]
#[command(name = "dealcrawl")]
#[command(about = "Heuristic sale and discount crawler for retail websites")]
#[command(version)]
pub struct Cli {
    /// Config file path (defaults to ./dealcrawl.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl every site in the catalog and write the deals as JSON
    Crawl {
        /// Site catalog (JSON array of stores)
        #[arg(long, env = "DEALCRAWL_CATALOG", default_value = DEFAULT_CATALOG)]
        catalog: PathBuf,
        /// Write results here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Use plain HTTP fetches only
        #[arg(long)]
        no_browser: bool,
    },

    /// Crawl a single catalog site and print its deals
    Site {
        /// Site ID from the catalog
        id: String,
        /// Site catalog (JSON array of stores)
        #[arg(long, env = "DEALCRAWL_CATALOG", default_value = DEFAULT_CATALOG)]
        catalog: PathBuf,
        /// Use plain HTTP fetches only
        #[arg(long)]
        no_browser: bool,
    },

    /// Show how a piece of text is scored
    Score {
        /// Text to score
        text: String,
    },
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())
        .await
        .context("failed to load configuration")?;

    match cli.command {
        Commands::Crawl {
            catalog,
            output,
            no_browser,
        } => crawl::cmd_crawl(&config, &catalog, output.as_deref(), !no_browser).await,
        Commands::Site {
            id,
            catalog,
            no_browser,
        } => crawl::cmd_site(&config, &catalog, &id, !no_browser).await,
        Commands::Score { text } => score::cmd_score(&config, &text),
    }
}
