// src/cli/mod.rs
//! CLI definitions for productid
//!
//! This module contains all command-line interface definitions using clap.
//! The actual command implementations are in the `commands` module.
//!
//! - `active` - Repositories installed packages came from
//! - `collect` - Product certificates published by enabled repositories
//! - `update` - Full reconciliation run (dry run)
//! - `repos` - Enabled repositories
//! - `cache` - Package/repository cache inspection

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cache;

pub use cache::CacheCommands;

#[derive(Parser)]
#[command(name = "productid")]
#[command(author = "productid Contributors")]
#[command(version)]
#[command(about = "Keep product certificates in sync with the repositories installed packages came from", long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true, default_value = productid::DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print repositories that installed packages came from
    Active,

    /// Fetch product certificates from every enabled repository
    Collect,

    /// Resolve active repositories and report the resulting certificate plan
    Update {
        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// List enabled repositories
    Repos,

    /// Package/repository cache
    #[command(subcommand)]
    Cache(CacheCommands),
}
