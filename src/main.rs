// src/main.rs

use anyhow::{Context, Result};
use clap::Parser;
use productid::config::Config;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{CacheCommands, Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing subscriber for logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config = Config::load(&cli.config)
        .with_context(|| format!("Failed to load config {}", cli.config.display()))?;

    match cli.command {
        Commands::Active => commands::cmd_active(&config),
        Commands::Collect => commands::cmd_collect(&config),
        Commands::Update { json } => commands::cmd_update(&config, json),
        Commands::Repos => commands::cmd_repos(&config),
        Commands::Cache(CacheCommands::Show) => commands::cmd_cache_show(&config),
        Commands::Cache(CacheCommands::Clear) => commands::cmd_cache_clear(&config),
    }
}
