// src/cli/cache.rs
//! Package/repository cache commands

use clap::Subcommand;

#[derive(Subcommand)]
pub enum CacheCommands {
    /// Print the cached (name, arch, repository) records
    Show,

    /// Remove the cache file so the next run reloads repository metadata
    Clear,
}
