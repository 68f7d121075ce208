// src/commands/cache.rs
//! Package/repository cache commands

use super::package_repo_cache;
use anyhow::Result;
use productid::config::Config;
use tracing::info;

/// Print the cached records
pub fn cmd_cache_show(config: &Config) -> Result<()> {
    let cache = package_repo_cache(config);

    match cache.read() {
        None => println!("No usable cache at {}", cache.path().display()),
        Some(records) if records.is_empty() => {
            println!("Cache at {} is empty", cache.path().display());
        }
        Some(records) => {
            println!("{} ({} records):", cache.path().display(), records.len());
            for record in &records {
                println!("  {}.{}  {}", record.name, record.arch, record.repo_id);
            }
        }
    }
    Ok(())
}

/// Remove the cache file
pub fn cmd_cache_clear(config: &Config) -> Result<()> {
    let cache = package_repo_cache(config);
    info!("Clearing cache at {}", cache.path().display());

    if cache.clear()? {
        println!("Removed {}", cache.path().display());
    } else {
        println!("No cache at {}", cache.path().display());
    }
    Ok(())
}
