// src/commands/repo.rs
//! Repository listing

use super::enabled_repositories;
use anyhow::Result;
use productid::config::Config;

/// List enabled repositories
pub fn cmd_repos(config: &Config) -> Result<()> {
    let repos = enabled_repositories(config)?;

    if repos.is_empty() {
        println!("No enabled repositories");
        return Ok(());
    }

    println!("Enabled repositories:");
    for repo in &repos {
        println!("  {}", repo);
        for baseurl in &repo.baseurls {
            println!("      {}", baseurl);
        }
        if repo.baseurls.is_empty() {
            let via = repo
                .metalink
                .as_deref()
                .or(repo.mirrorlist.as_deref())
                .unwrap_or("no baseurl");
            println!("      ({})", via);
        }
    }
    Ok(())
}
