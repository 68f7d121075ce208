// src/commands/mod.rs
//! Command handlers for the productid CLI

mod cache;
mod repo;
mod update;

// Re-export all command handlers
pub use cache::{cmd_cache_clear, cmd_cache_show};
pub use repo::cmd_repos;
pub use update::{cmd_active, cmd_collect, cmd_update};

use anyhow::{Context, Result};
use productid::config::Config;
use productid::fetch::{RepomdFetcher, RepositoryClient};
use productid::host::{HostVersion, PackageDatabase};
use productid::repository::{self, Repository};
use productid::{CertificateCollector, PackageRepoCache};
use tracing::debug;

/// Enabled repositories from the configured `.repo` directories
fn enabled_repositories(config: &Config) -> Result<Vec<Repository>> {
    let repos = repository::load_repositories(&config.repositories.repos_dirs, &config.repo_vars())
        .context("Failed to enumerate repositories")?;
    Ok(repository::enabled_repositories(repos))
}

/// Open the host package database through the adapter for this host
fn open_database(config: &Config) -> productid::Result<Box<dyn PackageDatabase>> {
    let version = match config.forced_host_version() {
        Some(version) => version,
        None => HostVersion::detect()?,
    };
    debug!("Using {} package database", version);
    Ok(version.database(&config.general.install_root))
}

fn certificate_collector(config: &Config) -> Result<CertificateCollector<RepomdFetcher>> {
    let client = RepositoryClient::with_options(config.fetch.timeout(), config.fetch.max_retries)
        .context("Failed to create repository client")?;
    Ok(CertificateCollector::new(RepomdFetcher::new(client)))
}

fn package_repo_cache(config: &Config) -> PackageRepoCache {
    PackageRepoCache::new(&config.general.cache_file)
}
