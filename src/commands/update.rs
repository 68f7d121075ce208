// src/commands/update.rs
//! Resolution, collection and update commands

use super::{certificate_collector, enabled_repositories, open_database, package_repo_cache};
use anyhow::{Context, Result};
use productid::config::Config;
use productid::{
    ActiveRepositoryResolver, PlanReporter, ProductUpdater, RunOutcome, SkipReason,
    TransactionContext,
};
use tracing::info;

/// A manual run is treated like a transaction that changed something
const MANUAL_TRANSACTION_LEN: usize = 1;

/// Print repositories that installed packages came from
pub fn cmd_active(config: &Config) -> Result<()> {
    let db = open_database(config).context("Failed to open package database")?;
    let resolver = ActiveRepositoryResolver::new(db, package_repo_cache(config));

    let active = resolver
        .resolve_active_repositories()
        .context("Failed to resolve active repositories")?;
    for repo_id in &active {
        println!("{}", repo_id);
    }
    Ok(())
}

/// Fetch and print product certificates of enabled repositories
pub fn cmd_collect(config: &Config) -> Result<()> {
    let repos = enabled_repositories(config)?;
    info!("Collecting product certificates from {} repositories", repos.len());

    let collection = certificate_collector(config)?.collect(&repos);

    if collection.pairs.is_empty() {
        println!("No product certificates found");
    } else {
        println!("Product certificates:");
        for pair in &collection.pairs {
            println!("  {:<30} {}", pair.repo_id, pair.certificate);
        }
    }

    if !collection.metadata_errors.is_empty() {
        println!("No productid metadata:");
        for repo_id in &collection.metadata_errors {
            println!("  {}", repo_id);
        }
    }
    Ok(())
}

/// Run a full reconciliation against the dry-run manager
pub fn cmd_update(config: &Config, json: bool) -> Result<()> {
    let context = TransactionContext::configure(enabled_repositories(config)?);
    let updater = ProductUpdater::new(
        certificate_collector(config)?,
        package_repo_cache(config),
        PlanReporter::new(),
    );

    let summary = match context.run(MANUAL_TRANSACTION_LEN, &updater, || open_database(config)) {
        RunOutcome::Updated(summary) => summary,
        RunOutcome::Skipped(SkipReason::EmptyTransaction) => {
            println!("Nothing to do");
            return Ok(());
        }
        RunOutcome::Skipped(reason) => anyhow::bail!("Update skipped: {}", reason),
        RunOutcome::Failed(detail) => anyhow::bail!("Update failed: {}", detail),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let plan = &summary.plan;
    if plan.is_empty() {
        println!("No product certificates to install");
    } else {
        println!("Product certificates to install:");
        for (product, repos) in &plan.repo_map {
            println!("  {} <- {}", product, repos.join(", "));
        }
    }
    if !plan.inactive.is_empty() {
        println!("Not installed (repository not active):");
        for cert in &plan.inactive {
            println!("  {} from {}", cert.product_id, cert.repo_id);
        }
    }
    println!("Active repositories: {}", plan.active_repositories.len());
    Ok(())
}
