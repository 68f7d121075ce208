// src/orchestrator.rs

//! Per-transaction orchestration
//!
//! A [`TransactionContext`] is built when the host configures the plugin and
//! holds the enabled repositories captured at that point. After the package
//! transaction completes, [`TransactionContext::run`] collects certificates,
//! resolves the active repositories and hands the resulting plan to a
//! [`CertificateManager`].
//!
//! Failures never escape a run. They are logged and reported through
//! [`RunOutcome`] so the host transaction is unaffected.

use crate::cache::PackageRepoCache;
use crate::collector::{CertificateCollector, Collection};
use crate::error::Result;
use crate::fetch::MetadataFetcher;
use crate::host::PackageDatabase;
use crate::reconcile::{CertificateManager, ReconcilePlan};
use crate::repository::Repository;
use crate::resolver::ActiveRepositoryResolver;
use serde::Serialize;
use std::collections::BTreeSet;
use strum_macros::Display;
use tracing::{debug, error, info};

/// Why a run did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SkipReason {
    #[strum(serialize = "empty transaction")]
    EmptyTransaction,
    #[strum(serialize = "setup failed")]
    SetupFailed,
}

/// Result of a completed update
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UpdateSummary {
    pub plan: ReconcilePlan,
    /// Repositories whose productid metadata could not be obtained
    pub metadata_errors: BTreeSet<String>,
}

/// How one run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Skipped(SkipReason),
    Updated(UpdateSummary),
    Failed(String),
}

/// Components used by every run
pub struct ProductUpdater<F, M> {
    collector: CertificateCollector<F>,
    cache: PackageRepoCache,
    manager: M,
}

impl<F: MetadataFetcher, M: CertificateManager> ProductUpdater<F, M> {
    pub fn new(collector: CertificateCollector<F>, cache: PackageRepoCache, manager: M) -> Self {
        Self {
            collector,
            cache,
            manager,
        }
    }

    pub fn manager(&self) -> &M {
        &self.manager
    }

    fn update<D: PackageDatabase>(
        &self,
        repos: &[Repository],
        db: D,
    ) -> Result<UpdateSummary> {
        let Collection {
            pairs,
            metadata_errors,
        } = self.collector.collect(repos);
        debug!("Collected {} product certificates", pairs.len());

        let resolver = ActiveRepositoryResolver::new(db, self.cache.clone());
        let active = resolver.resolve_active_repositories()?;
        debug!("Active repositories: {:?}", active);

        let plan = ReconcilePlan::build(&pairs, &active);
        self.manager.update(&plan)?;

        Ok(UpdateSummary {
            plan,
            metadata_errors,
        })
    }
}

/// Repositories captured when the host configured the plugin
#[derive(Debug, Clone, Default)]
pub struct TransactionContext {
    repositories: Vec<Repository>,
}

impl TransactionContext {
    /// Capture the enabled repositories for the coming transaction
    pub fn configure(repos: impl IntoIterator<Item = Repository>) -> Self {
        let repositories: Vec<Repository> = repos.into_iter().filter(|r| r.enabled).collect();
        debug!("Captured {} enabled repositories", repositories.len());
        Self { repositories }
    }

    pub fn repositories(&self) -> &[Repository] {
        &self.repositories
    }

    /// Run the update after a transaction of `transaction_len` items
    ///
    /// `setup` opens the host package database; it is only called when the
    /// transaction did something.
    pub fn run<D, F, M>(
        &self,
        transaction_len: usize,
        updater: &ProductUpdater<F, M>,
        setup: impl FnOnce() -> Result<D>,
    ) -> RunOutcome
    where
        D: PackageDatabase,
        F: MetadataFetcher,
        M: CertificateManager,
    {
        if transaction_len == 0 {
            debug!("Empty transaction, not updating installed products");
            return RunOutcome::Skipped(SkipReason::EmptyTransaction);
        }

        let db = match setup() {
            Ok(db) => db,
            Err(e) => {
                error!("Unable to set up product id update: {}", e);
                return RunOutcome::Skipped(SkipReason::SetupFailed);
            }
        };

        match updater.update(&self.repositories, db) {
            Ok(summary) => {
                info!("Installed products updated.");
                RunOutcome::Updated(summary)
            }
            Err(e) => {
                error!("Unable to update installed products: {}", e);
                RunOutcome::Failed(e.to_string())
            }
        }
    }
}
