// src/lib.rs

//! Product certificate reconciliation for rpm-based systems
//!
//! After a package transaction, works out which repositories the installed
//! packages actually came from and pairs them with the product certificates
//! those repositories publish.
//!
//! # Architecture
//!
//! - Host-neutral: one `PackageDatabase` adapter per dnf generation
//! - Two-level available view: live package manager view, then a persistent
//!   package/repository cache, then a full metadata reload
//! - Per-repository isolation: one repository's failure never stops the rest
//! - Contained runs: failures are logged and reported, never raised to the host

pub mod cache;
pub mod certificate;
pub mod collector;
pub mod config;
mod error;
pub mod fetch;
pub mod host;
pub mod orchestrator;
pub mod packages;
pub mod reconcile;
pub mod repository;
pub mod resolver;

pub use cache::{DEFAULT_CACHE_FILE, PackageRepoCache};
pub use certificate::ProductCertificate;
pub use collector::{CertificateCollector, CertificateRepoPair, Collection, RepositoryOutcome};
pub use config::{Config, DEFAULT_CONFIG_FILE};
pub use error::{CacheError, Error, Result};
pub use fetch::{MetadataFetcher, RepomdFetcher, RepositoryClient};
pub use host::{HostVersion, PackageDatabase};
pub use orchestrator::{ProductUpdater, RunOutcome, SkipReason, TransactionContext, UpdateSummary};
pub use packages::{AvailablePackage, InstalledIndex, InstalledPackage, PackageKey};
pub use reconcile::{CertificateManager, PlanReporter, ReconcilePlan};
pub use repository::Repository;
pub use resolver::ActiveRepositoryResolver;
