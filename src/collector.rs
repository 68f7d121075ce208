// src/collector.rs

//! Certificate collection across enabled repositories
//!
//! Each repository is handled on its own: a failure while fetching or
//! parsing one repository's artifact is recorded and the next repository is
//! processed. Every fetch gets a fresh temporary directory that is removed
//! when the repository has been handled, whatever the outcome.

use crate::certificate::ProductCertificate;
use crate::error::{Error, Result};
use crate::fetch::MetadataFetcher;
use crate::repository::Repository;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::PathBuf;
use tempfile::TempDir;
use tracing::{debug, warn};

/// A product certificate and the repository it was fetched from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateRepoPair {
    pub certificate: ProductCertificate,
    pub repo_id: String,
}

/// What happened when looking for one repository's certificate
#[derive(Debug)]
pub enum RepositoryOutcome {
    Certificate(ProductCertificate),
    /// The repository does not publish a productid artifact
    NoArtifact,
    /// An artifact was published but holds no product certificate
    Unparseable,
    /// Fetch or parse failed unexpectedly
    Failed(Error),
}

/// Result of collecting certificates from a set of repositories
#[derive(Debug, Default)]
pub struct Collection {
    pub pairs: Vec<CertificateRepoPair>,
    /// Repositories whose productid metadata could not be obtained
    pub metadata_errors: BTreeSet<String>,
}

/// Short per-repository summary, used for reporting
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CollectionSummary {
    pub certificates: Vec<(String, String)>,
    pub metadata_errors: Vec<String>,
}

impl Collection {
    pub fn summary(&self) -> CollectionSummary {
        CollectionSummary {
            certificates: self
                .pairs
                .iter()
                .map(|pair| (pair.repo_id.clone(), pair.certificate.product_id.clone()))
                .collect(),
            metadata_errors: self.metadata_errors.iter().cloned().collect(),
        }
    }
}

/// Collects product certificates from repositories
pub struct CertificateCollector<F> {
    fetcher: F,
    temp_root: Option<PathBuf>,
}

impl<F: MetadataFetcher> CertificateCollector<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            temp_root: None,
        }
    }

    /// Create per-repository download directories under `dir` instead of the
    /// system temporary directory
    pub fn with_temp_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_root = Some(dir.into());
        self
    }

    /// Collect certificates from every repository in `repos`
    pub fn collect(&self, repos: &[Repository]) -> Collection {
        let mut collection = Collection::default();

        for repo in repos {
            match self.collect_one(repo) {
                RepositoryOutcome::Certificate(certificate) => {
                    debug!("Repository {} provides product {}", repo.id, certificate);
                    collection.pairs.push(CertificateRepoPair {
                        certificate,
                        repo_id: repo.id.clone(),
                    });
                }
                RepositoryOutcome::NoArtifact => {
                    // Every enabled repository is checked, not only product ones
                    collection.metadata_errors.insert(repo.id.clone());
                }
                RepositoryOutcome::Unparseable => {
                    debug!("Repository {} does not provide cert", repo.id);
                }
                RepositoryOutcome::Failed(e) => {
                    warn!("Error loading productid metadata for {}: {}", repo.id, e);
                    collection.metadata_errors.insert(repo.id.clone());
                }
            }
        }

        if !collection.metadata_errors.is_empty() {
            debug!(
                "Unable to load productid metadata for repos: {:?}",
                collection.metadata_errors
            );
        }
        collection
    }

    /// Fetch and parse one repository's artifact
    pub fn collect_one(&self, repo: &Repository) -> RepositoryOutcome {
        let temp_dir = match self.temp_dir() {
            Ok(dir) => dir,
            Err(e) => return RepositoryOutcome::Failed(e),
        };

        let fetched = match self.fetcher.fetch(repo, temp_dir.path()) {
            Ok(fetched) => fetched,
            Err(e) => return RepositoryOutcome::Failed(e),
        };

        match fetched {
            None => RepositoryOutcome::NoArtifact,
            Some(path) => match ProductCertificate::from_artifact(&path) {
                Ok(Some(certificate)) => RepositoryOutcome::Certificate(certificate),
                Ok(None) => RepositoryOutcome::Unparseable,
                Err(e) => RepositoryOutcome::Failed(e),
            },
        }
    }

    fn temp_dir(&self) -> Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("productid-");
        let dir = match &self.temp_root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        };
        dir.map_err(|e| Error::IoError(format!("Failed to create temporary directory: {e}")))
    }
}
