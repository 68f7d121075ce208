// src/resolver.rs

//! Active repository resolution
//!
//! A repository is active when at least one installed (name, arch) is
//! offered by it. The available side comes from the first source that has
//! data:
//!
//! 1. the package manager's live view, used as-is when non-empty;
//! 2. the package/repository cache, used as-is when present (even if empty);
//! 3. a full reload of all repositories, filtered to installed keys and
//!    written back to the cache.
//!
//! Cache entries are never invalidated. A cached record pointing at a
//! repository that has since been disabled still marks it active until the
//! cache is rewritten.

use crate::cache::PackageRepoCache;
use crate::error::Result;
use crate::host::PackageDatabase;
use crate::packages::{AvailablePackage, InstalledIndex, InstalledPackage};
use std::collections::BTreeSet;
use tracing::{debug, trace, warn};

/// Where the available records of one resolution came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvailableSource {
    LiveView,
    Cache,
    FullReload,
}

/// Computes which repositories installed packages came from
pub struct ActiveRepositoryResolver<D> {
    db: D,
    cache: PackageRepoCache,
}

impl<D: PackageDatabase> ActiveRepositoryResolver<D> {
    pub fn new(db: D, cache: PackageRepoCache) -> Self {
        Self { db, cache }
    }

    pub fn database(&self) -> &D {
        &self.db
    }

    pub fn cache(&self) -> &PackageRepoCache {
        &self.cache
    }

    /// Ids of repositories that currently installed packages came from
    pub fn resolve_active_repositories(&self) -> Result<BTreeSet<String>> {
        let installed = self.db.installed()?;
        if installed.is_empty() {
            debug!("No installed packages, no active repositories");
            return Ok(BTreeSet::new());
        }

        let (available, source) = self.available_for(&installed)?;
        debug!(
            "Matching {} installed keys against {} available records ({:?})",
            installed.len(),
            available.len(),
            source
        );

        Ok(active_repositories(&installed, &available))
    }

    /// Available records for matching against `installed`, with their source
    pub fn available_for(
        &self,
        installed: &InstalledIndex,
    ) -> Result<(Vec<AvailablePackage>, AvailableSource)> {
        let live = match self.db.available() {
            Ok(live) => live,
            Err(e) => {
                warn!("Unable to query available packages: {}", e);
                Vec::new()
            }
        };
        if !live.is_empty() {
            return Ok((live, AvailableSource::LiveView));
        }

        if let Some(cached) = self.cache.read() {
            return Ok((cached, AvailableSource::Cache));
        }

        debug!("No live view and no usable cache, reloading all repositories");
        let all = self.db.load_all_available()?;
        let snapshot: Vec<AvailablePackage> = all
            .into_iter()
            .filter(|pkg| installed.contains(&pkg.name, &pkg.arch))
            .collect();
        self.cache.write(&snapshot);

        Ok((snapshot, AvailableSource::FullReload))
    }
}

/// Repository ids of the available records whose (name, arch) is installed
pub fn active_repositories(
    installed: &InstalledIndex,
    available: &[AvailablePackage],
) -> BTreeSet<String> {
    let mut active = BTreeSet::new();
    for pkg in available {
        let key = pkg.key();
        let Some(records) = installed.get(&key) else {
            continue;
        };
        if active.insert(pkg.repo_id.clone()) {
            let nevras: Vec<String> = records.iter().map(InstalledPackage::nevra).collect();
            trace!("Repository {} provides installed {} ({})", pkg.repo_id, key, nevras.join(", "));
        }
    }
    active
}
