// src/packages/mod.rs

//! Package identity types shared by the resolver, the cache and host adapters
//!
//! Installed packages are matched against available packages by
//! (name, architecture) only; version, epoch and release are carried for
//! logging but never take part in matching.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// (name, architecture) pair identifying an installed package
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageKey {
    pub name: String,
    pub arch: String,
}

impl PackageKey {
    pub fn new(name: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arch: arch.into(),
        }
    }
}

impl fmt::Display for PackageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.name, self.arch)
    }
}

/// A package record from the local rpm database
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstalledPackage {
    pub name: String,
    pub arch: String,
    pub epoch: Option<u64>,
    pub version: String,
    pub release: String,
}

impl InstalledPackage {
    pub fn key(&self) -> PackageKey {
        PackageKey::new(&self.name, &self.arch)
    }

    /// Full NEVRA string (name-[epoch:]version-release.arch)
    pub fn nevra(&self) -> String {
        match self.epoch {
            Some(epoch) if epoch > 0 => format!(
                "{}-{}:{}-{}.{}",
                self.name, epoch, self.version, self.release, self.arch
            ),
            _ => format!("{}-{}-{}.{}", self.name, self.version, self.release, self.arch),
        }
    }
}

/// Snapshot of the installed package set keyed by (name, arch)
///
/// Several records can share a key (installonly packages such as kernels keep
/// more than one version installed).
#[derive(Debug, Clone, Default)]
pub struct InstalledIndex {
    by_key: HashMap<PackageKey, BTreeSet<InstalledPackage>>,
}

impl InstalledIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, package: InstalledPackage) {
        self.by_key.entry(package.key()).or_default().insert(package);
    }

    pub fn contains(&self, name: &str, arch: &str) -> bool {
        self.by_key.contains_key(&PackageKey::new(name, arch))
    }

    /// Records installed under a key
    pub fn get(&self, key: &PackageKey) -> Option<&BTreeSet<InstalledPackage>> {
        self.by_key.get(key)
    }

    /// Number of distinct (name, arch) keys
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

impl FromIterator<InstalledPackage> for InstalledIndex {
    fn from_iter<I: IntoIterator<Item = InstalledPackage>>(iter: I) -> Self {
        let mut index = Self::new();
        for package in iter {
            index.insert(package);
        }
        index
    }
}

/// A package offered by an enabled repository
///
/// Serialized as a bare `[name, arch, repository_id]` array, which is the
/// on-disk shape of the package/repository cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(String, String, String)", into = "(String, String, String)")]
pub struct AvailablePackage {
    pub name: String,
    pub arch: String,
    pub repo_id: String,
}

impl AvailablePackage {
    pub fn new(
        name: impl Into<String>,
        arch: impl Into<String>,
        repo_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            arch: arch.into(),
            repo_id: repo_id.into(),
        }
    }

    pub fn key(&self) -> PackageKey {
        PackageKey::new(&self.name, &self.arch)
    }
}

impl From<(String, String, String)> for AvailablePackage {
    fn from((name, arch, repo_id): (String, String, String)) -> Self {
        Self {
            name,
            arch,
            repo_id,
        }
    }
}

impl From<AvailablePackage> for (String, String, String) {
    fn from(pkg: AvailablePackage) -> Self {
        (pkg.name, pkg.arch, pkg.repo_id)
    }
}
