// src/host/dnf.rs

//! dnf adapters
//!
//! Both generations answer the same two questions through `repoquery`:
//! what is available from already-loaded (cached) metadata, and what is
//! available after refreshing every enabled repository. They differ only in
//! binary name, tag spelling and newline handling of `--queryformat`.

use super::{HostRoot, PackageDatabase, RpmDb, run_command};
use crate::error::Result;
use crate::packages::{AvailablePackage, InstalledIndex};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, warn};

/// Which metadata a repoquery may use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MetadataMode {
    /// Only what is already on disk; never touches the network
    CacheOnly,
    /// Refresh every enabled repository first
    Refresh,
}

/// Adapter for dnf 4 (`dnf` with hawkey query tags)
#[derive(Debug, Clone)]
pub struct Dnf4Database {
    root: HostRoot,
    rpmdb: RpmDb,
}

impl Dnf4Database {
    const QUERY_FORMAT: &'static str = "%{name}|%{arch}|%{repoid}";

    pub fn new(install_root: &Path) -> Self {
        Self {
            root: HostRoot::new(install_root),
            rpmdb: RpmDb::new(install_root),
        }
    }

    fn repoquery(&self, mode: MetadataMode) -> Result<Vec<AvailablePackage>> {
        repoquery("dnf", Self::QUERY_FORMAT, &self.root, mode)
    }
}

impl PackageDatabase for Dnf4Database {
    fn installed(&self) -> Result<InstalledIndex> {
        self.rpmdb.installed()
    }

    fn available(&self) -> Result<Vec<AvailablePackage>> {
        self.repoquery(MetadataMode::CacheOnly)
    }

    fn load_all_available(&self) -> Result<Vec<AvailablePackage>> {
        info!("Loading metadata of all enabled repositories");
        self.repoquery(MetadataMode::Refresh)
    }
}

/// Adapter for dnf 5 (`dnf5`, libdnf5 query tags)
#[derive(Debug, Clone)]
pub struct Dnf5Database {
    root: HostRoot,
    rpmdb: RpmDb,
    program: &'static str,
}

impl Dnf5Database {
    // libdnf5 does not append a newline after each record
    const QUERY_FORMAT: &'static str = "%{name}|%{arch}|%{repo_id}\n";

    pub fn new(install_root: &Path) -> Self {
        // Fedora 41+ ships dnf5 as `dnf`; older releases install it side by side
        let program = if which::which("dnf5").is_ok() { "dnf5" } else { "dnf" };
        Self {
            root: HostRoot::new(install_root),
            rpmdb: RpmDb::new(install_root),
            program,
        }
    }

    fn repoquery(&self, mode: MetadataMode) -> Result<Vec<AvailablePackage>> {
        repoquery(self.program, Self::QUERY_FORMAT, &self.root, mode)
    }
}

impl PackageDatabase for Dnf5Database {
    fn installed(&self) -> Result<InstalledIndex> {
        self.rpmdb.installed()
    }

    fn available(&self) -> Result<Vec<AvailablePackage>> {
        self.repoquery(MetadataMode::CacheOnly)
    }

    fn load_all_available(&self) -> Result<Vec<AvailablePackage>> {
        info!("Loading metadata of all enabled repositories");
        self.repoquery(MetadataMode::Refresh)
    }
}

fn repoquery(
    program: &str,
    query_format: &str,
    root: &HostRoot,
    mode: MetadataMode,
) -> Result<Vec<AvailablePackage>> {
    let root = root.root_arg();
    let mut args = vec!["repoquery", "--quiet", "--available", "--queryformat", query_format];
    args.push(match mode {
        MetadataMode::CacheOnly => "--cacheonly",
        MetadataMode::Refresh => "--refresh",
    });
    if let Some(root) = root.as_deref() {
        args.extend(["--installroot", root]);
    }

    run_command(program, &args).map(|out| parse_repoquery_output(&out))
}

/// Parse `name|arch|repo` lines from repoquery
///
/// repoquery lists every available version, so the same triple repeats;
/// duplicates are dropped, first occurrence order kept.
pub fn parse_repoquery_output(output: &str) -> Vec<AvailablePackage> {
    let mut seen = HashSet::new();
    let mut packages = Vec::new();

    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let mut parts = line.split('|');
        let (Some(name), Some(arch), Some(repo_id), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            warn!("Skipping malformed repoquery line: {}", line);
            continue;
        };
        if name.is_empty() || arch.is_empty() || repo_id.is_empty() {
            warn!("Skipping malformed repoquery line: {}", line);
            continue;
        }

        let package = AvailablePackage::new(name, arch, repo_id);
        if seen.insert(package.clone()) {
            packages.push(package);
        }
    }

    debug!("Parsed {} available package records", packages.len());
    packages
}
