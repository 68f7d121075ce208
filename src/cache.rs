// src/cache.rs

//! Package/repository cache
//!
//! Persists which repository each installed (name, arch) was available from,
//! so a later run that finds the package manager's available view empty can
//! skip a full metadata reload. The file is a JSON array of
//! `[name, arch, repository_id]` triples with no version field.
//!
//! Caching is an optimization only: every failure here is logged and turned
//! into "no cache" (on read) or ignored (on write).

use crate::error::CacheError;
use crate::packages::AvailablePackage;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};

/// Default location shared with subscription-manager
pub const DEFAULT_CACHE_FILE: &str = "/var/lib/rhsm/cache/package_repo_mapping.json";

/// Single-file snapshot of installed packages' repository of origin
#[derive(Debug, Clone)]
pub struct PackageRepoCache {
    path: PathBuf,
}

impl Default for PackageRepoCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_FILE)
    }
}

impl PackageRepoCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the cached records
    ///
    /// Returns `None` when the file is missing, unreadable or malformed. A
    /// file holding `[]` is a valid snapshot and yields `Some(vec![])`.
    pub fn read(&self) -> Option<Vec<AvailablePackage>> {
        match self.try_read() {
            Ok(records) => {
                debug!(
                    "Read {} cached package records from {}",
                    records.len(),
                    self.path.display()
                );
                Some(records)
            }
            Err(e @ CacheError::Missing { .. }) => {
                debug!("{}", e);
                None
            }
            Err(e @ CacheError::Io { .. }) => {
                error!("Unable to read cache: {}", e);
                None
            }
            Err(e @ CacheError::Malformed { .. }) => {
                warn!("Ignoring cache: {}", e);
                None
            }
        }
    }

    /// Replace the cache contents with `records`, preserving their order
    pub fn write(&self, records: &[AvailablePackage]) {
        match self.try_write(records) {
            Ok(()) => debug!("Wrote cache: {}", self.path.display()),
            Err(e) => error!("Unable to write cache: {}", e),
        }
    }

    /// Remove the cache file; returns whether a file was removed
    pub fn clear(&self) -> crate::Result<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CacheError::Io {
                path: self.path.display().to_string(),
                source: e,
            }
            .into()),
        }
    }

    fn try_read(&self) -> Result<Vec<AvailablePackage>, CacheError> {
        let content = fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        serde_json::from_str(&content).map_err(|source| CacheError::Malformed {
            path: self.path.display().to_string(),
            source,
        })
    }

    fn try_write(&self, records: &[AvailablePackage]) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
            }
        }

        // The JSON encoding of plain string triples cannot fail
        let json = serde_json::to_vec(records).map_err(|source| CacheError::Malformed {
            path: self.path.display().to_string(),
            source,
        })?;

        // Write to temporary file first, then atomic rename
        let temp_path = self.path.with_extension("json.tmp");
        let result = fs::File::create(&temp_path)
            .and_then(|mut file| {
                file.write_all(&json)?;
                file.sync_all()
            })
            .and_then(|()| fs::rename(&temp_path, &self.path));

        if let Err(e) = result {
            let _ = fs::remove_file(&temp_path);
            return Err(self.io_error(e));
        }
        Ok(())
    }

    fn io_error(&self, source: io::Error) -> CacheError {
        let path = self.path.display().to_string();
        if source.kind() == io::ErrorKind::NotFound {
            CacheError::Missing { path }
        } else {
            CacheError::Io { path, source }
        }
    }
}
