// src/host/rpmdb.rs

//! Query installed packages from the rpm database
//!
//! Uses the `rpm` command-line tool rather than the package manager's own
//! sack, so packages installed or removed by the transaction that just ran
//! are reflected.

use super::{root_arg, run_command};
use crate::error::Result;
use crate::packages::{InstalledIndex, InstalledPackage};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const QUERY_FORMAT: &str = "%{NAME}|%{ARCH}|%{EPOCH}|%{VERSION}|%{RELEASE}\n";

/// The rpm database under an install root
#[derive(Debug, Clone)]
pub struct RpmDb {
    install_root: PathBuf,
}

impl RpmDb {
    pub fn new(install_root: &Path) -> Self {
        Self {
            install_root: install_root.to_path_buf(),
        }
    }

    /// Query all installed packages
    pub fn installed(&self) -> Result<InstalledIndex> {
        debug!("Querying installed RPM packages");

        let root = root_arg(&self.install_root);
        let mut args = vec!["-qa", "--queryformat", QUERY_FORMAT];
        if let Some(root) = root.as_deref() {
            args.extend(["--root", root]);
        }

        let output = run_command("rpm", &args)?;
        let index = parse_rpmdb_output(&output);
        debug!("Found {} installed (name, arch) keys", index.len());
        Ok(index)
    }
}

/// Parse `rpm -qa` output produced with [`QUERY_FORMAT`]
///
/// Malformed lines are skipped.
pub fn parse_rpmdb_output(output: &str) -> InstalledIndex {
    let mut index = InstalledIndex::new();

    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split('|').collect();
        if parts.len() != 5 || parts[0].is_empty() {
            warn!("Skipping malformed rpm output line: {}", line);
            continue;
        }

        let epoch = if parts[2] == "(none)" || parts[2].is_empty() {
            None
        } else {
            parts[2].parse().ok()
        };

        index.insert(InstalledPackage {
            name: parts[0].to_string(),
            arch: if parts[1] == "(none)" {
                "noarch".to_string()
            } else {
                parts[1].to_string()
            },
            epoch,
            version: parts[3].to_string(),
            release: parts[4].to_string(),
        });
    }

    index
}
