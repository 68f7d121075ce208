// src/host/mod.rs

//! Host package manager integration
//!
//! The resolver only sees [`PackageDatabase`]. Differences between host
//! package manager generations (dnf 4 vs dnf 5 spell the same queries
//! differently) live in one adapter per generation, chosen once by
//! [`HostVersion::detect`] and never re-checked per call.

mod dnf;
mod rpmdb;

pub use dnf::{Dnf4Database, Dnf5Database, parse_repoquery_output};
pub use rpmdb::{RpmDb, parse_rpmdb_output};

use crate::error::{Error, Result};
use crate::packages::{AvailablePackage, InstalledIndex};
use std::path::{Path, PathBuf};
use std::process::Command;
use strum_macros::{Display, EnumString};
use tracing::debug;

/// Access to installed and available package sets
pub trait PackageDatabase {
    /// Fresh snapshot of installed packages, read from the rpm database
    fn installed(&self) -> Result<InstalledIndex>;

    /// The package manager's already-loaded view of available packages
    ///
    /// Cheap; may legitimately be empty (e.g. during a remove-only
    /// transaction where repository metadata was never loaded).
    fn available(&self) -> Result<Vec<AvailablePackage>>;

    /// Force a full metadata load of every enabled repository
    ///
    /// Expensive: network plus parsing of every repository's package list.
    fn load_all_available(&self) -> Result<Vec<AvailablePackage>>;
}

impl<T: PackageDatabase + ?Sized> PackageDatabase for Box<T> {
    fn installed(&self) -> Result<InstalledIndex> {
        (**self).installed()
    }

    fn available(&self) -> Result<Vec<AvailablePackage>> {
        (**self).available()
    }

    fn load_all_available(&self) -> Result<Vec<AvailablePackage>> {
        (**self).load_all_available()
    }
}

/// Generation of the host package manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum HostVersion {
    Dnf4,
    Dnf5,
}

impl HostVersion {
    /// Detect the installed dnf generation
    pub fn detect() -> Result<Self> {
        if which::which("dnf5").is_ok() {
            debug!("Found dnf5 binary");
            return Ok(Self::Dnf5);
        }

        which::which("dnf").map_err(|e| {
            Error::InitError(format!("No dnf package manager found: {}", e))
        })?;

        let output = run_command("dnf", &["--version"])?;
        parse_dnf_version(&output).ok_or_else(|| {
            Error::InitError(format!(
                "Unable to determine dnf version from: {}",
                output.lines().next().unwrap_or_default()
            ))
        })
    }

    /// Build the adapter for this generation
    pub fn database(self, install_root: &Path) -> Box<dyn PackageDatabase> {
        match self {
            Self::Dnf4 => Box::new(Dnf4Database::new(install_root)),
            Self::Dnf5 => Box::new(Dnf5Database::new(install_root)),
        }
    }
}

/// Parse `dnf --version` output
///
/// dnf 4 prints the bare version on the first line (`4.21.1`); dnf 5 prints
/// `dnf5 version 5.2.6.0`.
pub fn parse_dnf_version(output: &str) -> Option<HostVersion> {
    let first = output.lines().next()?;
    let version = first
        .split_whitespace()
        .find(|token| token.starts_with(|c: char| c.is_ascii_digit()))?;
    let major: u32 = version.split('.').next()?.parse().ok()?;

    match major {
        5.. => Some(HostVersion::Dnf5),
        1..=4 => Some(HostVersion::Dnf4),
        0 => None,
    }
}

/// Install root argument shared by rpm and dnf invocations
pub(crate) fn root_arg(install_root: &Path) -> Option<String> {
    if install_root == Path::new("/") || install_root.as_os_str().is_empty() {
        None
    } else {
        Some(install_root.display().to_string())
    }
}

/// Run a host tool and return its stdout
pub(crate) fn run_command(program: &str, args: &[&str]) -> Result<String> {
    debug!("Running {} {}", program, args.join(" "));

    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|e| Error::InitError(format!("Failed to run {}: {}", program, e)))?;

    if !output.status.success() {
        return Err(Error::QueryError(format!(
            "{} {} failed: {}",
            program,
            args.first().copied().unwrap_or_default(),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Common state of the dnf adapters
#[derive(Debug, Clone)]
pub(crate) struct HostRoot {
    pub install_root: PathBuf,
}

impl HostRoot {
    pub fn new(install_root: &Path) -> Self {
        Self {
            install_root: install_root.to_path_buf(),
        }
    }

    pub fn root_arg(&self) -> Option<String> {
        root_arg(&self.install_root)
    }
}
