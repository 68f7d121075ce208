// src/config.rs
//! Configuration file parsing
//!
//! Supports TOML configuration files with the following sections:
//! - [general] - Install root, cache location, host backend
//! - [repositories] - Directories holding `.repo` files
//! - [fetch] - Metadata download timeout and retries
//!
//! Every key is optional. A missing file yields the defaults.

use crate::cache::DEFAULT_CACHE_FILE;
use crate::error::{Error, Result};
use crate::fetch::{HTTP_TIMEOUT, MAX_RETRIES};
use crate::host::HostVersion;
use crate::repository::RepoVars;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Default configuration file location
pub const DEFAULT_CONFIG_FILE: &str = "/etc/productid/productid.toml";

/// TOML configuration file structure
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralSection,

    #[serde(default)]
    pub repositories: RepositoriesSection,

    #[serde(default)]
    pub fetch: FetchSection,
}

/// Which host package manager adapter to use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Detect from the installed dnf
    #[default]
    Auto,
    Dnf4,
    Dnf5,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GeneralSection {
    /// Root passed to rpm and dnf
    ///
    /// Only the package queries see it. `cache_file` and
    /// `repositories.repos_dirs` are used exactly as written, on the host
    /// filesystem; they are not rebased under this root.
    pub install_root: PathBuf,
    pub cache_file: PathBuf,
    pub backend: Backend,
    /// Value for `$releasever` in `.repo` files
    pub releasever: Option<String>,
    /// Value for `$basearch`; defaults to the host architecture
    pub basearch: Option<String>,
}

impl Default for GeneralSection {
    fn default() -> Self {
        Self {
            install_root: PathBuf::from("/"),
            cache_file: PathBuf::from(DEFAULT_CACHE_FILE),
            backend: Backend::Auto,
            releasever: None,
            basearch: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RepositoriesSection {
    pub repos_dirs: Vec<PathBuf>,
}

impl Default for RepositoriesSection {
    fn default() -> Self {
        Self {
            repos_dirs: vec![PathBuf::from("/etc/yum.repos.d")],
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FetchSection {
    pub timeout_secs: u64,
    pub max_retries: u32,
}

impl Default for FetchSection {
    fn default() -> Self {
        Self {
            timeout_secs: HTTP_TIMEOUT.as_secs(),
            max_retries: MAX_RETRIES,
        }
    }
}

impl FetchSection {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Load configuration from a TOML file, falling back to defaults when
    /// the file does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::ConfigError(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        let config = Self::parse(&content).map_err(|e| match e {
            Error::ConfigError(msg) => Error::ConfigError(format!("{}: {}", path.display(), msg)),
            other => other,
        })?;

        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate configuration text
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(content).map_err(|e| Error::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.fetch.timeout_secs == 0 {
            return Err(Error::ConfigError(
                "fetch.timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.fetch.max_retries == 0 {
            return Err(Error::ConfigError(
                "fetch.max_retries must be at least 1".to_string(),
            ));
        }
        if self.repositories.repos_dirs.is_empty() {
            return Err(Error::ConfigError(
                "repositories.repos_dirs must name at least one directory".to_string(),
            ));
        }
        Ok(())
    }

    /// Variables substituted into `.repo` files
    pub fn repo_vars(&self) -> RepoVars {
        let defaults = RepoVars::default();
        RepoVars {
            releasever: self.general.releasever.clone(),
            basearch: self.general.basearch.clone().unwrap_or(defaults.basearch),
        }
    }

    /// The host version forced by configuration, if any
    pub fn forced_host_version(&self) -> Option<HostVersion> {
        match self.general.backend {
            Backend::Auto => None,
            Backend::Dnf4 => Some(HostVersion::Dnf4),
            Backend::Dnf5 => Some(HostVersion::Dnf5),
        }
    }
}
