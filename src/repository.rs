// src/repository.rs

//! Repository enumeration from yum/dnf `.repo` files
//!
//! Only the keys needed to locate repository metadata are kept. Everything
//! else in a section (gpgkey, priority, ...) is ignored.

use crate::error::{Error, Result};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A configured package repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    /// Section name, unique within a run
    pub id: String,
    pub name: Option<String>,
    pub enabled: bool,
    pub baseurls: Vec<String>,
    pub metalink: Option<String>,
    pub mirrorlist: Option<String>,
    /// File the repository was read from
    pub source: Option<PathBuf>,
}

impl Repository {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            enabled: true,
            baseurls: Vec::new(),
            metalink: None,
            mirrorlist: None,
            source: None,
        }
    }

    pub fn with_baseurl(mut self, url: impl Into<String>) -> Self {
        self.baseurls.push(url.into());
        self
    }
}

impl std::fmt::Display for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} ({})", self.id, name),
            None => write!(f, "{}", self.id),
        }
    }
}

/// Values substituted for `$releasever` / `$basearch` in repository URLs
#[derive(Debug, Clone)]
pub struct RepoVars {
    pub releasever: Option<String>,
    pub basearch: String,
}

impl Default for RepoVars {
    fn default() -> Self {
        Self {
            releasever: None,
            basearch: std::env::consts::ARCH.to_string(),
        }
    }
}

impl RepoVars {
    fn substitute(&self, value: &str) -> String {
        let mut out = value
            .replace("${basearch}", &self.basearch)
            .replace("$basearch", &self.basearch);
        if let Some(releasever) = &self.releasever {
            out = out
                .replace("${releasever}", releasever)
                .replace("$releasever", releasever);
        }
        out
    }
}

/// Read every `*.repo` file under `dirs`, in sorted file order
///
/// Missing directories are skipped; unreadable files are skipped with a
/// warning. Duplicate ids keep the first definition.
pub fn load_repositories(dirs: &[PathBuf], vars: &RepoVars) -> Result<Vec<Repository>> {
    let mut repos = Vec::new();
    let mut seen = HashSet::new();

    for dir in dirs {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Repository directory {} does not exist", dir.display());
                continue;
            }
            Err(e) => {
                return Err(Error::IoError(format!(
                    "Failed to read repository directory {}: {}",
                    dir.display(),
                    e
                )));
            }
        };

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "repo"))
            .collect();
        files.sort();

        for file in files {
            let content = match fs::read_to_string(&file) {
                Ok(content) => content,
                Err(e) => {
                    warn!("Unable to read repository file {}: {}", file.display(), e);
                    continue;
                }
            };

            for repo in parse_repo_file(&content, &file, vars) {
                if seen.insert(repo.id.clone()) {
                    repos.push(repo);
                } else {
                    warn!(
                        "Repository {} in {} is already defined, ignoring",
                        repo.id,
                        file.display()
                    );
                }
            }
        }
    }

    debug!("Loaded {} repositories", repos.len());
    Ok(repos)
}

/// Keep only enabled repositories
pub fn enabled_repositories(repos: Vec<Repository>) -> Vec<Repository> {
    repos.into_iter().filter(|repo| repo.enabled).collect()
}

/// Parse the contents of one `.repo` file
pub fn parse_repo_file(content: &str, source: &Path, vars: &RepoVars) -> Vec<Repository> {
    let mut repos: Vec<Repository> = Vec::new();
    let mut last_key: Option<String> = None;

    for (lineno, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if let Some(section) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            let id = section.trim();
            last_key = None;
            if id.is_empty() || id == "main" {
                continue;
            }
            let mut repo = Repository::new(id);
            repo.source = Some(source.to_path_buf());
            repos.push(repo);
            continue;
        }

        let Some(repo) = repos.last_mut() else {
            continue;
        };

        // Continuation of a multi-line value (baseurl lists); URLs may carry '='
        if raw.starts_with(char::is_whitespace) {
            if last_key.as_deref() == Some("baseurl") {
                repo.baseurls.extend(split_urls(line, vars));
                continue;
            }
            if !line.contains('=') {
                continue;
            }
        }

        let Some((key, value)) = line.split_once('=') else {
            warn!(
                "{}:{}: ignoring line without '=': {}",
                source.display(),
                lineno + 1,
                line
            );
            continue;
        };
        let key = key.trim().to_ascii_lowercase();
        let value = value.trim();

        match key.as_str() {
            "name" => repo.name = Some(value.to_string()),
            "enabled" => repo.enabled = parse_bool(value).unwrap_or(true),
            "baseurl" => repo.baseurls.extend(split_urls(value, vars)),
            "metalink" => repo.metalink = Some(vars.substitute(value)),
            "mirrorlist" => repo.mirrorlist = Some(vars.substitute(value)),
            _ => {}
        }
        last_key = Some(key);
    }

    repos
}

fn split_urls(value: &str, vars: &RepoVars) -> Vec<String> {
    value
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|url| !url.is_empty())
        .map(|url| vars.substitute(url))
        .collect()
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
