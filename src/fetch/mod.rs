// src/fetch/mod.rs

//! Retrieval of per-repository identity artifacts
//!
//! A repository that ships a product certificate lists it in its
//! `repomd.xml` as a `productid` record. [`RepomdFetcher`] looks the record
//! up and downloads the artifact into a caller-provided directory.

mod client;
mod repomd;

pub use client::{HTTP_TIMEOUT, MAX_RETRIES, RepositoryClient};
pub use repomd::{PRODUCTID_RECORD, find_record_location};

use crate::error::{Error, Result};
use crate::repository::Repository;
use std::path::{Path, PathBuf};
use tracing::debug;
use url::Url;

/// Downloads a repository's identity artifact
pub trait MetadataFetcher {
    /// Fetch the artifact for `repo` into `dest_dir`
    ///
    /// `Ok(None)` means the repository carries no identity artifact. Errors
    /// are network, protocol or I/O failures.
    fn fetch(&self, repo: &Repository, dest_dir: &Path) -> Result<Option<PathBuf>>;
}

impl<T: MetadataFetcher + ?Sized> MetadataFetcher for &T {
    fn fetch(&self, repo: &Repository, dest_dir: &Path) -> Result<Option<PathBuf>> {
        (**self).fetch(repo, dest_dir)
    }
}

/// Fetches `productid` through the repository's `repomd.xml`
pub struct RepomdFetcher {
    client: RepositoryClient,
}

impl RepomdFetcher {
    pub fn new(client: RepositoryClient) -> Self {
        Self { client }
    }

    /// Look up the productid record in the first baseurl whose
    /// `repomd.xml` can be fetched and parsed
    ///
    /// Returns the base URL that answered and the record's href, if any.
    fn locate_productid(&self, repo: &Repository) -> Result<(Url, Option<String>)> {
        let mut last_error = None;

        for baseurl in &repo.baseurls {
            match self.read_record(baseurl) {
                Ok(found) => return Ok(found),
                Err(e) => {
                    debug!("Skipping baseurl {} of {}: {}", baseurl, repo.id, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            Error::DownloadError(format!("No usable baseurl for repository {}", repo.id))
        }))
    }

    fn read_record(&self, baseurl: &str) -> Result<(Url, Option<String>)> {
        let base = base_url(baseurl)?;
        let repomd_url = join(&base, "repodata/repomd.xml")?;
        debug!("Downloading metadata from: {}", repomd_url);

        let bytes = self.client.get_bytes(&repomd_url)?;
        let xml = String::from_utf8(bytes)
            .map_err(|e| Error::ParseError(format!("Invalid UTF-8 in {}: {}", repomd_url, e)))?;
        let href = find_record_location(&xml, PRODUCTID_RECORD)?;
        Ok((base, href))
    }
}

impl MetadataFetcher for RepomdFetcher {
    fn fetch(&self, repo: &Repository, dest_dir: &Path) -> Result<Option<PathBuf>> {
        if repo.baseurls.is_empty() {
            // metalink/mirrorlist resolution belongs to the package manager
            debug!("Repository {} has no baseurl, skipping productid lookup", repo.id);
            return Ok(None);
        }

        let (base, href) = self.locate_productid(repo)?;
        let Some(href) = href else {
            return Ok(None);
        };

        let artifact_url = join(&base, &href)?;
        let file_name = href
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty())
            .unwrap_or(PRODUCTID_RECORD);
        let dest = dest_dir.join(file_name);

        self.client.download_file(&artifact_url, &dest)?;
        debug!(
            "Product id cert downloaded metadata from repo {} to {}",
            repo.id,
            dest.display()
        );
        Ok(Some(dest))
    }
}

/// Parse a baseurl, making sure it ends in `/` so joins stay inside it
fn base_url(baseurl: &str) -> Result<Url> {
    let with_slash = if baseurl.ends_with('/') {
        baseurl.to_string()
    } else {
        format!("{baseurl}/")
    };
    Url::parse(&with_slash).map_err(|e| Error::ParseError(format!("Invalid baseurl {baseurl}: {e}")))
}

fn join(base: &Url, path: &str) -> Result<Url> {
    base.join(path)
        .map_err(|e| Error::ParseError(format!("Invalid location {path} under {base}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn local_repo(root: &Path, repomd: &str) -> Repository {
        fs::create_dir_all(root.join("repodata")).unwrap();
        fs::write(root.join("repodata/repomd.xml"), repomd).unwrap();
        Repository::new("local").with_baseurl(Url::from_directory_path(root).unwrap().to_string())
    }

    #[test]
    fn test_base_url_appends_slash() {
        let url = base_url("https://example.com/fedora/41").unwrap();
        assert_eq!(
            join(&url, "repodata/repomd.xml").unwrap().as_str(),
            "https://example.com/fedora/41/repodata/repomd.xml"
        );
    }

    #[test]
    fn test_fetch_downloads_productid() {
        let repo_dir = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        let repo = local_repo(
            repo_dir.path(),
            r#"<repomd><data type="productid"><location href="repodata/abc-productid.gz"/></data></repomd>"#,
        );
        fs::write(repo_dir.path().join("repodata/abc-productid.gz"), b"cert").unwrap();

        let fetcher = RepomdFetcher::new(RepositoryClient::new().unwrap());
        let path = fetcher.fetch(&repo, dest.path()).unwrap().unwrap();
        assert_eq!(path, dest.path().join("abc-productid.gz"));
        assert_eq!(fs::read(path).unwrap(), b"cert");
    }

    #[test]
    fn test_fetch_without_productid_record() {
        let repo_dir = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        let repo = local_repo(
            repo_dir.path(),
            r#"<repomd><data type="primary"><location href="repodata/p.xml.gz"/></data></repomd>"#,
        );

        let fetcher = RepomdFetcher::new(RepositoryClient::new().unwrap());
        assert_eq!(fetcher.fetch(&repo, dest.path()).unwrap(), None);
    }

    #[test]
    fn test_fetch_falls_back_to_second_baseurl() {
        let repo_dir = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        let good = local_repo(repo_dir.path(), "<repomd/>");
        let repo = Repository::new("mirrored")
            .with_baseurl("file:///nonexistent/mirror/")
            .with_baseurl(good.baseurls[0].clone());

        let fetcher = RepomdFetcher::new(RepositoryClient::new().unwrap());
        assert_eq!(fetcher.fetch(&repo, dest.path()).unwrap(), None);
    }

    #[test]
    fn test_fetch_skips_mirror_with_undecodable_repomd() {
        let bad_dir = TempDir::new().unwrap();
        let good_dir = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        let bad = local_repo(bad_dir.path(), "<repomd/>");
        fs::write(bad_dir.path().join("repodata/repomd.xml"), [0xff, 0xfe, 0x00]).unwrap();
        let good = local_repo(good_dir.path(), "<repomd/>");
        let repo = Repository::new("mirrored")
            .with_baseurl(bad.baseurls[0].clone())
            .with_baseurl(good.baseurls[0].clone());

        let fetcher = RepomdFetcher::new(RepositoryClient::new().unwrap());
        assert_eq!(fetcher.fetch(&repo, dest.path()).unwrap(), None);
    }

    #[test]
    fn test_fetch_skips_mirror_with_malformed_repomd() {
        let bad_dir = TempDir::new().unwrap();
        let good_dir = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        let bad = local_repo(bad_dir.path(), "<repomd><data type=\"productid\"></repomd>");
        let good = local_repo(
            good_dir.path(),
            r#"<repomd><data type="productid"><location href="repodata/p.gz"/></data></repomd>"#,
        );
        fs::write(good_dir.path().join("repodata/p.gz"), b"cert").unwrap();
        let repo = Repository::new("mirrored")
            .with_baseurl(bad.baseurls[0].clone())
            .with_baseurl(good.baseurls[0].clone());

        let fetcher = RepomdFetcher::new(RepositoryClient::new().unwrap());
        let path = fetcher.fetch(&repo, dest.path()).unwrap().unwrap();
        assert_eq!(fs::read(path).unwrap(), b"cert");
    }

    #[test]
    fn test_fetch_single_malformed_mirror_is_error() {
        let repo_dir = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        let repo = local_repo(repo_dir.path(), "<repomd><data></repomd>");

        let fetcher = RepomdFetcher::new(RepositoryClient::new().unwrap());
        assert!(matches!(fetcher.fetch(&repo, dest.path()), Err(Error::ParseError(_))));
    }

    #[test]
    fn test_fetch_unreachable_repository_is_error() {
        let dest = TempDir::new().unwrap();
        let repo = Repository::new("gone").with_baseurl("file:///nonexistent/repo/");

        let fetcher = RepomdFetcher::new(RepositoryClient::new().unwrap());
        assert!(fetcher.fetch(&repo, dest.path()).is_err());
    }

    #[test]
    fn test_fetch_repository_without_baseurl() {
        let dest = TempDir::new().unwrap();
        let mut repo = Repository::new("fedora");
        repo.metalink = Some("https://mirrors.example.com/metalink".to_string());

        let fetcher = RepomdFetcher::new(RepositoryClient::new().unwrap());
        assert_eq!(fetcher.fetch(&repo, dest.path()).unwrap(), None);
    }
}
