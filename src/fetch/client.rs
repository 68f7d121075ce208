// src/fetch/client.rs

//! HTTP client for repository metadata
//!
//! Wraps reqwest with retry support. `file://` URLs are read straight from
//! disk so local mirrors and install media work without a server.

use crate::error::{Error, Result};
use reqwest::blocking::Client;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Default timeout for HTTP requests (30 seconds)
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum retry attempts for failed downloads
pub const MAX_RETRIES: u32 = 3;

/// Retry delay in milliseconds
const RETRY_DELAY_MS: u64 = 1000;

/// HTTP client wrapper with retry support
pub struct RepositoryClient {
    client: Client,
    max_retries: u32,
}

impl RepositoryClient {
    /// Create a client with the default timeout and retry count
    pub fn new() -> Result<Self> {
        Self::with_options(HTTP_TIMEOUT, MAX_RETRIES)
    }

    pub fn with_options(timeout: Duration, max_retries: u32) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::InitError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            max_retries: max_retries.max(1),
        })
    }

    /// Fetch a URL into memory
    pub fn get_bytes(&self, url: &Url) -> Result<Vec<u8>> {
        if url.scheme() == "file" {
            let path = local_path(url)?;
            return fs::read(&path).map_err(|e| {
                Error::DownloadError(format!("Failed to read {}: {}", path.display(), e))
            });
        }

        self.with_retry(url, |response| {
            let bytes = response
                .bytes()
                .map_err(|e| Error::DownloadError(format!("Failed to read response: {e}")))?;
            Ok(bytes.to_vec())
        })
    }

    /// Download a URL to `dest_path`
    pub fn download_file(&self, url: &Url, dest_path: &Path) -> Result<()> {
        debug!("Downloading {} to {}", url, dest_path.display());

        if let Some(parent) = dest_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::IoError(format!("Failed to create directory {}: {e}", parent.display()))
            })?;
        }

        if url.scheme() == "file" {
            let path = local_path(url)?;
            fs::copy(&path, dest_path).map_err(|e| {
                Error::DownloadError(format!("Failed to copy {}: {}", path.display(), e))
            })?;
            return Ok(());
        }

        self.with_retry(url, |mut response| {
            // Write to temporary file first
            let temp_path = dest_path.with_extension("tmp");
            let mut file = File::create(&temp_path).map_err(|e| {
                Error::IoError(format!("Failed to create file {}: {e}", temp_path.display()))
            })?;

            io::copy(&mut response, &mut file)
                .map_err(|e| Error::IoError(format!("Failed to write downloaded data: {e}")))?;

            // Atomic rename from temp to final destination
            fs::rename(&temp_path, dest_path).map_err(|e| {
                Error::IoError(format!(
                    "Failed to move {} to {}: {e}",
                    temp_path.display(),
                    dest_path.display()
                ))
            })
        })
    }

    fn with_retry<T>(
        &self,
        url: &Url,
        mut handle: impl FnMut(reqwest::blocking::Response) -> Result<T>,
    ) -> Result<T> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.client.get(url.as_str()).send() {
                Ok(response) => {
                    if !response.status().is_success() {
                        return Err(Error::DownloadError(format!(
                            "HTTP {} from {}",
                            response.status(),
                            url
                        )));
                    }
                    return handle(response);
                }
                Err(e) => {
                    if attempt >= self.max_retries {
                        return Err(Error::DownloadError(format!(
                            "Failed to fetch {url} after {attempt} attempts: {e}"
                        )));
                    }
                    warn!("Fetch attempt {} for {} failed: {}, retrying...", attempt, url, e);
                    std::thread::sleep(Duration::from_millis(RETRY_DELAY_MS * attempt as u64));
                }
            }
        }
    }
}

fn local_path(url: &Url) -> Result<PathBuf> {
    url.to_file_path()
        .map_err(|()| Error::ParseError(format!("Not a local file URL: {url}")))
}
