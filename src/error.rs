// src/error.rs

//! Error types for product certificate reconciliation

use thiserror::Error;

/// Errors raised by the library
///
/// Variants carry a preformatted message; callers build the message at the
/// point of failure so the log line names the repository or file involved.
#[derive(Error, Debug)]
pub enum Error {
    /// A required host tool or client could not be set up
    #[error("Initialization failed: {0}")]
    InitError(String),

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Download failed: {0}")]
    DownloadError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// The host package database returned an error or unusable output
    #[error("Package query failed: {0}")]
    QueryError(String),

    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Contained failure of a cache operation
///
/// These never escape [`crate::cache::PackageRepoCache`]'s public API; they are
/// logged there and turned into "no cache".
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache file {path} does not exist")]
    Missing { path: String },

    #[error("unable to access cache file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed cache file {path}: {source}")]
    Malformed {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err.to_string())
    }
}

/// Result type for library operations
pub type Result<T> = std::result::Result<T, Error>;
