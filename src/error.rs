//! Error types.

use std::path::PathBuf;

use thiserror::Error;

/// A single page could not be retrieved.
///
/// Always recoverable: callers treat it as "no content for this URL".
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("failed to read body of {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// The site catalog could not be loaded. Fatal for a crawl run.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("cannot read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse catalog {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("duplicate site id in catalog: {0}")]
    DuplicateId(String),
    #[error("site {id} has an invalid URL: {url}")]
    InvalidUrl { id: String, url: String },
    #[error("catalog contains no sites")]
    Empty,
}

/// Configuration file problems.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid percentage pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Failures that prevent a run from starting.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
}
