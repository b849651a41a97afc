//! Site catalog loading.
//!
//! The catalog is owned by an external data source; this module only reads
//! and validates it. Failure here is the one condition that aborts a run.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use tracing::debug;
use url::Url;

use crate::error::CatalogError;
use crate::models::Site;

/// Validated, read-only list of sites.
#[derive(Debug, Clone)]
pub struct Catalog {
    sites: Vec<Site>,
}

impl Catalog {
    /// Validate a list of sites: ids must be unique and URLs absolute http(s).
    pub fn new(sites: Vec<Site>) -> Result<Self, CatalogError> {
        if sites.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::new();
        for site in &sites {
            if !seen.insert(site.id.as_str()) {
                return Err(CatalogError::DuplicateId(site.id.clone()));
            }
            let valid = Url::parse(&site.url)
                .map(|u| matches!(u.scheme(), "http" | "https"))
                .unwrap_or(false);
            if !valid {
                return Err(CatalogError::InvalidUrl {
                    id: site.id.clone(),
                    url: site.url.clone(),
                });
            }
        }

        Ok(Self { sites })
    }

    /// Load a JSON array of sites from disk.
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let raw = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let sites: Vec<Site> =
            serde_json::from_str(&raw).map_err(|source| CatalogError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        debug!("Loaded {} sites from {}", sites.len(), path.display());
        Self::new(sites)
    }

    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    pub fn get(&self, id: &str) -> Option<&Site> {
        self.sites.iter().find(|s| s.id == id)
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}
