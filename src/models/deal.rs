//! Deal records and the crawl result handed to the persistence boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A discount found on one page of one site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
    /// Identifier of the catalog site this deal belongs to.
    pub site_id: String,
    /// Cleaned, human-readable description (non-empty, capped length).
    pub description: String,
    /// Detected discount, e.g. "50%".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<String>,
    /// Page the description was found on.
    pub url: String,
    pub found_at: DateTime<Utc>,
}

impl Deal {
    pub fn new(
        site_id: impl Into<String>,
        description: impl Into<String>,
        percentage: Option<u8>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            site_id: site_id.into(),
            description: description.into(),
            percentage: percentage.map(|p| format!("{p}%")),
            url: url.into(),
            found_at: Utc::now(),
        }
    }

    pub fn has_percentage(&self) -> bool {
        self.percentage.is_some()
    }
}

/// Output of one full crawl run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlResult {
    /// Completion time of the run.
    pub last_crawled: DateTime<Utc>,
    pub deals: Vec<Deal>,
}

impl CrawlResult {
    /// Stamp a result, ordering deals with a percentage first.
    ///
    /// The sort is stable, so within each group deals keep the order in
    /// which they were aggregated.
    pub fn new(mut deals: Vec<Deal>) -> Self {
        sort_percentage_first(&mut deals);
        Self {
            last_crawled: Utc::now(),
            deals,
        }
    }
}

/// Stable sort placing deals that carry a percentage before those that don't.
pub fn sort_percentage_first(deals: &mut [Deal]) {
    deals.sort_by_key(|d| !d.has_percentage());
}
