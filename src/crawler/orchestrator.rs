//! Batched crawl over the whole catalog.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{info, warn};

use super::site::{SiteCrawler, SiteOutcome};
use crate::catalog::Catalog;
use crate::models::{CrawlResult, Site};

/// Aggregate result plus the outcome of every site, in catalog order.
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub result: CrawlResult,
    pub outcomes: Vec<(String, SiteOutcome)>,
}

impl CrawlReport {
    /// Number of sites whose outcome has the given label
    /// (`deals`, `empty` or `failed`).
    pub fn count(&self, label: &str) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| o.as_str() == label)
            .count()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.outcomes.iter().filter_map(|(id, o)| match o {
            SiteOutcome::Failed { reason } => Some((id.as_str(), reason.as_str())),
            _ => None,
        })
    }

    pub fn outcome(&self, site_id: &str) -> Option<&SiteOutcome> {
        self.outcomes
            .iter()
            .find(|(id, _)| id == site_id)
            .map(|(_, o)| o)
    }
}

/// Runs [`SiteCrawler`] over a catalog in sequential, bounded batches.
#[derive(Clone)]
pub struct CrawlOrchestrator {
    crawler: Arc<SiteCrawler>,
}

impl CrawlOrchestrator {
    pub fn new(crawler: SiteCrawler) -> Self {
        Self {
            crawler: Arc::new(crawler),
        }
    }

    pub fn crawler(&self) -> &SiteCrawler {
        &self.crawler
    }

    /// Crawl every catalog site and stamp the aggregate.
    pub async fn run_all(&self, catalog: &Catalog) -> CrawlResult {
        self.run(catalog.sites()).await.result
    }

    /// Crawl `sites`, keeping each site's outcome.
    pub async fn run(&self, sites: &[Site]) -> CrawlReport {
        let config = self.crawler.config();
        let rendering = self.crawler.fetcher().has_renderer();
        let batch_size = config.batch_size(rendering);
        let batch_count = sites.len().div_ceil(batch_size);
        info!(
            "Crawling {} sites in {} batch(es) of up to {}{}",
            sites.len(),
            batch_count,
            batch_size,
            if rendering { " (rendering enabled)" } else { "" }
        );

        let mut outcomes: Vec<(String, SiteOutcome)> = Vec::with_capacity(sites.len());
        for (index, batch) in sites.chunks(batch_size).enumerate() {
            if index > 0 {
                tokio::time::sleep(config.batch_delay()).await;
            }
            info!(
                "Batch {}/{}: {}",
                index + 1,
                batch_count,
                batch
                    .iter()
                    .map(|s| s.id.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            outcomes.extend(self.run_batch(batch).await);
        }

        let deals = outcomes
            .iter()
            .flat_map(|(_, o)| o.deals().iter().cloned())
            .collect();
        let result = CrawlResult::new(deals);
        info!(
            "Crawl complete. Found {} deals across {} sites",
            result.deals.len(),
            sites.len()
        );
        CrawlReport { result, outcomes }
    }

    /// All sites of one batch concurrently; every site settles.
    async fn run_batch(&self, batch: &[Site]) -> Vec<(String, SiteOutcome)> {
        let timeout = self.crawler.config().site_timeout();
        let handles: Vec<_> = batch
            .iter()
            .cloned()
            .map(|site| {
                let crawler = Arc::clone(&self.crawler);
                tokio::spawn(async move {
                    match tokio::time::timeout(timeout, crawler.crawl(&site)).await {
                        Ok(outcome) => outcome,
                        Err(_) => {
                            warn!("[{}] Timed out after {}s", site.id, timeout.as_secs());
                            SiteOutcome::failed(format!("timed out after {}s", timeout.as_secs()))
                        }
                    }
                })
            })
            .collect();

        let joined = join_all(handles).await;
        batch
            .iter()
            .zip(joined)
            .map(|(site, result)| {
                let outcome = result.unwrap_or_else(|e| {
                    warn!("[{}] Crawl task aborted: {}", site.id, e);
                    SiteOutcome::failed(format!("crawl task aborted: {e}"))
                });
                (site.id.clone(), outcome)
            })
            .collect()
    }

    /// Release the rendering engine.
    pub async fn close(&self) {
        self.crawler.fetcher().close().await;
    }
}
