//! One site: main page, sale pages, then dedup and ranking.

use tracing::{debug, info, warn};
use url::Url;

use super::rank;
use crate::config::CrawlConfig;
use crate::error::FetchError;
use crate::extract::{Document, Heuristics, SaleLink, SourceLocation};
use crate::fetch::PageFetcher;
use crate::models::{Deal, Site};

/// Result of crawling one site.
#[derive(Debug, Clone, PartialEq)]
pub enum SiteOutcome {
    /// At least one deal survived ranking.
    Deals(Vec<Deal>),
    /// The site was reachable but advertised nothing.
    Empty,
    /// The main page could not be fetched, or the crawl was aborted.
    Failed { reason: String },
}

impl SiteOutcome {
    fn from_deals(deals: Vec<Deal>) -> Self {
        if deals.is_empty() {
            Self::Empty
        } else {
            Self::Deals(deals)
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deals(_) => "deals",
            Self::Empty => "empty",
            Self::Failed { .. } => "failed",
        }
    }

    pub fn deals(&self) -> &[Deal] {
        match self {
            Self::Deals(deals) => deals,
            Self::Empty | Self::Failed { .. } => &[],
        }
    }

    pub fn into_deals(self) -> Vec<Deal> {
        match self {
            Self::Deals(deals) => deals,
            Self::Empty | Self::Failed { .. } => Vec::new(),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Crawls a single site.
#[derive(Clone)]
pub struct SiteCrawler {
    fetcher: PageFetcher,
    heuristics: Heuristics,
    config: CrawlConfig,
}

impl SiteCrawler {
    pub fn new(fetcher: PageFetcher, heuristics: Heuristics, config: CrawlConfig) -> Self {
        Self {
            fetcher,
            heuristics,
            config,
        }
    }

    pub fn fetcher(&self) -> &PageFetcher {
        &self.fetcher
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    /// Fetch the main page, follow a bounded number of sale links, then
    /// dedup, rank and cap. Never panics on bad input; failures end up in
    /// [`SiteOutcome::Failed`].
    pub async fn crawl(&self, site: &Site) -> SiteOutcome {
        let url = match site.parsed_url() {
            Ok(url) => url,
            Err(e) => {
                let err = FetchError::InvalidUrl(format!("{}: {}", site.url, e));
                warn!("[{}] {}", site.id, err);
                return SiteOutcome::failed(err.to_string());
            }
        };
        let render = self.fetcher.has_renderer() && self.fetcher.prefers_rendering(&url);

        let main = match self.fetcher.fetch(&url, render).await {
            Ok(page) => page,
            Err(e) => {
                warn!("[{}] Failed to fetch main page: {}", site.id, e);
                return SiteOutcome::failed(e.to_string());
            }
        };
        debug!("[{}] Main page fetched ({})", site.id, main.strategy.as_str());

        let (mut deals, links) = {
            let doc = Document::parse(&main.html);
            (
                self.heuristics.deals.extract(&doc, &site.id, &url),
                self.heuristics.links.discover(&doc, &url),
            )
        };
        debug!(
            "[{}] {} deal(s) on main page, {} sale link(s)",
            site.id,
            deals.len(),
            links.len()
        );

        let followed: Vec<&SaleLink> = links.iter().take(self.config.max_sale_links).collect();
        for link in &followed {
            tokio::time::sleep(self.config.sale_page_delay()).await;
            deals.extend(self.crawl_sale_page(site, &link.url, render).await);
        }

        if deals.is_empty() {
            deals = self.anchor_deals(site, &followed);
        }

        let ranked = rank::finalize(
            deals,
            self.heuristics.lexicon(),
            self.config.dedup_prefix_chars,
            self.config.max_deals_per_site,
        );
        if !ranked.is_empty() {
            info!("[{}] Found {} deal(s)", site.id, ranked.len());
        }
        SiteOutcome::from_deals(ranked)
    }

    /// Deals on one sale page. A failed fetch skips the page.
    async fn crawl_sale_page(&self, site: &Site, url: &Url, render: bool) -> Vec<Deal> {
        let page = match self.fetcher.fetch(url, render).await {
            Ok(page) => page,
            Err(e) => {
                warn!("[{}] Skipping sale page {}: {}", site.id, url, e);
                return Vec::new();
            }
        };

        let doc = Document::parse(&page.html);
        let deals = self.heuristics.deals.extract(&doc, &site.id, url);
        if !deals.is_empty() {
            return deals;
        }
        debug!("[{}] Nothing structured on {}, using its title", site.id, url);
        self.heuristics
            .deals
            .title_fallback(&doc, &site.id, url)
            .into_iter()
            .collect()
    }

    /// Last resort: the sale links' own text, held to the link-text bar.
    fn anchor_deals(&self, site: &Site, links: &[&SaleLink]) -> Vec<Deal> {
        let scorer = self.heuristics.scorer();
        links
            .iter()
            .filter(|link| scorer.accepts(&link.text, SourceLocation::LinkText))
            .map(|link| {
                Deal::new(
                    site.id.as_str(),
                    link.text.as_str(),
                    scorer.detect_percentage(&link.text),
                    link.url.as_str(),
                )
            })
            .collect()
    }
}
