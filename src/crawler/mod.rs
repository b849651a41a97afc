//! Crawl orchestration: per-site state machine, ranking and batching.

mod orchestrator;
pub mod rank;
mod site;

pub use orchestrator::{CrawlOrchestrator, CrawlReport};
pub use site::{SiteCrawler, SiteOutcome};

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::catalog::Catalog;
use crate::config::Config;
use crate::error::CrawlError;
use crate::fetch::{BrowserRenderer, HttpClient, PageFetcher, Renderer};

/// Start the rendering engine, or `None` when disabled or unavailable.
///
/// Unavailability is not an error: the run continues with plain fetches.
pub async fn launch_renderer(config: &Config, allow: bool) -> Option<Arc<dyn Renderer>> {
    if !allow || !config.browser.enabled {
        info!("Rendering disabled, using plain fetches only");
        return None;
    }
    match BrowserRenderer::launch(
        config.browser.clone(),
        &config.fetch.resolved_user_agent(),
        &config.fetch.accept_language,
    )
    .await
    {
        Ok(renderer) => Some(Arc::new(renderer)),
        Err(e) => {
            warn!(
                "Rendering engine unavailable, continuing with plain fetches: {:#}",
                e
            );
            None
        }
    }
}

/// Assemble a site crawler from configuration.
///
/// Configuration is validated before any browser process is started.
pub async fn build_crawler(config: &Config, allow_rendering: bool) -> Result<SiteCrawler, CrawlError> {
    let heuristics = config.heuristics()?;
    let bound = config.site_fetch_bound();
    if config.crawl.site_timeout() < bound {
        warn!(
            "site_timeout_secs ({}) is below the worst-case site crawl ({}s); slow sites will be cut short",
            config.crawl.site_timeout_secs,
            bound.as_secs()
        );
    }
    let source = Arc::new(HttpClient::new(&config.fetch)?);
    let renderer = launch_renderer(config, allow_rendering).await;
    let fetcher = PageFetcher::new(source, renderer, config.render_policy());
    Ok(SiteCrawler::new(fetcher, heuristics, config.crawl.clone()))
}

/// Run a full crawl of the catalog at `catalog_path`.
///
/// Only setup can fail (unreadable catalog, bad config); every per-site
/// problem is absorbed into the report.
pub async fn run_crawl(
    catalog_path: &Path,
    config: &Config,
    allow_rendering: bool,
) -> Result<CrawlReport, CrawlError> {
    let catalog = Catalog::from_path(catalog_path)?;
    let orchestrator = CrawlOrchestrator::new(build_crawler(config, allow_rendering).await?);

    let report = orchestrator.run(catalog.sites()).await;
    orchestrator.close().await;
    Ok(report)
}
