//! Network-free fakes shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use dealcrawl::config::CrawlConfig;
use dealcrawl::extract::{Heuristics, Lexicon, ScoringPolicy};
use dealcrawl::fetch::{HtmlSource, PageFetcher, RenderPolicy, Renderer};
use dealcrawl::models::{Coordinates, Site, SiteCategory};
use dealcrawl::{FetchError, SiteCrawler};

/// Serves fixed pages by URL. Unknown URLs are 404s.
///
/// Hosts can be made to panic or hang, and every fetch can be delayed to
/// observe batch concurrency.
#[derive(Default)]
pub struct FakeWeb {
    pages: HashMap<String, String>,
    panicking_hosts: Vec<String>,
    hanging_hosts: Vec<String>,
    latency: Duration,
    requests: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeWeb {
    pub fn page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    pub fn panics_on(mut self, host: &str) -> Self {
        self.panicking_hosts.push(host.to_string());
        self
    }

    pub fn hangs_on(mut self, host: &str) -> Self {
        self.hanging_hosts.push(host.to_string());
        self
    }

    pub fn latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HtmlSource for FakeWeb {
    async fn get_html(&self, url: &Url) -> Result<String, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());
        let host = url.host_str().unwrap_or_default().to_string();
        if self.panicking_hosts.contains(&host) {
            panic!("parser blew up on {host}");
        }
        if self.hanging_hosts.contains(&host) {
            std::future::pending::<()>().await;
        }

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.pages
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| FetchError::Status {
                url: url.to_string(),
                status: 404,
            })
    }
}

/// A rendering engine that never produces a page.
#[derive(Default)]
pub struct BrokenRenderer {
    pub attempts: AtomicUsize,
    pub closed: AtomicUsize,
}

#[async_trait]
impl Renderer for BrokenRenderer {
    async fn render(&self, _url: &Url) -> Option<String> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        None
    }

    async fn close(&self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn site(id: &str, url: &str) -> Site {
    Site {
        id: id.to_string(),
        name: id.to_string(),
        address: "Aleksanterinkatu 1, Helsinki".to_string(),
        url: url.to_string(),
        coordinates: Coordinates {
            lat: 60.1699,
            lng: 24.9384,
        },
        category: SiteCategory::MidRange,
    }
}

pub fn crawler(web: Arc<FakeWeb>, renderer: Option<Arc<dyn Renderer>>) -> SiteCrawler {
    crawler_with(web, renderer, CrawlConfig::default())
}

pub fn crawler_with(
    web: Arc<FakeWeb>,
    renderer: Option<Arc<dyn Renderer>>,
    config: CrawlConfig,
) -> SiteCrawler {
    let policy = RenderPolicy::new(config.render_domains.iter().cloned());
    let fetcher = PageFetcher::new(web, renderer, policy);
    let heuristics = Heuristics::new(Lexicon::default(), ScoringPolicy::default()).unwrap();
    SiteCrawler::new(fetcher, heuristics, config)
}
