//! Page retrieval: plain HTTP with an optional rendered-browser strategy.

pub mod browser;
mod http_client;
mod render_policy;
pub mod user_agent;

pub use browser::{BrowserEngineConfig, BrowserRenderer};
pub use http_client::HttpClient;
pub use render_policy::{RenderPolicy, DEFAULT_RENDER_DOMAINS};

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use crate::error::FetchError;

/// How a page was retrieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStrategy {
    Static,
    Rendered,
}

impl FetchStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::Rendered => "rendered",
        }
    }
}

/// Raw markup of one page and the strategy that produced it.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub url: Url,
    pub html: String,
    pub strategy: FetchStrategy,
}

/// Source of raw HTML over plain HTTP.
#[async_trait]
pub trait HtmlSource: Send + Sync {
    async fn get_html(&self, url: &Url) -> Result<String, FetchError>;
}

/// Rendering engine. Any failure is reported as `None`: the caller moves
/// on to the next strategy.
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(&self, url: &Url) -> Option<String>;

    /// Release the engine at the end of a run.
    async fn close(&self) {}
}

/// Picks a strategy per URL and falls back from rendered to static.
#[derive(Clone)]
pub struct PageFetcher {
    source: Arc<dyn HtmlSource>,
    renderer: Option<Arc<dyn Renderer>>,
    policy: RenderPolicy,
}

impl PageFetcher {
    pub fn new(
        source: Arc<dyn HtmlSource>,
        renderer: Option<Arc<dyn Renderer>>,
        policy: RenderPolicy,
    ) -> Self {
        Self {
            source,
            renderer,
            policy,
        }
    }

    /// Whether a rendering engine is available for this run.
    pub fn has_renderer(&self) -> bool {
        self.renderer.is_some()
    }

    /// Whether `url` belongs to a site known to need rendering.
    pub fn prefers_rendering(&self, url: &Url) -> bool {
        self.policy.prefers_rendering(url)
    }

    /// Fetch `url`, rendering first when asked to and an engine exists.
    pub async fn fetch(&self, url: &Url, prefer_rendering: bool) -> Result<FetchResult, FetchError> {
        if prefer_rendering {
            if let Some(renderer) = &self.renderer {
                if let Some(html) = renderer.render(url).await {
                    return Ok(FetchResult {
                        url: url.clone(),
                        html,
                        strategy: FetchStrategy::Rendered,
                    });
                }
                debug!("Rendering {} failed, falling back to static fetch", url);
            }
        }

        let html = self.source.get_html(url).await?;
        Ok(FetchResult {
            url: url.clone(),
            html,
            strategy: FetchStrategy::Static,
        })
    }

    /// Shut down the rendering engine, if any.
    pub async fn close(&self) {
        if let Some(renderer) = &self.renderer {
            renderer.close().await;
        }
    }
}
