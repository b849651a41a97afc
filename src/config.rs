//! Configuration for dealcrawl.
//!
//! Everything has a default, so running without a config file works. A TOML
//! file only needs the keys it changes:
//!
//! ```toml
//! [browser]
//! remote_url = "ws://localhost:9222"
//!
//! [crawl]
//! max_deals_per_site = 5
//!
//! [lexicon]
//! bare_labels = ["sale", "ale", "rea"]
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::extract::{Heuristics, Lexicon, ScoringPolicy};
use crate::fetch::user_agent::{resolve_user_agent, ACCEPT_LANGUAGE};
use crate::fetch::{BrowserEngineConfig, RenderPolicy, DEFAULT_RENDER_DOMAINS};

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "dealcrawl.toml";

/// Plain HTTP fetch settings (`[fetch]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Sent verbatim when set; desktop Chrome otherwise.
    pub user_agent: Option<String>,
    pub accept_language: String,
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: None,
            accept_language: ACCEPT_LANGUAGE.to_string(),
            timeout_secs: 10,
        }
    }
}

impl FetchConfig {
    pub fn resolved_user_agent(&self) -> String {
        resolve_user_agent(self.user_agent.as_deref())
    }
}

/// Crawl pacing and limits (`[crawl]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Domains fetched with the rendering engine.
    pub render_domains: Vec<String>,
    /// Concurrent sites per batch when rendering is active.
    pub batch_size_rendered: usize,
    /// Concurrent sites per batch for plain fetches only.
    pub batch_size_static: usize,
    pub batch_delay_ms: u64,
    /// Pause before each sale-page fetch of one site.
    pub sale_page_delay_ms: u64,
    pub max_sale_links: usize,
    pub max_deals_per_site: usize,
    /// Characters of normalized description compared when deduplicating.
    pub dedup_prefix_chars: usize,
    /// Upper bound on one site's whole crawl.
    pub site_timeout_secs: u64,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            render_domains: DEFAULT_RENDER_DOMAINS.iter().map(|d| d.to_string()).collect(),
            batch_size_rendered: 3,
            batch_size_static: 5,
            batch_delay_ms: 1000,
            sale_page_delay_ms: 500,
            max_sale_links: 2,
            max_deals_per_site: 8,
            dedup_prefix_chars: 50,
            site_timeout_secs: 150,
        }
    }
}

impl CrawlConfig {
    pub fn batch_size(&self, rendering: bool) -> usize {
        let size = if rendering {
            self.batch_size_rendered
        } else {
            self.batch_size_static
        };
        size.max(1)
    }

    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }

    pub fn sale_page_delay(&self) -> Duration {
        Duration::from_millis(self.sale_page_delay_ms)
    }

    pub fn site_timeout(&self) -> Duration {
        Duration::from_secs(self.site_timeout_secs)
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fetch: FetchConfig,
    pub browser: BrowserEngineConfig,
    pub crawl: CrawlConfig,
    pub scoring: ScoringPolicy,
    pub lexicon: Lexicon,

    /// File this config was loaded from.
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load `explicit` if given, else `dealcrawl.toml` in the working
    /// directory if present, else defaults. Env overrides apply in all cases.
    pub async fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load_from_path(path).await;
        }
        let local = Path::new(DEFAULT_CONFIG_FILE);
        if tokio::fs::try_exists(local).await.unwrap_or(false) {
            return Self::load_from_path(local).await;
        }
        debug!("No config file, using defaults");
        Ok(Self::default().with_env_overrides())
    }

    pub async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let mut config: Config = toml::from_str(&contents)?;
        config.source_path = Some(path.to_path_buf());
        debug!("Loaded config from {}", path.display());
        Ok(config.with_env_overrides())
    }

    pub fn with_env_overrides(mut self) -> Self {
        self.browser = self.browser.with_env_overrides();
        self
    }

    /// Compile the lexicon and scoring policy.
    pub fn heuristics(&self) -> Result<Heuristics, ConfigError> {
        Ok(Heuristics::new(self.lexicon.clone(), self.scoring.clone())?)
    }

    /// Longest a site crawl can take when every fetch runs to its own
    /// bound: main page plus followed sale pages, each possibly rendered
    /// and then fetched again statically, plus the pauses between them.
    pub fn site_fetch_bound(&self) -> Duration {
        let mut per_page = Duration::from_secs(self.fetch.timeout_secs);
        if self.browser.enabled {
            per_page += self.browser.render_budget();
        }
        let pages = 1 + self.crawl.max_sale_links as u32;
        per_page * pages + self.crawl.sale_page_delay() * self.crawl.max_sale_links as u32
    }

    pub fn render_policy(&self) -> RenderPolicy {
        RenderPolicy::new(self.crawl.render_domains.iter().cloned())
    }
}
