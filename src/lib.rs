//! dealcrawl - heuristic sale and discount crawler.
//!
//! Visits a catalog of retail websites, finds pages advertising discounts,
//! and extracts short deal descriptions with an optional percentage.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod crawler;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod models;

pub use catalog::Catalog;
pub use config::Config;
pub use crawler::{run_crawl, CrawlOrchestrator, CrawlReport, SiteCrawler, SiteOutcome};
pub use error::{CatalogError, ConfigError, CrawlError, FetchError};
pub use models::{CrawlResult, Deal, Site};
