//! Data models for dealcrawl.

mod deal;
mod site;

pub use deal::{sort_percentage_first, CrawlResult, Deal};
pub use site::{Coordinates, Site, SiteCategory};
