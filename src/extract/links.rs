//! Sale sub-page discovery.

use std::collections::HashSet;
use std::sync::Arc;

use regex::Regex;
use url::Url;

use super::document::{Document, Element, Role};
use super::lexicon::Lexicon;
use super::text::clean_text;

/// Link text at or above this length is a paragraph link, not a sale label.
pub const MAX_LINK_TEXT_CHARS: usize = 50;

/// A discovered sale page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleLink {
    pub url: Url,
    /// Visible anchor text (or its label attribute), cleaned.
    pub text: String,
}

/// Finds links to dedicated sale pages.
#[derive(Debug, Clone)]
pub struct LinkDiscoverer {
    lexicon: Arc<Lexicon>,
    sale_path: Option<Regex>,
}

impl LinkDiscoverer {
    pub fn new(lexicon: Arc<Lexicon>) -> Result<Self, regex::Error> {
        let sale_path = if lexicon.sale_path_segments.is_empty() {
            None
        } else {
            let alternatives: Vec<String> = lexicon
                .sale_path_segments
                .iter()
                .map(|s| regex::escape(s))
                .collect();
            Some(Regex::new(&format!(
                r"(?i)(?:^|/)(?:{})(?:[-_./]|$)",
                alternatives.join("|")
            ))?)
        };
        Ok(Self { lexicon, sale_path })
    }

    /// Absolute sale-page URLs on the same site as `page_url`, deduplicated,
    /// in document order. The page itself is never included.
    pub fn discover(&self, doc: &Document, page_url: &Url) -> Vec<SaleLink> {
        let own = without_fragment(page_url);
        let mut seen: HashSet<Url> = HashSet::new();
        let mut links = Vec::new();

        for anchor in doc.by_role(Role::Link) {
            let Some(url) = self.resolve(anchor, page_url) else {
                continue;
            };
            if url == own || !same_site(&url, page_url) {
                continue;
            }

            let text = anchor_text(anchor);
            let lower = text.to_lowercase();
            if self.lexicon.is_denied(&lower) {
                continue;
            }
            let by_path = self
                .sale_path
                .as_ref()
                .is_some_and(|re| re.is_match(url.path()));
            let by_text = text.chars().count() < MAX_LINK_TEXT_CHARS
                && self.lexicon.has_sale_keyword(&lower);
            if !(by_path || by_text) {
                continue;
            }

            if seen.insert(url.clone()) {
                links.push(SaleLink { url, text });
            }
        }
        links
    }

    fn resolve(&self, anchor: &Element, base: &Url) -> Option<Url> {
        let href = anchor.attr("href")?.trim();
        if href.is_empty() || href.starts_with('#') {
            return None;
        }
        let url = base.join(href).ok()?;
        matches!(url.scheme(), "http" | "https").then(|| without_fragment(&url))
    }
}

fn without_fragment(url: &Url) -> Url {
    let mut url = url.clone();
    url.set_fragment(None);
    url
}

fn anchor_text(anchor: &Element) -> String {
    let visible = clean_text(&anchor.text, MAX_LINK_TEXT_CHARS * 4);
    if !visible.is_empty() {
        return visible;
    }
    ["aria-label", "title"]
        .iter()
        .filter_map(|a| anchor.attr(a))
        .map(|v| clean_text(v, MAX_LINK_TEXT_CHARS * 4))
        .find(|v| !v.is_empty())
        .unwrap_or_default()
}

/// Same host, ignoring a leading `www.`.
fn same_site(url: &Url, page: &Url) -> bool {
    fn bare(u: &Url) -> Option<&str> {
        u.host_str().map(|h| h.strip_prefix("www.").unwrap_or(h))
    }
    bare(url).is_some() && bare(url) == bare(page)
}
