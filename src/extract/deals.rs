//! Promotional text extraction.

use std::sync::Arc;

use tracing::debug;
use url::Url;

use super::document::{Document, Element, Role, HINT_ATTRS};
use super::scorer::{ContentScorer, SourceLocation};
use super::text::{clean_text, dedup_key, MAX_DESCRIPTION_CHARS};
use crate::models::Deal;

/// Descriptions shorter than this get category keywords appended.
const SHORT_DESCRIPTION_CHARS: usize = 12;
/// Category keywords appended to a short description.
const MAX_ENRICH_CATEGORIES: usize = 3;
/// Ancestor levels searched for category keywords.
const ENRICH_DEPTH: usize = 2;

/// A text fragment that cleared the scoring threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateText {
    pub text: String,
    pub location: SourceLocation,
    pub percentage: Option<u8>,
    pub categories: Vec<String>,
    pub score: i32,
}

impl CandidateText {
    /// Description shown to readers: the text itself, or for very short
    /// labels the text followed by nearby category keywords.
    pub fn description(&self) -> String {
        if self.categories.is_empty() {
            self.text.clone()
        } else {
            format!("{}: {}", self.text, self.categories.join(", "))
        }
    }

    fn overlaps(&self, other: &CandidateText) -> bool {
        let a = self.text.to_lowercase();
        let b = other.text.to_lowercase();
        a.contains(&b) || b.contains(&a)
    }
}

/// Scans documents for promotional text.
#[derive(Debug, Clone)]
pub struct DealExtractor {
    scorer: Arc<ContentScorer>,
}

impl DealExtractor {
    pub fn new(scorer: Arc<ContentScorer>) -> Self {
        Self { scorer }
    }

    pub fn scorer(&self) -> &ContentScorer {
        &self.scorer
    }

    /// Deals found on one page. Never fails; an unpromising page yields an
    /// empty list.
    pub fn extract(&self, doc: &Document, site_id: &str, page_url: &Url) -> Vec<Deal> {
        self.candidates(doc)
            .into_iter()
            .map(|c| Deal::new(site_id, c.description(), c.percentage, page_url.as_str()))
            .collect()
    }

    /// Accepted, de-overlapped candidates in document order.
    pub fn candidates(&self, doc: &Document) -> Vec<CandidateText> {
        let accepted: Vec<CandidateText> = doc
            .elements()
            .iter()
            .filter_map(|el| {
                let location = self.classify(doc, el)?;
                self.evaluate(doc, el, location)
            })
            .collect();
        deoverlap(accepted)
    }

    /// Single low-confidence deal from the page title or first heading.
    ///
    /// Used when a followed sale page yields no structured candidates.
    pub fn title_fallback(&self, doc: &Document, site_id: &str, page_url: &Url) -> Option<Deal> {
        let heading = doc
            .by_role(Role::Heading)
            .find(|h| h.tag == "h1" && !h.has_role(Role::Chrome))
            .map(|h| h.text.as_str());
        let text = heading
            .into_iter()
            .chain(doc.title())
            .map(|t| clean_text(t, MAX_DESCRIPTION_CHARS))
            .find(|t| !t.is_empty() && !self.scorer.is_false_positive(t))?;

        let percentage = self.scorer.detect_percentage(&text);
        Some(Deal::new(site_id, text, percentage, page_url.as_str()))
    }

    fn classify(&self, doc: &Document, el: &Element) -> Option<SourceLocation> {
        if el.has_role(Role::Chrome) || el.truncated || el.text.is_empty() {
            return None;
        }
        let lexicon = self.scorer.lexicon();
        if el.has_role(Role::Heading) {
            return Some(SourceLocation::Heading);
        }
        if el.attr_contains(HINT_ATTRS, &lexicon.promo_class_hints) {
            return Some(SourceLocation::PromoContainer);
        }
        if el.attr_contains(HINT_ATTRS, &lexicon.product_class_hints) && self.shows_discount(doc, el)
        {
            return Some(SourceLocation::ProductCard);
        }
        None
    }

    /// Old/new price pairing or a visible percentage.
    fn shows_discount(&self, doc: &Document, el: &Element) -> bool {
        let lexicon = self.scorer.lexicon();
        let struck = doc.descendants(el).iter().any(|d| {
            d.has_role(Role::Struck) || d.attr_contains(HINT_ATTRS, &lexicon.old_price_class_hints)
        });
        struck
            || lexicon.has_was_now_pair(&el.text.to_lowercase())
            || self.scorer.detect_percentage(&el.text).is_some()
    }

    fn evaluate(
        &self,
        doc: &Document,
        el: &Element,
        location: SourceLocation,
    ) -> Option<CandidateText> {
        let text = clean_text(&el.text, MAX_DESCRIPTION_CHARS);
        if text.is_empty() || self.scorer.is_false_positive(&text) {
            return None;
        }

        let breakdown = self.scorer.breakdown(&text);
        let threshold = self.scorer.policy().threshold(location);
        if breakdown.total < threshold {
            debug!(
                location = location.as_str(),
                score = breakdown.total,
                threshold,
                "rejected candidate: {text}"
            );
            return None;
        }

        let categories = if text.chars().count() < SHORT_DESCRIPTION_CHARS {
            self.nearby_categories(doc, el)
        } else {
            Vec::new()
        };
        if categories.is_empty()
            && self
                .scorer
                .lexicon()
                .is_bare_label(&dedup_key(&text, usize::MAX))
        {
            debug!("rejected bare label without categories: {text}");
            return None;
        }

        Some(CandidateText {
            text,
            location,
            percentage: breakdown.percentage,
            categories,
            score: breakdown.total,
        })
    }

    fn nearby_categories(&self, doc: &Document, el: &Element) -> Vec<String> {
        let lexicon = self.scorer.lexicon();
        let mut found: Vec<String> = Vec::new();
        for scope in std::iter::once(el).chain(doc.ancestors(el).take(ENRICH_DEPTH)) {
            for category in lexicon.categories_in(&scope.text.to_lowercase()) {
                if found.len() == MAX_ENRICH_CATEGORIES {
                    return found;
                }
                if !found.iter().any(|f| f == category) {
                    found.push(category.to_string());
                }
            }
        }
        found
    }
}

/// Drop candidates whose text contains, or is contained in, a higher-scoring
/// one. Ties keep the earlier candidate. Output stays in document order.
fn deoverlap(candidates: Vec<CandidateText>) -> Vec<CandidateText> {
    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.sort_by_key(|&i| std::cmp::Reverse(candidates[i].score));

    let mut kept: Vec<usize> = Vec::new();
    for i in order {
        if !kept.iter().any(|&k| candidates[k].overlaps(&candidates[i])) {
            kept.push(i);
        }
    }
    kept.sort_unstable();

    let mut slots: Vec<Option<CandidateText>> = candidates.into_iter().map(Some).collect();
    kept.into_iter().filter_map(|i| slots[i].take()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{Lexicon, ScoringPolicy};

    fn extractor() -> DealExtractor {
        let scorer =
            ContentScorer::new(Arc::new(Lexicon::default()), ScoringPolicy::default()).unwrap();
        DealExtractor::new(Arc::new(scorer))
    }

    fn url() -> Url {
        Url::parse("https://kauppa.example/").unwrap()
    }

    #[test]
    fn test_promo_heading_becomes_deal() {
        let doc = Document::parse(r#"<body><h2 class="promo">Kesäale jopa -50%</h2></body>"#);
        let deals = extractor().extract(&doc, "kauppa", &url());
        assert_eq!(deals.len(), 1);
        assert_eq!(deals[0].percentage.as_deref(), Some("50%"));
        assert!(deals[0].description.contains("Kesäale"));
        assert_eq!(deals[0].url, "https://kauppa.example/");
        assert_eq!(deals[0].site_id, "kauppa");
    }

    #[test]
    fn test_navigation_and_footer_ignored() {
        let doc = Document::parse(
            r#"<body><nav><h3>Sale -30%</h3></nav>
            <footer><div class="promo">Outlet -40%</div></footer>
            <main><h1>Uusi mallisto</h1></main></body>"#,
        );
        assert!(extractor().extract(&doc, "kauppa", &url()).is_empty());
    }

    #[test]
    fn test_false_positive_heading_vetoed() {
        let doc = Document::parse(
            r#"<h2>Lahjakortti -20% alennuksella</h2><h2 class="banner">Terms of sale</h2>"#,
        );
        assert!(extractor().extract(&doc, "kauppa", &url()).is_empty());
    }

    #[test]
    fn test_product_card_requires_price_pairing() {
        let doc = Document::parse(
            r#"<div class="product-card"><p>Villakangastakki</p><p>89,95 €</p></div>
            <div class="product-tile"><p>Neuletakki -30%</p><del>79,95 €</del><p>55,95 €</p></div>"#,
        );
        let candidates = extractor().candidates(&doc);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].location, SourceLocation::ProductCard);
        assert_eq!(candidates[0].percentage, Some(30));
    }

    #[test]
    fn test_overlapping_candidates_keep_stronger() {
        let doc = Document::parse(
            r#"<section class="campaign-hero"><h2>Talviale</h2><p>Kaikki takit -40%</p></section>"#,
        );
        let candidates = extractor().candidates(&doc);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].location, SourceLocation::PromoContainer);
        assert!(candidates[0].text.contains("Talviale"));
        assert_eq!(candidates[0].percentage, Some(40));
    }

    #[test]
    fn test_short_label_enriched_with_categories() {
        let mut builder = Document::builder();
        builder
            .open(Element::new("div"))
            .leaf(Element::new("h2").with_text("Sale"))
            .leaf(Element::new("p").with_text("Mekot ja kengät nyt edullisesti"))
            .close();
        let doc = builder.build();

        let deals = extractor().extract(&doc, "kauppa", &url());
        assert_eq!(deals.len(), 1);
        assert_eq!(deals[0].description, "Sale: mekot, kengät");
        assert_eq!(deals[0].percentage, None);
    }

    #[test]
    fn test_bare_finnish_keyword_enriched() {
        for label in ["ALE", "Ale"] {
            let doc = Document::parse(&format!(
                "<div><h2>{label}</h2><p>Mekot ja kengät nyt edullisesti</p></div>"
            ));
            let deals = extractor().extract(&doc, "kauppa", &url());
            assert_eq!(deals.len(), 1, "{label}");
            assert_eq!(deals[0].description, format!("{label}: mekot, kengät"));
        }
    }

    #[test]
    fn test_bare_label_without_categories_dropped() {
        let doc = Document::parse("<div><h2>Sale</h2><p>Tervetuloa</p></div>");
        assert!(extractor().candidates(&doc).is_empty());
    }

    #[test]
    fn test_title_case_promotion_accepted() {
        let doc = Document::parse("<h2>Black Friday Sale</h2>");
        let deals = extractor().extract(&doc, "kauppa", &url());
        assert_eq!(deals.len(), 1);
        assert_eq!(deals[0].description, "Black Friday Sale");
    }

    #[test]
    fn test_enrichment_capped_at_three() {
        let mut builder = Document::builder();
        builder
            .open(Element::new("div"))
            .leaf(Element::new("h3").with_text("Outlet"))
            .leaf(Element::new("p").with_text("mekot takit kengät farkut laukut"))
            .close();
        let candidates = extractor().candidates(&builder.build());
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].categories.len(), 3);
    }

    #[test]
    fn test_title_fallback_prefers_h1_and_filters_denylist() {
        let e = extractor();
        let doc = Document::parse(
            "<html><head><title>Outlet | Kauppa</title></head><body><h1>Outlet-tuotteet</h1></body></html>",
        );
        let deal = e.title_fallback(&doc, "kauppa", &url()).unwrap();
        assert_eq!(deal.description, "Outlet-tuotteet");

        let doc = Document::parse("<title>Asiakaspalvelu</title><p>x</p>");
        assert!(e.title_fallback(&doc, "kauppa", &url()).is_none());
    }

    #[test]
    fn test_empty_document() {
        let doc = Document::parse("");
        assert!(extractor().extract(&doc, "kauppa", &url()).is_empty());
    }
}
