//! Bilingual (Finnish/English, some Swedish) vocabulary driving the heuristics.
//!
//! Everything here is plain data so it can be extended per locale from the
//! `[lexicon]` config section without touching the scoring code.

use serde::{Deserialize, Serialize};

use super::text::{contains_phrase, words};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Keyword and pattern lists.
///
/// All entries are lowercase; matching is done against lowercased text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lexicon {
    /// Words and phrases that signal a sale or discount.
    pub sale_keywords: Vec<String>,
    /// Keywords that also match as the tail of a compound word
    /// ("kesäale", "talvialennus").
    pub compound_suffixes: Vec<String>,
    /// Ordinary words that happen to end with a compound suffix.
    pub non_sale_words: Vec<String>,
    /// Legal, account and service phrases that veto a candidate.
    pub false_positive_phrases: Vec<String>,
    /// Navigation affordances ("back", "shop all").
    pub navigation_phrases: Vec<String>,
    /// Clothing categories used to enrich terse descriptions.
    pub category_keywords: Vec<String>,
    /// Class/id fragments marking promotional containers.
    pub promo_class_hints: Vec<String>,
    /// Class/id fragments marking product cards.
    pub product_class_hints: Vec<String>,
    /// Class/id fragments marking a struck-through or previous price.
    pub old_price_class_hints: Vec<String>,
    /// (before, after) word pairs forming a was/now price pairing.
    pub was_now_pairs: Vec<(String, String)>,
    /// Words indicating a price is being quoted.
    pub price_words: Vec<String>,
    /// "Starting from" price qualifiers.
    pub from_price_phrases: Vec<String>,
    /// URL path segments of dedicated sale pages.
    pub sale_path_segments: Vec<String>,
    /// Descriptions too generic to surface on their own.
    pub bare_labels: Vec<String>,
    /// Percentage patterns in priority order; the first capture group is the number.
    pub percentage_patterns: Vec<String>,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self {
            sale_keywords: strings(&[
                "sale",
                "ale",
                "alennus",
                "alennukset",
                "alennusta",
                "alennusmyynti",
                "tarjous",
                "tarjoukset",
                "outlet",
                "loppuunmyynti",
                "tyhjennysmyynti",
                "kampanja",
                "kampanjat",
                "clearance",
                "discount",
                "discounts",
                "deals",
                "offers",
                "mid-season sale",
                "end of season",
                "final sale",
                "black friday",
                "cyber monday",
                "hullut päivät",
                "rea",
                "rabatt",
            ]),
            compound_suffixes: strings(&["ale", "alennus", "alennukset", "tarjous", "kampanja"]),
            non_sale_words: strings(&[
                "female", "male", "scale", "tale", "whale", "locale", "rationale", "finale",
                "pale", "stale", "gale", "kale", "bale", "dale", "yale", "vale", "hale", "inhale",
                "exhale", "resale",
            ]),
            false_positive_phrases: strings(&[
                "privacy",
                "privacy policy",
                "tietosuoja",
                "tietosuojaseloste",
                "terms",
                "terms of sale",
                "terms and conditions",
                "ehdot",
                "käyttöehdot",
                "toimitusehdot",
                "myyntiehdot",
                "cookie",
                "cookies",
                "eväste",
                "evästeet",
                "evästeasetukset",
                "returns",
                "return policy",
                "palautus",
                "palautukset",
                "careers",
                "jobs",
                "avoimet työpaikat",
                "rekrytointi",
                "newsletter",
                "uutiskirje",
                "tilaa uutiskirje",
                "login",
                "log in",
                "sign in",
                "sign up",
                "kirjaudu",
                "rekisteröidy",
                "my account",
                "oma tili",
                "gift card",
                "gift cards",
                "lahjakortti",
                "lahjakortit",
                "customer service",
                "asiakaspalvelu",
                "faq",
                "contact us",
                "ota yhteyttä",
                "accessibility",
                "saavutettavuus",
                "copyright",
                "all rights reserved",
                "shipping policy",
                "wholesale",
            ]),
            navigation_phrases: strings(&[
                "back",
                "takaisin",
                "shop all",
                "all categories",
                "kaikki kategoriat",
                "kaikki tuotteet",
                "view all",
                "see all",
                "näytä kaikki",
                "katso kaikki",
                "menu",
                "valikko",
                "close",
                "sulje",
                "next",
                "previous",
                "seuraava",
                "edellinen",
            ]),
            category_keywords: strings(&[
                "dresses",
                "mekot",
                "jackets",
                "takit",
                "coats",
                "shoes",
                "kengät",
                "jeans",
                "farkut",
                "trousers",
                "housut",
                "shirts",
                "paidat",
                "t-shirts",
                "knitwear",
                "neuleet",
                "sweaters",
                "skirts",
                "hameet",
                "accessories",
                "asusteet",
                "bags",
                "laukut",
                "sportswear",
                "urheiluvaatteet",
                "swimwear",
                "uima-asut",
                "underwear",
                "alusvaatteet",
                "women",
                "naiset",
                "men",
                "miehet",
                "kids",
                "lapset",
            ]),
            promo_class_hints: strings(&[
                "promo", "banner", "campaign", "kampanja", "offer", "sale", "discount", "tarjous",
                "hero", "deal",
            ]),
            product_class_hints: strings(&["product", "card", "tile", "item", "tuote"]),
            old_price_class_hints: strings(&[
                "old-price",
                "price-old",
                "price--old",
                "was-price",
                "price-was",
                "original-price",
                "compare",
                "strike",
                "before",
                "regular-price",
            ]),
            was_now_pairs: vec![
                ("was".to_string(), "now".to_string()),
                ("ennen".to_string(), "nyt".to_string()),
                ("norm.".to_string(), "nyt".to_string()),
                ("ord.".to_string(), "nu".to_string()),
            ],
            price_words: strings(&["hinta", "price", "pris", "ennen", "was"]),
            from_price_phrases: strings(&["alkaen", "alk.", "from", "starting at", "fr.", "från"]),
            sale_path_segments: strings(&[
                "sale",
                "ale",
                "outlet",
                "tarjous",
                "tarjoukset",
                "kampanja",
                "kampanjat",
                "clearance",
                "alennus",
                "alennukset",
                "loppuunmyynti",
                "offers",
                "deals",
            ]),
            bare_labels: strings(&["sale", "ale"]),
            percentage_patterns: strings(&[
                r"(?i)\b(\d{1,3})\s?%\s?(?:off|alennus\w*|ale)\b",
                r"(?i)\b(?:up to|jopa|yli|upp till)\s*[-−–]?\s*(\d{1,3})\s?%",
                r"(?i)\b(?:save|säästä|spara)\s*[-−–]?\s*(\d{1,3})\s?%",
                r"(?:^|[^\w])[-−–]\s?(\d{1,3})\s?%",
                r"\b(\d{1,3})\s?%",
            ]),
        }
    }
}

impl Lexicon {
    /// Whether lowercased `text` contains a sale keyword, either as a
    /// standalone word/phrase or as the tail of a compound word.
    pub fn has_sale_keyword(&self, lower: &str) -> bool {
        if self.sale_keywords.iter().any(|k| contains_phrase(lower, k)) {
            return true;
        }
        words(lower).any(|word| self.is_compound_sale_word(word))
    }

    fn is_compound_sale_word(&self, word: &str) -> bool {
        if self.non_sale_words.iter().any(|w| w == word) {
            return false;
        }
        self.compound_suffixes
            .iter()
            .any(|suffix| word.len() > suffix.len() && word.ends_with(suffix.as_str()))
    }

    /// Whether lowercased `text` contains any denylisted phrase.
    pub fn is_denied(&self, lower: &str) -> bool {
        self.false_positive_phrases
            .iter()
            .any(|p| contains_phrase(lower, p))
    }

    /// Whether lowercased `text` contains a navigation affordance phrase.
    pub fn has_navigation_phrase(&self, lower: &str) -> bool {
        self.navigation_phrases
            .iter()
            .any(|p| contains_phrase(lower, p))
    }

    /// Whether lowercased `text` is exactly one sale keyword, ignoring
    /// surrounding punctuation ("ALE!").
    pub fn is_sale_keyword(&self, lower: &str) -> bool {
        let bare = lower.trim_matches(|c: char| !c.is_alphanumeric());
        !bare.is_empty() && self.sale_keywords.iter().any(|k| k == bare)
    }

    /// Whether a single lowercased word is a category keyword.
    pub fn is_category_word(&self, word: &str) -> bool {
        self.category_keywords.iter().any(|k| k == word)
    }

    /// Category keywords found in lowercased `text`, in lexicon order.
    pub fn categories_in<'a>(&'a self, lower: &str) -> Vec<&'a str> {
        self.category_keywords
            .iter()
            .filter(|k| contains_phrase(lower, k))
            .map(|k| k.as_str())
            .collect()
    }

    /// Whether lowercased `text` contains a was/now price pairing.
    pub fn has_was_now_pair(&self, lower: &str) -> bool {
        self.was_now_pairs
            .iter()
            .any(|(was, now)| match lower.find(was.as_str()) {
                Some(idx) => contains_phrase(lower, was) && lower[idx..].contains(now.as_str()),
                None => false,
            })
    }

    /// Whether a description is nothing but a bare label such as "sale".
    pub fn is_bare_label(&self, normalized: &str) -> bool {
        self.bare_labels.iter().any(|l| l == normalized)
    }
}
