//! Discount signal scoring.
//!
//! Turns a cleaned text fragment into an integer score. Positive signals are
//! a plausible percentage (dominant), sale vocabulary, price notation, a
//! "from" qualifier and sentence-like shape. Penalties push out fragments that
//! are too short, look like navigation or a category menu, and anything on
//! the false-positive denylist, which vetoes outright.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::lexicon::Lexicon;
use super::percentage::PercentageDetector;
use super::text::{contains_phrase, is_capitalized, words};

/// Currency amounts: "€29", "29,95 €", "49 eur", "199 kr".
static PRICE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:[€$£]\s?\d{1,5}(?:[.,]\d{1,2})?|\b\d{1,5}(?:[.,]\d{1,2})?\s?(?:€|eur\b|euroa\b|kr\b|sek\b|\$|£))",
    )
    .unwrap()
});

/// Where in the page a candidate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceLocation {
    Heading,
    PromoContainer,
    ProductCard,
    LinkText,
}

impl SourceLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Heading => "heading",
            Self::PromoContainer => "promo-container",
            Self::ProductCard => "product-card",
            Self::LinkText => "link-text",
        }
    }
}

/// Weights and thresholds. Swappable as a unit; `version` labels the tuning.
///
/// Only the relative ordering matters: the percentage outweighs everything
/// else combined, and the false-positive penalty outweighs every positive
/// signal combined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringPolicy {
    pub version: String,
    pub percentage_weight: i32,
    pub keyword_weight: i32,
    pub price_weight: i32,
    pub from_price_weight: i32,
    pub sentence_weight: i32,
    pub sentence_min_chars: usize,
    pub min_chars: usize,
    pub short_penalty: i32,
    pub navigation_penalty: i32,
    pub navigation_max_chars: usize,
    pub category_menu_penalty: i32,
    pub false_positive_penalty: i32,
    /// Acceptance bar for headings, promo containers and link text.
    pub headline_threshold: i32,
    /// Acceptance bar for product cards, which misfire more often.
    pub product_card_threshold: i32,
    pub min_percent: u8,
    pub max_percent: u8,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            version: "v3".to_string(),
            percentage_weight: 50,
            keyword_weight: 20,
            price_weight: 10,
            from_price_weight: 5,
            sentence_weight: 5,
            sentence_min_chars: 20,
            min_chars: 4,
            short_penalty: 40,
            navigation_penalty: 25,
            navigation_max_chars: 30,
            category_menu_penalty: 25,
            false_positive_penalty: 1000,
            headline_threshold: 20,
            product_card_threshold: 50,
            min_percent: 5,
            max_percent: 90,
        }
    }
}

impl ScoringPolicy {
    pub fn threshold(&self, location: SourceLocation) -> i32 {
        match location {
            SourceLocation::ProductCard => self.product_card_threshold,
            SourceLocation::Heading | SourceLocation::PromoContainer | SourceLocation::LinkText => {
                self.headline_threshold
            }
        }
    }
}

/// Which features fired for a text, and the resulting score.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScoreBreakdown {
    pub percentage: Option<u8>,
    pub sale_keyword: bool,
    pub price: bool,
    pub from_price: bool,
    pub sentence_like: bool,
    pub too_short: bool,
    pub navigation: bool,
    pub category_menu: bool,
    pub false_positive: bool,
    pub total: i32,
}

/// Scores text fragments against a lexicon and policy.
#[derive(Debug, Clone)]
pub struct ContentScorer {
    lexicon: Arc<Lexicon>,
    policy: ScoringPolicy,
    percentages: PercentageDetector,
}

impl ContentScorer {
    pub fn new(lexicon: Arc<Lexicon>, policy: ScoringPolicy) -> Result<Self, regex::Error> {
        let percentages = PercentageDetector::new(
            &lexicon.percentage_patterns,
            policy.min_percent..=policy.max_percent,
        )?;
        Ok(Self {
            lexicon,
            policy,
            percentages,
        })
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    pub fn detect_percentage(&self, text: &str) -> Option<u8> {
        self.percentages.detect(text)
    }

    /// Pure denylist test.
    pub fn is_false_positive(&self, text: &str) -> bool {
        self.lexicon.is_denied(&text.to_lowercase())
    }

    pub fn score(&self, text: &str) -> i32 {
        self.breakdown(text).total
    }

    /// Whether `text` clears the bar for `location`.
    pub fn accepts(&self, text: &str, location: SourceLocation) -> bool {
        self.score(text) >= self.policy.threshold(location)
    }

    pub fn breakdown(&self, text: &str) -> ScoreBreakdown {
        let text = text.trim();
        let lower = text.to_lowercase();
        let chars = text.chars().count();
        let p = &self.policy;

        let mut b = ScoreBreakdown {
            percentage: self.percentages.detect(text),
            sale_keyword: self.lexicon.has_sale_keyword(&lower),
            price: PRICE_PATTERN.is_match(text)
                || self.lexicon.price_words.iter().any(|w| contains_phrase(&lower, w)),
            from_price: self
                .lexicon
                .from_price_phrases
                .iter()
                .any(|w| contains_phrase(&lower, w)),
            too_short: chars < p.min_chars && !self.lexicon.is_sale_keyword(&lower),
            navigation: chars <= p.navigation_max_chars
                && self.lexicon.has_navigation_phrase(&lower),
            false_positive: self.lexicon.is_denied(&lower),
            ..Default::default()
        };

        let alpha_words: Vec<&str> = words(text)
            .filter(|w| w.chars().any(char::is_alphabetic))
            .collect();
        let capitalized = alpha_words.iter().filter(|w| is_capitalized(w)).count();
        let lowercase_initial = alpha_words
            .iter()
            .filter(|w| w.chars().next().is_some_and(char::is_lowercase))
            .count();

        b.sentence_like = chars >= p.sentence_min_chars
            && alpha_words.len() >= 3
            && capitalized > 0
            && lowercase_initial > 0;
        let menu_words = alpha_words
            .iter()
            .filter(|w| is_capitalized(w) && self.lexicon.is_category_word(&w.to_lowercase()))
            .count();
        b.category_menu =
            b.percentage.is_none() && alpha_words.len() >= 3 && menu_words * 2 > alpha_words.len();

        let mut total = 0;
        if b.percentage.is_some() {
            total += p.percentage_weight;
        }
        if b.sale_keyword {
            total += p.keyword_weight;
        }
        if b.price {
            total += p.price_weight;
        }
        if b.from_price {
            total += p.from_price_weight;
        }
        if b.sentence_like {
            total += p.sentence_weight;
        }
        if b.too_short {
            total -= p.short_penalty;
        }
        if b.navigation {
            total -= p.navigation_penalty;
        }
        if b.category_menu {
            total -= p.category_menu_penalty;
        }
        if b.false_positive {
            total -= p.false_positive_penalty;
        }
        b.total = total;
        b
    }
}
