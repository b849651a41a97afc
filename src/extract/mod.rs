//! Heuristics that turn raw markup into candidate deals and sale links.

pub mod deals;
pub mod document;
pub mod lexicon;
pub mod links;
pub mod percentage;
pub mod scorer;
pub mod text;

pub use deals::{CandidateText, DealExtractor};
pub use document::{Document, DocumentBuilder, Element, Role};
pub use lexicon::Lexicon;
pub use links::{LinkDiscoverer, SaleLink};
pub use percentage::PercentageDetector;
pub use scorer::{ContentScorer, ScoreBreakdown, ScoringPolicy, SourceLocation};

use std::sync::Arc;

/// Extractor and discoverer sharing one lexicon and scoring policy.
#[derive(Debug, Clone)]
pub struct Heuristics {
    pub deals: DealExtractor,
    pub links: LinkDiscoverer,
}

impl Heuristics {
    pub fn new(lexicon: Lexicon, policy: ScoringPolicy) -> Result<Self, regex::Error> {
        let lexicon = Arc::new(lexicon);
        let scorer = Arc::new(ContentScorer::new(lexicon.clone(), policy)?);
        Ok(Self {
            deals: DealExtractor::new(scorer),
            links: LinkDiscoverer::new(lexicon)?,
        })
    }

    pub fn scorer(&self) -> &ContentScorer {
        self.deals.scorer()
    }

    pub fn lexicon(&self) -> &Lexicon {
        self.scorer().lexicon()
    }
}
