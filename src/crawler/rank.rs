//! Deduplication and ranking of one site's deals.

use std::collections::HashSet;

use crate::extract::text::dedup_key;
use crate::extract::Lexicon;
use crate::models::{sort_percentage_first, Deal};

/// Drop repeats keyed by (site, normalized description prefix); the first
/// occurrence wins. Descriptions that normalize to a bare label such as
/// "sale" are dropped outright.
pub fn dedup(deals: Vec<Deal>, lexicon: &Lexicon, prefix_chars: usize) -> Vec<Deal> {
    let mut seen: HashSet<(String, String)> = HashSet::new();
    deals
        .into_iter()
        .filter(|deal| {
            let full = dedup_key(&deal.description, usize::MAX);
            if full.is_empty() || lexicon.is_bare_label(&full) {
                return false;
            }
            let key = full.chars().take(prefix_chars).collect::<String>();
            seen.insert((deal.site_id.clone(), key))
        })
        .collect()
}

/// Percentage-carrying deals first (stable), then cap at `max`.
pub fn rank_and_limit(mut deals: Vec<Deal>, max: usize) -> Vec<Deal> {
    sort_percentage_first(&mut deals);
    deals.truncate(max);
    deals
}

/// Dedup, rank and cap.
pub fn finalize(deals: Vec<Deal>, lexicon: &Lexicon, prefix_chars: usize, max: usize) -> Vec<Deal> {
    rank_and_limit(dedup(deals, lexicon, prefix_chars), max)
}
