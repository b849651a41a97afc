//! Discount percentage detection.

use std::ops::RangeInclusive;

use regex::Regex;

/// Plausible range for a clearance discount. Values outside it are misfires
/// such as "100% cotton" or page-load counters.
pub const DEFAULT_PERCENT_RANGE: RangeInclusive<u8> = 5..=90;

/// Ordered set of percentage patterns.
///
/// Patterns are tried in order; within a pattern, matches are scanned left
/// to right. The first in-range value wins.
#[derive(Debug, Clone)]
pub struct PercentageDetector {
    patterns: Vec<Regex>,
    range: RangeInclusive<u8>,
}

impl PercentageDetector {
    /// Compile patterns. Each must have the number as its first capture group.
    pub fn new(patterns: &[String], range: RangeInclusive<u8>) -> Result<Self, regex::Error> {
        let patterns = patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns, range })
    }

    /// Detect a discount percentage in `text`.
    pub fn detect(&self, text: &str) -> Option<u8> {
        for pattern in &self.patterns {
            for caps in pattern.captures_iter(text) {
                let Some(value) = caps.get(1).and_then(|m| m.as_str().parse::<u16>().ok()) else {
                    continue;
                };
                if let Ok(value) = u8::try_from(value) {
                    if self.range.contains(&value) {
                        return Some(value);
                    }
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::Lexicon;

    fn detector() -> PercentageDetector {
        PercentageDetector::new(&Lexicon::default().percentage_patterns, DEFAULT_PERCENT_RANGE)
            .unwrap()
    }

    #[test]
    fn test_detects_common_phrasings() {
        let d = detector();
        assert_eq!(d.detect("Kesäale jopa -50%"), Some(50));
        assert_eq!(d.detect("30% off everything"), Some(30));
        assert_eq!(d.detect("Up to 70 % off"), Some(70));
        assert_eq!(d.detect("Säästä 25%"), Some(25));
        assert_eq!(d.detect("Kaikki takit -40 %"), Some(40));
        assert_eq!(d.detect("20 % alennusta"), Some(20));
    }

    #[test]
    fn test_rejects_out_of_range() {
        let d = detector();
        assert_eq!(d.detect("500% cotton"), None);
        assert_eq!(d.detect("100% merino wool"), None);
        assert_eq!(d.detect("Loading 3%"), None);
        assert_eq!(d.detect("1500%"), None);
    }

    #[test]
    fn test_priority_order_beats_position() {
        let d = detector();
        // The bare "10%" appears first, but "60% off" matches a higher-priority pattern.
        assert_eq!(d.detect("10% of proceeds donated, up to 60% off"), Some(60));
    }

    #[test]
    fn test_skips_out_of_range_match_within_pattern() {
        let d = detector();
        assert_eq!(d.detect("100% organic, now 30%"), Some(30));
    }

    #[test]
    fn test_no_percentage() {
        assert_eq!(detector().detect("Uusi mallisto saapunut"), None);
    }

    #[test]
    fn test_invalid_pattern_is_error() {
        assert!(PercentageDetector::new(&["(".to_string()], DEFAULT_PERCENT_RANGE).is_err());
    }
}
