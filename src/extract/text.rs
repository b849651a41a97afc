//! Text cleaning and matching helpers shared by the heuristics.

/// Maximum characters kept in a deal description.
pub const MAX_DESCRIPTION_CHARS: usize = 200;

/// Collapse runs of whitespace into single spaces and trim.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Collapse whitespace and cap to `max_chars`, cutting at a word boundary
/// when one is available in the last quarter of the allowance.
pub fn clean_text(s: &str, max_chars: usize) -> String {
    let collapsed = collapse_whitespace(s);
    if collapsed.chars().count() <= max_chars {
        return collapsed;
    }

    let cut: String = collapsed.chars().take(max_chars).collect();
    let min_keep = max_chars - max_chars / 4;
    match cut.rfind(' ') {
        Some(idx) if cut[..idx].chars().count() >= min_keep => cut[..idx].trim_end().to_string(),
        _ => cut.trim_end().to_string(),
    }
}

/// Normalized description prefix used as a deduplication key.
///
/// Lowercased, whitespace collapsed, surrounding punctuation removed.
pub fn dedup_key(s: &str, prefix_chars: usize) -> String {
    let lowered = collapse_whitespace(&s.to_lowercase());
    lowered
        .trim_matches(|c: char| !c.is_alphanumeric())
        .chars()
        .take(prefix_chars)
        .collect()
}

/// Alphanumeric words of `s`, in order.
pub fn words(s: &str) -> impl Iterator<Item = &str> {
    s.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty())
}

/// Whether `phrase` occurs in `haystack` delimited by non-alphanumeric
/// characters (or the string edges). Both inputs should be lowercase.
pub fn contains_phrase(haystack: &str, phrase: &str) -> bool {
    if phrase.is_empty() {
        return false;
    }
    let mut start = 0;
    while let Some(pos) = haystack[start..].find(phrase) {
        let begin = start + pos;
        let end = begin + phrase.len();
        let before_ok = haystack[..begin]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let after_ok = haystack[end..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric());
        if before_ok && after_ok {
            return true;
        }
        start = begin
            + haystack[begin..]
                .chars()
                .next()
                .map_or(1, |c| c.len_utf8());
    }
    false
}

/// Whether a word starts with an uppercase letter followed by lowercase ones.
pub fn is_capitalized(word: &str) -> bool {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) if first.is_uppercase() => chars.all(|c| !c.is_uppercase()),
        _ => false,
    }
}
