use once_cell::sync::Lazy;
use regex::Regex;

use crate::authors::names_match;
use crate::search::SearchCandidate;

/// Similarity a pair of titles must exceed to count as the same paper.
pub const TITLE_MATCH_THRESHOLD: f64 = 0.90;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Prepare a title for ratio scoring.
///
/// Only case and whitespace are folded; punctuation is left in place so it
/// counts as ordinary edits in the ratio.
pub fn normalize_title(title: &str) -> String {
    WHITESPACE_RE
        .replace_all(title.trim(), " ")
        .to_lowercase()
}

/// Normalized Indel similarity of two titles in `[0, 1]`.
pub fn title_similarity(title_a: &str, title_b: &str) -> f64 {
    let norm_a = normalize_title(title_a);
    let norm_b = normalize_title(title_b);
    rapidfuzz::fuzz::ratio(norm_a.chars(), norm_b.chars())
}

/// Check if two titles match using fuzzy comparison (strictly above 90%).
pub fn titles_match(title_a: &str, title_b: &str) -> bool {
    if title_a.trim().is_empty() || title_b.trim().is_empty() {
        return false;
    }
    title_similarity(title_a, title_b) > TITLE_MATCH_THRESHOLD
}

/// Whether a search result row is the paper described by the query.
///
/// Both the title and the first author must agree.
pub fn candidate_matches(title: &str, first_author: &str, candidate: &SearchCandidate) -> bool {
    titles_match(title, &candidate.title) && names_match(first_author, &candidate.first_author)
}
