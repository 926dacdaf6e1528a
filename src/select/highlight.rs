use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

/// Character positions in `label` fuzzily matching `query`.
///
/// Empty when the query is empty or does not match; the backend decides which
/// options match, this only drives highlighting.
pub fn match_indices(label: &str, query: &str) -> Vec<usize> {
    let query = query.trim();
    if query.is_empty() {
        return vec![];
    }

    let matcher = SkimMatcherV2::default().smart_case();
    matcher
        .fuzzy_indices(label, query)
        .map(|(_, indices)| indices)
        .unwrap_or_default()
}

/// Split `label` into runs of (text, matched) for rendering
pub fn highlight_segments(label: &str, indices: &[usize]) -> Vec<(String, bool)> {
    let mut segments: Vec<(String, bool)> = Vec::new();
    for (i, ch) in label.chars().enumerate() {
        let matched = indices.contains(&i);
        match segments.last_mut() {
            Some((text, last)) if *last == matched => text.push(ch),
            _ => segments.push((ch.to_string(), matched)),
        }
    }
    segments
}
