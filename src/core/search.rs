use similar::TextDiff;

pub const MAX_SUGGESTIONS: usize = 3;
pub const SIMILARITY_CUTOFF: f32 = 0.6;

/// Returns up to `limit` candidates whose character similarity to `word` is at
/// least `cutoff`, best match first. Comparison ignores case.
pub fn close_matches<'a, I>(word: &str, candidates: I, limit: usize, cutoff: f32) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let needle = word.to_lowercase();
    let mut scored: Vec<(f32, &str)> = candidates
        .into_iter()
        .filter_map(|candidate| {
            let hay = candidate.to_lowercase();
            let ratio = TextDiff::from_chars(needle.as_str(), hay.as_str()).ratio();
            (ratio >= cutoff).then_some((ratio, candidate))
        })
        .collect();

    // stable sort keeps catalog order among equal scores
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored
        .into_iter()
        .take(limit)
        .map(|(_, candidate)| candidate.to_string())
        .collect()
}
