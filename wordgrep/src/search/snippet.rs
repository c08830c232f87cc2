use std::ops::Range;

use crate::results::Match;

/// Characters of context kept on each side of an occurrence
pub const DEFAULT_CONTEXT_RADIUS: usize = 50;

/// Finds every non-overlapping occurrence of `pattern` in `text` and returns a
/// snippet of [`DEFAULT_CONTEXT_RADIUS`] characters of context around each.
pub fn search(text: &str, pattern: &str) -> Vec<Match> {
    search_with_radius(text, pattern, DEFAULT_CONTEXT_RADIUS)
}

/// Like [`search`], with `radius` characters of context on each side.
///
/// Occurrences are reported left to right. After a hit at `i` scanning resumes
/// at `i + pattern.len()`, so in `"aaaa"` the pattern `"aa"` matches twice, not
/// three times. An empty pattern matches nothing.
pub fn search_with_radius(text: &str, pattern: &str, radius: usize) -> Vec<Match> {
    if pattern.is_empty() {
        return Vec::new();
    }

    text.match_indices(pattern)
        .map(|(start, matched)| {
            let window = context_window(text, start..start + matched.len(), radius);
            Match::new(clean_snippet(&text[window]))
        })
        .collect()
}

/// Byte range covering `radius` chars before and after `occurrence`, clamped
/// to the text. Counting in chars keeps the range on UTF-8 boundaries.
pub(crate) fn context_window(text: &str, occurrence: Range<usize>, radius: usize) -> Range<usize> {
    let start = if radius == 0 {
        occurrence.start
    } else {
        text[..occurrence.start]
            .char_indices()
            .rev()
            .nth(radius - 1)
            .map_or(0, |(i, _)| i)
    };
    let end = text[occurrence.end..]
        .char_indices()
        .nth(radius)
        .map_or(text.len(), |(i, _)| occurrence.end + i);
    start..end
}

/// Drops carriage returns and surrounding whitespace
fn clean_snippet(window: &str) -> String {
    window.replace('\r', "").trim().to_string()
}
