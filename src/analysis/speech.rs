//! Pacing and filler-word analysis of finalized transcript segments.

/// Words counted as fillers when a token matches exactly (lowercased).
///
/// "you know" is a two-token phrase and can never match a single token under
/// this comparison; the behavior is pinned by a regression test.
pub const FILLER_WORDS: &[&str] = &["um", "uh", "like", "you know", "so"];

/// Analysis of one finalized segment against the elapsed recording time
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentAnalysis {
    /// Words in the segment
    pub word_count: usize,
    /// Words per minute over the elapsed recording time
    pub pacing_wpm: f64,
    /// Filler tokens in the segment
    pub filler_count: usize,
}

/// Split a segment on single spaces, discarding empty tokens.
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split(' ').filter(|w| !w.trim().is_empty()).collect()
}

/// Count tokens whose lowercase form exactly matches a filler word.
pub fn count_fillers<'a>(tokens: impl IntoIterator<Item = &'a str>) -> usize {
    tokens
        .into_iter()
        .filter(|token| {
            let lowered = token.to_lowercase();
            FILLER_WORDS.contains(&lowered.as_str())
        })
        .count()
}

/// Words per minute with elapsed time below one second clamped to one second,
/// so a segment arriving at the very start never divides by zero.
pub fn pacing_wpm(word_count: usize, elapsed_seconds: u64) -> f64 {
    let elapsed_minutes = elapsed_seconds.max(1) as f64 / 60.0;
    word_count as f64 / elapsed_minutes
}

/// Analyze one finalized segment.
///
/// Pacing and filler count are derived from this segment's words only; the
/// report reflects the most recent segment rather than a re-scan of the
/// session history.
pub fn analyze_segment(text: &str, elapsed_seconds: u64) -> SegmentAnalysis {
    let tokens = tokenize(text);
    let word_count = tokens.len();

    SegmentAnalysis {
        word_count,
        pacing_wpm: pacing_wpm(word_count, elapsed_seconds),
        filler_count: count_fillers(tokens),
    }
}
