// Context booster — rewards matched keywords that sit close together.
//
// Occurrences are located with the same non-overlapping, left-to-right scan
// the layer scorer uses for its frequency count, so "how many times does
// this keyword occur" has one answer everywhere. Offsets and the window are
// measured in characters.

use crate::taxonomy::models::MatchingParameters;

/// Upper bound on the multiplicative boost.
pub const MAX_BOOST: f64 = 2.0;

/// One occurrence of a matched keyword, in character offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeywordSpan {
    /// Index into the keyword slice passed to `find_keyword_positions`.
    pub keyword: usize,
    pub start: usize,
    pub end: usize,
}

/// Find every occurrence of every keyword in already lower-cased content,
/// sorted by start offset (ties keep keyword order).
pub fn find_keyword_positions<S: AsRef<str>>(
    content_lower: &str,
    keywords: &[S],
) -> Vec<KeywordSpan> {
    // Byte offset of each char, for converting match offsets to char offsets.
    let char_starts: Vec<usize> = content_lower.char_indices().map(|(b, _)| b).collect();
    let to_char = |byte: usize| char_starts.binary_search(&byte).unwrap_or_else(|i| i);

    let mut spans = Vec::new();
    for (idx, keyword) in keywords.iter().enumerate() {
        let keyword = keyword.as_ref();
        if keyword.is_empty() {
            continue;
        }
        let len = keyword.chars().count();
        for (byte, _) in content_lower.match_indices(keyword) {
            let start = to_char(byte);
            spans.push(KeywordSpan {
                keyword: idx,
                start,
                end: start + len,
            });
        }
    }

    spans.sort_by_key(|s| s.start);
    spans
}

/// Proximity statistics over a sorted span list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Proximity {
    pub nearby_pairs: usize,
    pub clusters: usize,
}

/// Count nearby adjacent pairs and clusters of three or more.
pub fn proximity(spans: &[KeywordSpan], window: usize) -> Proximity {
    let window = window as i64;
    let mut stats = Proximity::default();
    let mut run = 1;

    for pair in spans.windows(2) {
        // Negative when spans of different keywords overlap; still "nearby".
        let gap = pair[1].start as i64 - pair[0].end as i64;
        if gap <= window {
            stats.nearby_pairs += 1;
            run += 1;
        } else {
            if run >= 3 {
                stats.clusters += 1;
            }
            run = 1;
        }
    }
    if run >= 3 {
        stats.clusters += 1;
    }

    stats
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContextBooster {
    pub window: usize,
    pub nearby_factor: f64,
    pub cluster_factor: f64,
}

impl ContextBooster {
    pub fn from_params(params: &MatchingParameters) -> Self {
        Self {
            window: params.context_window_size,
            nearby_factor: params.boost_factor_nearby,
            cluster_factor: params.boost_factor_cluster,
        }
    }

    /// Boost factor in [1.0, 2.0] for the matched keywords of one layer.
    pub fn boost<S: AsRef<str>>(&self, content: &str, matched: &[S]) -> f64 {
        self.boost_lowercased(&content.to_lowercase(), matched)
    }

    pub(crate) fn boost_lowercased<S: AsRef<str>>(
        &self,
        content_lower: &str,
        matched: &[S],
    ) -> f64 {
        if matched.len() < 2 || self.window == 0 {
            return 1.0;
        }

        let spans = find_keyword_positions(content_lower, matched);
        if spans.len() < 2 {
            return 1.0;
        }

        let stats = proximity(&spans, self.window);
        let mut boost = 1.0;
        if stats.nearby_pairs > 0 {
            boost *= 1.0 + stats.nearby_pairs as f64 * (self.nearby_factor - 1.0) * 0.1;
        }
        if stats.clusters > 0 {
            boost *= 1.0 + stats.clusters as f64 * (self.cluster_factor - 1.0) * 0.2;
        }

        boost.min(MAX_BOOST)
    }
}
