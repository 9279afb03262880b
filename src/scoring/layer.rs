// Layer scorer — scores one keyword layer against one piece of content.
//
// score = min((match_quality * 0.4 + frequency_score * 0.6 + high_value_bonus)
//             * context_boost, 1.0)
//
// where match_quality saturates at 10 distinct matched keywords, the
// frequency score at 15 total occurrences, and the high-value bonus at two
// curated keywords (0.3 each).

use std::collections::HashSet;

use serde::Serialize;

use super::context::ContextBooster;
use super::similarity::similarity_ratio;
use crate::taxonomy::models::MatchingParameters;

/// Matched keywords needed for a full match-quality score.
const QUALITY_SATURATION: f64 = 10.0;
/// Total occurrences needed for a full frequency score.
const FREQUENCY_SATURATION: f64 = 15.0;
const HIGH_VALUE_STEP: f64 = 0.3;
const HIGH_VALUE_CAP: f64 = 0.6;
/// Tokens and keywords shorter than this never fuzzy-match.
const FUZZY_MIN_CHARS: usize = 3;

/// Result of scoring one layer, with the evidence behind it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LayerScore {
    pub score: f64,
    pub matched: Vec<String>,
    pub total_frequency: usize,
    pub high_value_matches: usize,
    pub context_boost: f64,
}

pub struct LayerScorer {
    min_frequency: usize,
    fuzzy_threshold: f64,
    high_value: HashSet<String>,
    booster: ContextBooster,
}

impl LayerScorer {
    pub fn new(params: &MatchingParameters) -> Self {
        Self {
            min_frequency: params.min_keyword_frequency.max(1),
            fuzzy_threshold: params.thresholds.fuzzy_similarity,
            high_value: params.high_value_keywords.clone(),
            booster: ContextBooster::from_params(params),
        }
    }

    /// Score in [0, 1]. Empty content or an empty layer scores 0.
    pub fn score(&self, content: &str, keywords: &[String]) -> f64 {
        self.score_detailed(content, keywords).score
    }

    pub fn score_detailed(&self, content: &str, keywords: &[String]) -> LayerScore {
        if keywords.is_empty() || content.is_empty() {
            return LayerScore::default();
        }
        let content_lower = content.to_lowercase();
        self.score_lowercased(&content_lower, keywords)
    }

    /// Same as `score_detailed` for callers that already lower-cased the
    /// content once for several layers.
    pub(crate) fn score_lowercased(&self, content_lower: &str, keywords: &[String]) -> LayerScore {
        if keywords.is_empty() || content_lower.is_empty() {
            return LayerScore::default();
        }

        let tokens: Vec<&str> = content_lower
            .split_whitespace()
            .filter(|t| t.chars().count() >= FUZZY_MIN_CHARS)
            .collect();

        let mut result = LayerScore::default();
        for keyword in keywords {
            if keyword.is_empty() {
                continue;
            }

            let exact = content_lower.matches(keyword.as_str()).count();
            let occurrences = if exact >= self.min_frequency {
                exact
            } else if self.fuzzy_match(&tokens, keyword) {
                1
            } else {
                continue;
            };

            result.total_frequency += occurrences;
            if self.high_value.contains(keyword) {
                result.high_value_matches += 1;
            }
            result.matched.push(keyword.clone());
        }

        if result.matched.is_empty() {
            return result;
        }

        let match_quality = (result.matched.len() as f64 / QUALITY_SATURATION).min(1.0);
        let frequency_score = (result.total_frequency as f64 / FREQUENCY_SATURATION).min(1.0);
        let high_value_bonus =
            (result.high_value_matches as f64 * HIGH_VALUE_STEP).min(HIGH_VALUE_CAP);
        let base = match_quality * 0.4 + frequency_score * 0.6 + high_value_bonus;

        result.context_boost = self.booster.boost_lowercased(content_lower, &result.matched);
        result.score = (base * result.context_boost).clamp(0.0, 1.0);
        result
    }

    fn fuzzy_match(&self, tokens: &[&str], keyword: &str) -> bool {
        if keyword.chars().count() < FUZZY_MIN_CHARS {
            return false;
        }
        tokens
            .iter()
            .any(|token| similarity_ratio(token, keyword) >= self.fuzzy_threshold)
    }
}
