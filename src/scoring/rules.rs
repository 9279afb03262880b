// Special-rule adjuster — per-industry overrides applied after aggregation.
//
// Rules run in a fixed order (exclude, required pairs, context boost) and
// every matching entry compounds multiplicatively.

use tracing::debug;

use crate::taxonomy::models::SpecialRules;

pub const EXCLUDE_FACTOR: f64 = 0.3;
pub const PAIR_FACTOR: f64 = 1.2;
pub const CONTEXT_FACTOR: f64 = 1.1;

/// Adjust an industry's aggregate score. Capped at 1.0; an industry with
/// no rules gets its score back untouched.
pub fn apply_special_rules(content: &str, base_score: f64, rules: &SpecialRules) -> f64 {
    if rules.is_empty() {
        return base_score;
    }

    let content_lower = content.to_lowercase();
    let mut score = base_score;

    for word in &rules.exclude_keywords {
        if content_lower.contains(word.as_str()) {
            score *= EXCLUDE_FACTOR;
            debug!(exclude = %word, score, "Exclude rule applied");
        }
    }

    for (first, second) in &rules.required_pairs {
        if content_lower.contains(first.as_str()) && content_lower.contains(second.as_str()) {
            score *= PAIR_FACTOR;
            debug!(pair = ?(first, second), score, "Required pair rule applied");
        }
    }

    for word in &rules.context_boost_words {
        if content_lower.contains(word.as_str()) {
            score *= CONTEXT_FACTOR;
        }
    }

    score.min(1.0)
}
