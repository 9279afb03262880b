// Classifier — scores content against every enabled industry and picks labels.
//
// Selection: keep industries at or above the low-confidence threshold, sort
// by score (ties keep configured order), cut to the per-article cap, then
// take every high-confidence industry. A low-confidence industry only makes
// it in as the single best candidate when nothing cleared the high bar.
//
// The classifier is immutable after construction and `Send + Sync`, so one
// instance behind an `Arc` serves every worker in a batch run.

use serde::Serialize;
use tracing::debug;

use crate::scoring::aggregate::{aggregate, LayerScores};
use crate::scoring::cache::ScoreCache;
use crate::scoring::layer::{LayerScore, LayerScorer};
use crate::scoring::rules::apply_special_rules;
use crate::taxonomy::models::{IndustryProfile, Layer, MatchingParameters, Thresholds};
use crate::taxonomy::traits::ParameterProvider;

/// Where a score falls relative to the confidence thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Confidence {
    None,
    Low,
    High,
}

impl Confidence {
    pub fn from_score(score: f64, thresholds: &Thresholds) -> Self {
        if score >= thresholds.high_confidence {
            Confidence::High
        } else if score >= thresholds.low_confidence {
            Confidence::Low
        } else {
            Confidence::None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::None => "none",
            Confidence::Low => "low",
            Confidence::High => "high",
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A selected label with its score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndustryMatch {
    pub industry_id: String,
    pub display_name: String,
    pub score: f64,
    pub confidence: Confidence,
}

/// Every intermediate value behind one industry's score.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreBreakdown {
    pub industry_id: String,
    pub display_name: String,
    pub layers: Vec<(Layer, LayerScore)>,
    pub layer_scores: LayerScores,
    pub aggregate: f64,
    pub adjusted: f64,
    pub confidence: Confidence,
}

pub struct Classifier {
    profiles: Vec<IndustryProfile>,
    params: MatchingParameters,
    scorer: LayerScorer,
    cache: ScoreCache,
}

impl Classifier {
    /// Snapshot the provider's enabled industries and parameters.
    pub fn new(provider: &dyn ParameterProvider, cache: ScoreCache) -> Self {
        let params = provider.matching_parameters().clone();
        let profiles = provider
            .enabled_industries()
            .iter()
            .filter_map(|id| provider.industry_profile(id).cloned())
            .collect();

        Self {
            scorer: LayerScorer::new(&params),
            profiles,
            params,
            cache,
        }
    }

    pub fn industries(&self) -> &[IndustryProfile] {
        &self.profiles
    }

    pub fn cache(&self) -> &ScoreCache {
        &self.cache
    }

    /// Labels for the content, strongest first. Possibly empty.
    pub fn classify(&self, content: &str) -> Vec<String> {
        self.classify_scored(content)
            .into_iter()
            .map(|m| m.display_name)
            .collect()
    }

    /// Like `classify`, keeping ids and scores.
    pub fn classify_scored(&self, content: &str) -> Vec<IndustryMatch> {
        if content.is_empty() || self.profiles.is_empty() {
            return Vec::new();
        }

        let thresholds = &self.params.thresholds;
        let mut candidates: Vec<(&IndustryProfile, f64)> = self
            .profiles
            .iter()
            .map(|profile| (profile, self.cached_score(content, profile)))
            .filter(|(_, score)| *score >= thresholds.low_confidence)
            .collect();

        // Stable sort: equal scores keep configured order.
        candidates.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        candidates.truncate(self.params.max_industries_per_article);

        let mut selected: Vec<IndustryMatch> = Vec::new();
        for (profile, score) in candidates {
            let admit = score >= thresholds.high_confidence
                || (selected.is_empty() && score >= thresholds.low_confidence);
            if !admit || selected.iter().any(|m| m.display_name == profile.display_name) {
                continue;
            }
            selected.push(IndustryMatch {
                industry_id: profile.id.clone(),
                display_name: profile.display_name.clone(),
                score,
                confidence: Confidence::from_score(score, thresholds),
            });
        }

        if !selected.is_empty() {
            debug!(
                labels = ?selected.iter().map(|m| m.industry_id.as_str()).collect::<Vec<_>>(),
                "Selected industries"
            );
        }
        selected
    }

    /// Final score of one industry. Unknown or disabled industries score 0.
    pub fn score_industry(&self, content: &str, industry_id: &str) -> f64 {
        match self.profile(industry_id) {
            Some(profile) => self.cached_score(content, profile),
            None => 0.0,
        }
    }

    /// Full breakdown for one industry, bypassing the cache.
    pub fn explain(&self, content: &str, industry_id: &str) -> Option<ScoreBreakdown> {
        let profile = self.profile(industry_id)?;
        Some(self.breakdown(content, profile))
    }

    fn profile(&self, industry_id: &str) -> Option<&IndustryProfile> {
        self.profiles.iter().find(|p| p.id == industry_id)
    }

    fn cached_score(&self, content: &str, profile: &IndustryProfile) -> f64 {
        self.cache.get_or_compute(content, &profile.id, || {
            self.breakdown(content, profile).adjusted
        })
    }

    fn breakdown(&self, content: &str, profile: &IndustryProfile) -> ScoreBreakdown {
        let content_lower = content.to_lowercase();

        let mut layers = Vec::with_capacity(Layer::ALL.len());
        let mut layer_scores = LayerScores::default();
        for layer in Layer::ALL {
            let detail = self
                .scorer
                .score_lowercased(&content_lower, profile.terms.layer(layer).as_slice());
            layer_scores.set(layer, detail.score);
            layers.push((layer, detail));
        }

        let total = aggregate(&layer_scores, &self.params.layer_weights);
        let adjusted = apply_special_rules(content, total, &profile.rules).clamp(0.0, 1.0);

        ScoreBreakdown {
            industry_id: profile.id.clone(),
            display_name: profile.display_name.clone(),
            layers,
            layer_scores,
            aggregate: total,
            adjusted,
            confidence: Confidence::from_score(adjusted, &self.params.thresholds),
        }
    }
}
