// Raw taxonomy documents — the YAML shapes as written on disk.
//
// Every field is optional or defaulted so a partially written document still
// deserializes; structural validation happens afterwards in
// `IndustryDocument::into_profile`, which is where a missing section turns
// into an error.

use anyhow::{bail, Result};
use serde::Deserialize;
use serde_yaml::Value;
use tracing::warn;

use super::models::{
    normalize_keyword, DatabaseSettings, IndustryProfile, IndustryTerms, KeywordLayer,
    LayerWeights, MatchingParameters, PerformanceSettings, SpecialRules, Thresholds,
};

/// The global `main_config.yaml` document.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MainConfig {
    pub version: Option<String>,
    pub enabled_industries: Vec<String>,
    pub matching_config: MatchingConfigDocument,
    pub performance: PerformanceSettings,
    pub database: DatabaseSettings,
}

impl Default for MainConfig {
    fn default() -> Self {
        Self {
            version: Some("1.0.0".to_string()),
            enabled_industries: vec!["semiconductor".to_string()],
            matching_config: MatchingConfigDocument::default(),
            performance: PerformanceSettings::default(),
            database: DatabaseSettings::default(),
        }
    }
}

impl MainConfig {
    /// Enabled ids in document order, blanks and repeats removed.
    pub fn enabled_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();
        for id in &self.enabled_industries {
            let id = id.trim();
            if !id.is_empty() && !ids.iter().any(|seen| seen == id) {
                ids.push(id.to_string());
            }
        }
        ids
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MatchingConfigDocument {
    pub layer_weights: LayerWeights,
    pub thresholds: Thresholds,
    pub parameters: ParametersDocument,
    /// Replaces the built-in high-value vocabulary when present.
    pub high_value_keywords: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ParametersDocument {
    pub min_keyword_frequency: usize,
    pub max_industries_per_article: usize,
    pub context_window_size: usize,
    pub boost_factor_nearby: f64,
    pub boost_factor_cluster: f64,
}

impl Default for ParametersDocument {
    fn default() -> Self {
        let d = MatchingParameters::default();
        Self {
            min_keyword_frequency: d.min_keyword_frequency,
            max_industries_per_article: d.max_industries_per_article,
            context_window_size: d.context_window_size,
            boost_factor_nearby: d.boost_factor_nearby,
            boost_factor_cluster: d.boost_factor_cluster,
        }
    }
}

impl MatchingConfigDocument {
    /// Convert to scorer parameters, pulling out-of-range values back
    /// into their documented ranges.
    pub fn to_parameters(&self) -> MatchingParameters {
        let p = &self.parameters;
        let mut params = MatchingParameters {
            layer_weights: self.layer_weights,
            thresholds: Thresholds {
                high_confidence: unit_range("high_confidence", self.thresholds.high_confidence),
                low_confidence: unit_range("low_confidence", self.thresholds.low_confidence),
                fuzzy_similarity: unit_range("fuzzy_similarity", self.thresholds.fuzzy_similarity),
            },
            context_window_size: p.context_window_size,
            boost_factor_nearby: at_least_one("boost_factor_nearby", p.boost_factor_nearby),
            boost_factor_cluster: at_least_one("boost_factor_cluster", p.boost_factor_cluster),
            min_keyword_frequency: p.min_keyword_frequency.max(1),
            max_industries_per_article: p.max_industries_per_article.max(1),
            ..MatchingParameters::default()
        };

        if let Some(ref words) = self.high_value_keywords {
            params.high_value_keywords = words
                .iter()
                .map(|w| normalize_keyword(w))
                .filter(|w| !w.is_empty())
                .collect();
        }

        params
    }
}

fn unit_range(name: &str, value: f64) -> f64 {
    if !(0.0..=1.0).contains(&value) {
        warn!(threshold = name, value, "Threshold outside [0, 1], clamping");
    }
    value.clamp(0.0, 1.0)
}

fn at_least_one(name: &str, value: f64) -> f64 {
    if value < 1.0 {
        warn!(factor = name, value, "Boost factor below 1.0, using 1.0");
        return 1.0;
    }
    value
}

/// One `<industry_id>.yaml` document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IndustryDocument {
    pub industry_info: Option<IndustryInfo>,
    pub core_keywords: Option<Value>,
    pub technical_terms: Option<Value>,
    pub application_scenarios: Option<Value>,
    pub related_entities: Option<Value>,
    pub special_rules: SpecialRulesDocument,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IndustryInfo {
    pub name: Option<String>,
    pub priority: Option<i64>,
}

/// Rule lists stay untyped until `to_rules`, so a stray number or boolean
/// costs one entry instead of the whole document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SpecialRulesDocument {
    pub exclude_keywords: Value,
    pub required_pairs: Value,
    pub context_boost: Value,
}

impl SpecialRulesDocument {
    pub fn to_rules(&self) -> SpecialRules {
        let words = |value: &Value| -> Vec<String> {
            let mut flat = Vec::new();
            flatten_terms(value, &mut flat);
            flat.iter()
                .map(|w| normalize_keyword(w))
                .filter(|w| !w.is_empty())
                .collect()
        };

        let pairs: &[Value] = match &self.required_pairs {
            Value::Sequence(items) => items,
            Value::Null => &[],
            other => {
                warn!(entry = ?other, "Ignoring required_pairs that is not a list");
                &[]
            }
        };
        let required_pairs = pairs
            .iter()
            .filter_map(|pair| {
                let items: &[Value] = match pair {
                    Value::Sequence(items) => items,
                    _ => &[],
                };
                match items {
                    [Value::String(a), Value::String(b)] => {
                        let (a, b) = (normalize_keyword(a), normalize_keyword(b));
                        (!a.is_empty() && !b.is_empty()).then_some((a, b))
                    }
                    _ => {
                        warn!(pair = ?pair, "Ignoring required pair that is not two words");
                        None
                    }
                }
            })
            .collect();

        SpecialRules {
            exclude_keywords: words(&self.exclude_keywords),
            required_pairs,
            context_boost_words: words(&self.context_boost),
        }
    }
}

impl IndustryDocument {
    /// Validate the document and build a normalized profile.
    ///
    /// Fails when any keyword section or the `industry_info.name` is missing.
    pub fn into_profile(self, industry_id: &str) -> Result<IndustryProfile> {
        let info = match self.industry_info {
            Some(info) => info,
            None => bail!("industry {industry_id} is missing section: industry_info"),
        };
        let display_name = match info.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => bail!("industry {industry_id} is missing industry_info.name"),
        };

        let sections = [
            ("core_keywords", &self.core_keywords),
            ("technical_terms", &self.technical_terms),
            ("application_scenarios", &self.application_scenarios),
            ("related_entities", &self.related_entities),
        ];
        for (name, section) in sections {
            if section.is_none() {
                bail!("industry {industry_id} is missing section: {name}");
            }
        }

        let layer = |section: &Option<Value>| {
            let mut flat = Vec::new();
            if let Some(value) = section {
                flatten_terms(value, &mut flat);
            }
            KeywordLayer::new(flat)
        };

        Ok(IndustryProfile {
            id: industry_id.to_string(),
            display_name,
            priority: info.priority.unwrap_or(0),
            terms: IndustryTerms {
                core: layer(&self.core_keywords),
                technical: layer(&self.technical_terms),
                application: layer(&self.application_scenarios),
                entities: layer(&self.related_entities),
            },
            rules: self.special_rules.to_rules(),
        })
    }
}

/// Collect every string out of a category mapping, however deeply nested.
///
/// Non-string scalars are skipped: keyword lists are text, and a stray number
/// or boolean is a typo in the document rather than a keyword.
pub fn flatten_terms(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => out.push(s.clone()),
        Value::Sequence(items) => {
            for item in items {
                flatten_terms(item, out);
            }
        }
        Value::Mapping(map) => {
            for (_, v) in map {
                flatten_terms(v, out);
            }
        }
        Value::Tagged(tagged) => flatten_terms(&tagged.value, out),
        Value::Null => {}
        other => warn!(entry = ?other, "Skipping non-string keyword entry"),
    }
}
