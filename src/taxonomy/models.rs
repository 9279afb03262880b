// Taxonomy models — the loaded, normalized shape of the keyword taxonomy.
//
// These are what the scorer reads. The raw YAML documents live in
// documents.rs; everything here is already lower-cased, trimmed and
// de-duplicated, so the scoring code never has to re-check it.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Curated cross-industry vocabulary that earns the high-value bonus.
///
/// Used when the global document doesn't set
/// `matching_config.high_value_keywords`.
pub const DEFAULT_HIGH_VALUE_KEYWORDS: &[&str] = &[
    // semiconductors
    "芯片", "半导体", "集成电路", "ic", "处理器", "cpu", "gpu",
    "制程", "工艺", "光刻", "euv", "晶圆", "封装", "测试",
    "台积电", "tsmc", "中芯国际", "smic",
    // gaming
    "游戏", "手游", "电竞", "游戏开发", "unity", "unreal",
    "腾讯游戏", "网易游戏", "米哈游", "王者荣耀", "原神",
    // artificial intelligence
    "人工智能", "ai", "机器学习", "深度学习", "神经网络",
    "大模型", "gpt", "chatgpt", "aigc", "openai",
    // fintech
    "金融科技", "fintech", "支付", "移动支付", "区块链",
    "数字货币", "比特币", "支付宝", "微信支付", "蚂蚁集团",
];

/// Lower-case and trim a keyword the way every layer stores it.
pub fn normalize_keyword(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// One of the four keyword layers, scored independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Layer {
    Core,
    Technical,
    Application,
    Entities,
}

impl Layer {
    pub const ALL: [Layer; 4] = [
        Layer::Core,
        Layer::Technical,
        Layer::Application,
        Layer::Entities,
    ];

    /// Section name in the industry document (and key in `layer_weights`).
    pub fn section(&self) -> &'static str {
        match self {
            Layer::Core => "core_keywords",
            Layer::Technical => "technical_terms",
            Layer::Application => "application_scenarios",
            Layer::Entities => "related_entities",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Layer::Core => "core",
            Layer::Technical => "technical",
            Layer::Application => "application",
            Layer::Entities => "entities",
        }
    }
}

impl std::fmt::Display for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Normalized, de-duplicated keyword list for one layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeywordLayer {
    keywords: Vec<String>,
}

impl KeywordLayer {
    /// Build a layer from raw strings. Blank entries are dropped and
    /// duplicates (after normalization) keep their first position.
    pub fn new<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let keywords = raw
            .into_iter()
            .map(|s| normalize_keyword(s.as_ref()))
            .filter(|k| !k.is_empty())
            .filter(|k| seen.insert(k.clone()))
            .collect();
        Self { keywords }
    }

    pub fn as_slice(&self) -> &[String] {
        &self.keywords
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

/// The four keyword layers of one industry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndustryTerms {
    pub core: KeywordLayer,
    pub technical: KeywordLayer,
    pub application: KeywordLayer,
    pub entities: KeywordLayer,
}

impl IndustryTerms {
    pub fn layer(&self, layer: Layer) -> &KeywordLayer {
        match layer {
            Layer::Core => &self.core,
            Layer::Technical => &self.technical,
            Layer::Application => &self.application,
            Layer::Entities => &self.entities,
        }
    }

    pub fn total_keywords(&self) -> usize {
        Layer::ALL.iter().map(|l| self.layer(*l).len()).sum()
    }
}

/// Per-industry overrides applied after base scoring.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpecialRules {
    /// Any of these present multiplies the score by 0.3.
    pub exclude_keywords: Vec<String>,
    /// Both words present multiplies the score by 1.2.
    pub required_pairs: Vec<(String, String)>,
    /// Each present word multiplies the score by 1.1.
    pub context_boost_words: Vec<String>,
}

impl SpecialRules {
    pub fn is_empty(&self) -> bool {
        self.exclude_keywords.is_empty()
            && self.required_pairs.is_empty()
            && self.context_boost_words.is_empty()
    }
}

/// A fully loaded industry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndustryProfile {
    pub id: String,
    pub display_name: String,
    pub priority: i64,
    pub terms: IndustryTerms,
    pub rules: SpecialRules,
}

/// Weight of each layer in the aggregate. Need not sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerWeights {
    pub core_keywords: f64,
    pub technical_terms: f64,
    pub application_scenarios: f64,
    pub related_entities: f64,
}

impl Default for LayerWeights {
    fn default() -> Self {
        Self {
            core_keywords: 0.4,
            technical_terms: 0.3,
            application_scenarios: 0.2,
            related_entities: 0.1,
        }
    }
}

impl LayerWeights {
    pub fn weight(&self, layer: Layer) -> f64 {
        match layer {
            Layer::Core => self.core_keywords,
            Layer::Technical => self.technical_terms,
            Layer::Application => self.application_scenarios,
            Layer::Entities => self.related_entities,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub high_confidence: f64,
    pub low_confidence: f64,
    pub fuzzy_similarity: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            high_confidence: 0.8,
            low_confidence: 0.5,
            fuzzy_similarity: 0.85,
        }
    }
}

/// Global matching parameters shared by every industry.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchingParameters {
    pub layer_weights: LayerWeights,
    pub thresholds: Thresholds,
    /// Max character gap for two occurrences to count as nearby.
    /// Zero turns context boosting off.
    pub context_window_size: usize,
    pub boost_factor_nearby: f64,
    pub boost_factor_cluster: f64,
    pub min_keyword_frequency: usize,
    pub max_industries_per_article: usize,
    pub high_value_keywords: HashSet<String>,
}

impl Default for MatchingParameters {
    fn default() -> Self {
        Self {
            layer_weights: LayerWeights::default(),
            thresholds: Thresholds::default(),
            context_window_size: 50,
            boost_factor_nearby: 1.2,
            boost_factor_cluster: 1.5,
            min_keyword_frequency: 1,
            max_industries_per_article: 3,
            high_value_keywords: DEFAULT_HIGH_VALUE_KEYWORDS
                .iter()
                .map(|k| k.to_string())
                .collect(),
        }
    }
}

/// Batch execution settings from the `performance` section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceSettings {
    pub batch_size: usize,
    pub max_workers: usize,
    pub cache_enabled: bool,
    pub cache_capacity: u64,
}

impl Default for PerformanceSettings {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            max_workers: 3,
            cache_enabled: true,
            cache_capacity: 100_000,
        }
    }
}

/// Persistence settings from the `database` section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub batch_update_size: usize,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            batch_update_size: 100,
        }
    }
}
