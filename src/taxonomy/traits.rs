// Parameter provider trait — where the classifier gets its taxonomy.
//
// The YAML-backed `Taxonomy` is the only production implementation, but
// tests build providers in memory, and a future database-backed taxonomy
// would slot in here without touching the scorer.

use super::models::{IndustryProfile, IndustryTerms, MatchingParameters, SpecialRules};

pub trait ParameterProvider: Send + Sync {
    /// Enabled industry ids, in configured order.
    fn enabled_industries(&self) -> Vec<String>;

    /// The loaded profile for an enabled industry.
    fn industry_profile(&self, industry_id: &str) -> Option<&IndustryProfile>;

    /// Global matching parameters.
    fn matching_parameters(&self) -> &MatchingParameters;

    fn industry_terms(&self, industry_id: &str) -> Option<&IndustryTerms> {
        self.industry_profile(industry_id).map(|p| &p.terms)
    }

    fn special_rules(&self, industry_id: &str) -> Option<&SpecialRules> {
        self.industry_profile(industry_id).map(|p| &p.rules)
    }
}

/// In-memory provider built directly from profiles.
pub struct StaticProvider {
    profiles: Vec<IndustryProfile>,
    params: MatchingParameters,
}

impl StaticProvider {
    pub fn new(profiles: Vec<IndustryProfile>, params: MatchingParameters) -> Self {
        Self { profiles, params }
    }
}

impl ParameterProvider for StaticProvider {
    fn enabled_industries(&self) -> Vec<String> {
        self.profiles.iter().map(|p| p.id.clone()).collect()
    }

    fn industry_profile(&self, industry_id: &str) -> Option<&IndustryProfile> {
        self.profiles.iter().find(|p| p.id == industry_id)
    }

    fn matching_parameters(&self) -> &MatchingParameters {
        &self.params
    }
}
