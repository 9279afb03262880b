// Weighted aggregation of the four layer scores.

use serde::Serialize;

use crate::taxonomy::models::{Layer, LayerWeights};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LayerScores {
    pub core: f64,
    pub technical: f64,
    pub application: f64,
    pub entities: f64,
}

impl LayerScores {
    pub fn get(&self, layer: Layer) -> f64 {
        match layer {
            Layer::Core => self.core,
            Layer::Technical => self.technical,
            Layer::Application => self.application,
            Layer::Entities => self.entities,
        }
    }

    pub fn set(&mut self, layer: Layer, score: f64) {
        match layer {
            Layer::Core => self.core = score,
            Layer::Technical => self.technical = score,
            Layer::Application => self.application = score,
            Layer::Entities => self.entities = score,
        }
    }
}

/// Weighted sum of the layer scores. Weights are used as configured, with
/// no renormalization.
pub fn aggregate(scores: &LayerScores, weights: &LayerWeights) -> f64 {
    Layer::ALL
        .iter()
        .map(|&layer| scores.get(layer) * weights.weight(layer))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights() {
        let scores = LayerScores {
            core: 1.0,
            technical: 0.5,
            application: 0.0,
            entities: 1.0,
        };
        // 0.4 + 0.15 + 0 + 0.1
        let total = aggregate(&scores, &LayerWeights::default());
        assert!((total - 0.65).abs() < 1e-9, "got {total}");
    }

    #[test]
    fn weights_are_not_renormalized() {
        let weights = LayerWeights {
            core_keywords: 1.0,
            technical_terms: 1.0,
            application_scenarios: 0.0,
            related_entities: 0.0,
        };
        let scores = LayerScores {
            core: 0.8,
            technical: 0.8,
            ..LayerScores::default()
        };
        assert!((aggregate(&scores, &weights) - 1.6).abs() < 1e-9);
    }
}
