// Evaluation — run labeled cases through the classifier and measure it.
//
// Metrics use set semantics over display names. An empty expectation with
// an empty result counts as a perfect answer, which is what the negative
// ("should match nothing") cases rely on.

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::classifier::Classifier;

/// A case counts as passed at or above this F1.
pub const PASS_F1: f64 = 0.8;

#[derive(Debug, Clone, Deserialize)]
pub struct LabeledCase {
    pub name: String,
    pub content: String,
    #[serde(default)]
    pub expected: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Metrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub accuracy: f64,
}

impl Metrics {
    pub fn compute(expected: &BTreeSet<String>, matched: &BTreeSet<String>) -> Self {
        let correct = expected.intersection(matched).count() as f64;

        let precision = if !matched.is_empty() {
            correct / matched.len() as f64
        } else if expected.is_empty() {
            1.0
        } else {
            0.0
        };
        let recall = if !expected.is_empty() {
            correct / expected.len() as f64
        } else if matched.is_empty() {
            1.0
        } else {
            0.0
        };
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        let union = expected.len() as f64 + matched.len() as f64 - correct;
        let accuracy = if union > 0.0 { correct / union } else { 1.0 };

        Self {
            precision,
            recall,
            f1,
            accuracy,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CaseResult {
    pub name: String,
    pub expected: Vec<String>,
    pub matched: Vec<String>,
    pub false_positives: Vec<String>,
    pub false_negatives: Vec<String>,
    pub metrics: Metrics,
}

impl CaseResult {
    pub fn passed(&self) -> bool {
        self.metrics.f1 >= PASS_F1
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationSummary {
    pub cases: Vec<CaseResult>,
    pub average: Metrics,
    pub passed: usize,
}

/// Load cases from a JSON array.
pub fn load_cases(path: &Path) -> Result<Vec<LabeledCase>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read cases from {}", path.display()))?;
    let cases: Vec<LabeledCase> = serde_json::from_str(&text)
        .with_context(|| format!("Invalid cases file {}", path.display()))?;
    Ok(cases)
}

pub fn evaluate_case(classifier: &Classifier, case: &LabeledCase) -> CaseResult {
    let matched_list = classifier.classify(case.content.trim());
    let expected: BTreeSet<String> = case.expected.iter().cloned().collect();
    let matched: BTreeSet<String> = matched_list.iter().cloned().collect();

    CaseResult {
        name: case.name.clone(),
        expected: case.expected.clone(),
        false_positives: matched.difference(&expected).cloned().collect(),
        false_negatives: expected.difference(&matched).cloned().collect(),
        metrics: Metrics::compute(&expected, &matched),
        matched: matched_list,
    }
}

pub fn evaluate(classifier: &Classifier, cases: &[LabeledCase]) -> EvaluationSummary {
    let results: Vec<CaseResult> = cases.iter().map(|c| evaluate_case(classifier, c)).collect();

    let mut average = Metrics::default();
    if !results.is_empty() {
        let n = results.len() as f64;
        for r in &results {
            average.precision += r.metrics.precision / n;
            average.recall += r.metrics.recall / n;
            average.f1 += r.metrics.f1 / n;
            average.accuracy += r.metrics.accuracy / n;
        }
    }

    EvaluationSummary {
        passed: results.iter().filter(|r| r.passed()).count(),
        cases: results,
        average,
    }
}
