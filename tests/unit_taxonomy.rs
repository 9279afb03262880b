// Taxonomy loader tests — YAML documents on disk to a usable classifier.
//
// Each test writes its documents into a fresh temp directory. The last
// group loads the shipped industry_configs/ directory to make sure the
// sample taxonomy stays valid.

use std::fs;
use std::path::Path;

use industry_tagger::classifier::Classifier;
use industry_tagger::scoring::cache::ScoreCache;
use industry_tagger::taxonomy::{ParameterProvider, TaxonomyLoader};
use tempfile::TempDir;

const MAIN: &str = "
version: 2.1.0
enabled_industries: [semiconductor, broken, missing]
matching_config:
  layer_weights:
    core_keywords: 1.0
    technical_terms: 0.0
    application_scenarios: 0.0
    related_entities: 0.0
  thresholds:
    high_confidence: 0.7
    low_confidence: 0.5
  parameters:
    max_industries_per_article: 2
    context_window_size: 0
performance:
  batch_size: 200
  max_workers: 5
database:
  batch_update_size: 40
";

const SEMICONDUCTOR: &str = "
industry_info:
  name: Semiconductors
  priority: 1
core_keywords:
  devices: [Wafer, Lithography, Foundry, Transistor, Etching]
  more:
    nested: [Photomask, Dopant, Epitaxy, Stepper, Reticle]
technical_terms:
  nodes: [3nm]
application_scenarios:
  phones: [smartphone]
related_entities:
  foundries: [TSMC]
special_rules:
  exclude_keywords: [Potato Chip]
  required_pairs:
    - [wafer, foundry]
    - [only-one]
  context_boost: [earnings]
";

/// Missing related_entities.
const BROKEN: &str = "
industry_info:
  name: Broken
core_keywords: { a: [x] }
technical_terms: { a: [y] }
application_scenarios: { a: [z] }
";

fn write(dir: &Path, name: &str, body: &str) {
    fs::write(dir.join(name), body).unwrap();
}

fn fixture() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "main_config.yaml", MAIN);
    write(dir.path(), "semiconductor.yaml", SEMICONDUCTOR);
    write(dir.path(), "broken.yaml", BROKEN);
    write(dir.path(), "notes.txt", "not a taxonomy document");
    dir
}

#[test]
fn lists_industry_documents_sorted_without_main_config() {
    let dir = fixture();
    let loader = TaxonomyLoader::new(dir.path());
    assert_eq!(
        loader.list_available_industries().unwrap(),
        vec!["broken", "semiconductor"]
    );
}

#[test]
fn invalid_and_missing_industries_are_skipped() {
    let dir = fixture();
    let taxonomy = TaxonomyLoader::new(dir.path()).load();
    assert_eq!(taxonomy.enabled_industries(), vec!["semiconductor"]);
    assert!(taxonomy.industry_profile("broken").is_none());
}

#[test]
fn keywords_are_flattened_and_normalized() {
    let dir = fixture();
    let profile = TaxonomyLoader::new(dir.path()).load_industry("semiconductor").unwrap();

    assert_eq!(profile.display_name, "Semiconductors");
    assert_eq!(profile.priority, 1);
    assert_eq!(profile.terms.core.len(), 10);
    assert!(profile.terms.core.as_slice().contains(&"photomask".to_string()));
    assert_eq!(profile.terms.entities.as_slice(), ["tsmc"]);
    assert_eq!(profile.rules.exclude_keywords, vec!["potato chip"]);
    // the one-word pair is dropped
    assert_eq!(
        profile.rules.required_pairs,
        vec![("wafer".to_string(), "foundry".to_string())]
    );
}

#[test]
fn stray_numbers_do_not_drop_the_industry() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "snacks.yaml",
        "
industry_info:
  name: Snacks
core_keywords:
  a: [chip, 2024]
technical_terms: { a: [crisp] }
application_scenarios: { a: [party] }
related_entities: { a: [brand] }
special_rules:
  exclude_keywords: [potato, 2024]
  required_pairs:
    - [chip, 7]
",
    );

    let profile = TaxonomyLoader::new(dir.path()).load_industry("snacks").unwrap();
    assert_eq!(profile.terms.core.as_slice(), ["chip"]);
    assert_eq!(profile.rules.exclude_keywords, vec!["potato"]);
    assert!(profile.rules.required_pairs.is_empty());
}

#[test]
fn main_config_sections_are_read() {
    let dir = fixture();
    let taxonomy = TaxonomyLoader::new(dir.path()).load();
    let main = taxonomy.main_config();
    assert_eq!(main.version.as_deref(), Some("2.1.0"));
    assert_eq!(main.performance.batch_size, 200);
    assert_eq!(main.performance.max_workers, 5);
    assert_eq!(main.database.batch_update_size, 40);

    let params = taxonomy.matching_parameters();
    assert_eq!(params.max_industries_per_article, 2);
    assert_eq!(params.context_window_size, 0);
    assert_eq!(params.thresholds.high_confidence, 0.7);
    // unspecified values keep their defaults
    assert_eq!(params.thresholds.fuzzy_similarity, 0.85);
    assert_eq!(params.boost_factor_cluster, 1.5);
}

#[test]
fn absent_main_config_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "semiconductor.yaml", SEMICONDUCTOR);

    let taxonomy = TaxonomyLoader::new(dir.path()).load();
    assert_eq!(taxonomy.enabled_industries(), vec!["semiconductor"]);
    let params = taxonomy.matching_parameters();
    assert_eq!(params.layer_weights.core_keywords, 0.4);
    assert_eq!(params.max_industries_per_article, 3);
}

#[test]
fn unparseable_main_config_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "main_config.yaml", "enabled_industries: [unterminated");
    let taxonomy = TaxonomyLoader::new(dir.path()).load();
    assert_eq!(taxonomy.main_config().enabled_industries, vec!["semiconductor"]);
}

#[test]
fn validate_all_reports_each_document() {
    let dir = fixture();
    let results = TaxonomyLoader::new(dir.path()).validate_all().unwrap();

    assert!(results["main_config"].is_ok());
    assert!(results["semiconductor"].is_ok());
    let err = results["broken"].as_ref().unwrap_err();
    assert!(err.contains("related_entities"), "got {err}");
}

#[test]
fn reloading_picks_up_edits() {
    let dir = fixture();
    let loader = TaxonomyLoader::new(dir.path());
    assert_eq!(loader.load().profiles().len(), 1);

    write(dir.path(), "broken.yaml", &format!("{BROKEN}related_entities: {{ a: [w] }}\n"));
    assert_eq!(loader.load().profiles().len(), 2);
}

#[test]
fn loaded_taxonomy_drives_the_classifier() {
    let dir = fixture();
    let taxonomy = TaxonomyLoader::new(dir.path()).load();
    let classifier = Classifier::new(&taxonomy, ScoreCache::disabled());

    let article =
        "Wafer lithography foundry transistor etching photomask dopant epitaxy stepper reticle "
            .repeat(2);
    assert_eq!(classifier.classify(&article), vec!["Semiconductors"]);

    let snack = format!("{article} potato chip");
    assert!(classifier.classify(&snack).is_empty());
}

// ============================================================
// Shipped sample taxonomy
// ============================================================

fn sample_dir() -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("industry_configs")
}

#[test]
fn sample_taxonomy_is_valid() {
    let results = TaxonomyLoader::new(sample_dir()).validate_all().unwrap();
    for (id, result) in &results {
        assert!(result.is_ok(), "{id}: {result:?}");
    }
}

#[test]
fn sample_taxonomy_enables_every_document() {
    let loader = TaxonomyLoader::new(sample_dir());
    let available = loader.list_available_industries().unwrap();
    let taxonomy = loader.load();
    assert_eq!(taxonomy.profiles().len(), available.len());
}
