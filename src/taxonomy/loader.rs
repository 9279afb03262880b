// Taxonomy loader — reads main_config.yaml and one YAML file per industry.
//
// A broken industry document never stops the run: it is logged and left out
// of the enabled set. A missing or unreadable main config falls back to the
// built-in defaults so a bare checkout still classifies something.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, error, info, warn};

use super::documents::{IndustryDocument, MainConfig};
use super::models::{IndustryProfile, MatchingParameters};
use super::traits::ParameterProvider;

pub const MAIN_CONFIG_FILE: &str = "main_config.yaml";

pub struct TaxonomyLoader {
    config_dir: PathBuf,
}

impl TaxonomyLoader {
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Load the global document, or the defaults if it's absent or invalid.
    pub fn load_main_config(&self) -> MainConfig {
        let path = self.config_dir.join(MAIN_CONFIG_FILE);
        if !path.exists() {
            warn!(path = %path.display(), "Main config not found, using defaults");
            return MainConfig::default();
        }

        match read_yaml::<MainConfig>(&path) {
            Ok(Some(config)) => {
                debug!(path = %path.display(), "Loaded main config");
                config
            }
            Ok(None) => {
                warn!(path = %path.display(), "Main config is empty, using defaults");
                MainConfig::default()
            }
            Err(e) => {
                error!(
                    path = %path.display(),
                    error = %e,
                    "Main config unreadable, using defaults"
                );
                MainConfig::default()
            }
        }
    }

    /// Load and validate a single industry document.
    pub fn load_industry(&self, industry_id: &str) -> Result<IndustryProfile> {
        let path = self.config_dir.join(format!("{industry_id}.yaml"));
        if !path.exists() {
            anyhow::bail!("industry config not found: {}", path.display());
        }

        let document = read_yaml::<IndustryDocument>(&path)?
            .with_context(|| format!("industry config is empty: {}", path.display()))?;
        document.into_profile(industry_id)
    }

    /// Every industry document in the directory, sorted by id.
    pub fn list_available_industries(&self) -> Result<Vec<String>> {
        if !self.config_dir.exists() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        let entries = fs::read_dir(&self.config_dir).with_context(|| {
            format!("Failed to read config directory {}", self.config_dir.display())
        })?;
        for entry in entries {
            let path = entry?.path();
            let is_yaml = path.extension().and_then(|e| e.to_str()) == Some("yaml");
            let is_main = path.file_name().and_then(|n| n.to_str()) == Some(MAIN_CONFIG_FILE);
            if !is_yaml || is_main {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                ids.push(stem.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }

    /// Validate the main document and every industry document found.
    ///
    /// Keyed by industry id plus `main_config`; values carry the failure
    /// reason for invalid entries.
    pub fn validate_all(&self) -> Result<BTreeMap<String, Result<(), String>>> {
        let mut results = BTreeMap::new();

        let main_path = self.config_dir.join(MAIN_CONFIG_FILE);
        let main_result = match read_yaml::<MainConfig>(&main_path) {
            Ok(Some(_)) => Ok(()),
            Ok(None) => Err("empty document".to_string()),
            Err(e) => Err(format!("{e:#}")),
        };
        results.insert("main_config".to_string(), main_result);

        for id in self.list_available_industries()? {
            let result = self.load_industry(&id).map(|_| ()).map_err(|e| format!("{e:#}"));
            results.insert(id, result);
        }
        Ok(results)
    }

    /// Load the main config and every enabled industry into a snapshot.
    ///
    /// Call again to pick up edited documents.
    pub fn load(&self) -> Taxonomy {
        let main = self.load_main_config();
        let params = main.matching_config.to_parameters();

        let mut profiles = Vec::new();
        for id in main.enabled_ids() {
            match self.load_industry(&id) {
                Ok(profile) => {
                    info!(
                        industry = %id,
                        name = %profile.display_name,
                        keywords = profile.terms.total_keywords(),
                        "Loaded industry config"
                    );
                    profiles.push(profile);
                }
                Err(e) => {
                    warn!(industry = %id, error = %e, "Skipping invalid industry config");
                }
            }
        }

        if profiles.is_empty() {
            warn!("No industry configs loaded, classification will return no labels");
        }

        Taxonomy::new(main, params, profiles)
    }
}

/// Parse a YAML file. `Ok(None)` means the file holds no document.
fn read_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    if text.trim().is_empty() {
        return Ok(None);
    }
    let value: serde_yaml::Value = serde_yaml::from_str(&text)
        .with_context(|| format!("YAML parse error in {}", path.display()))?;
    if value.is_null() {
        return Ok(None);
    }
    let parsed = serde_yaml::from_value(value)
        .with_context(|| format!("Unexpected document shape in {}", path.display()))?;
    Ok(Some(parsed))
}

/// A loaded taxonomy: main config plus the valid enabled industries.
pub struct Taxonomy {
    main: MainConfig,
    params: MatchingParameters,
    profiles: Vec<IndustryProfile>,
    index: HashMap<String, usize>,
}

impl Taxonomy {
    pub fn new(
        main: MainConfig,
        params: MatchingParameters,
        profiles: Vec<IndustryProfile>,
    ) -> Self {
        let index = profiles
            .iter()
            .enumerate()
            .map(|(i, p)| (p.id.clone(), i))
            .collect();
        Self {
            main,
            params,
            profiles,
            index,
        }
    }

    pub fn main_config(&self) -> &MainConfig {
        &self.main
    }

    pub fn profiles(&self) -> &[IndustryProfile] {
        &self.profiles
    }
}

impl ParameterProvider for Taxonomy {
    fn enabled_industries(&self) -> Vec<String> {
        self.profiles.iter().map(|p| p.id.clone()).collect()
    }

    fn industry_profile(&self, industry_id: &str) -> Option<&IndustryProfile> {
        self.index.get(industry_id).map(|&i| &self.profiles[i])
    }

    fn matching_parameters(&self) -> &MatchingParameters {
        &self.params
    }
}
