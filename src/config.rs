use std::env;
use std::path::PathBuf;

use anyhow::Result;

pub const DEFAULT_CONFIG_DIR: &str = "./industry_configs";
pub const DEFAULT_DB_PATH: &str = "./industry_tagger.db";

/// Runtime configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy. Scoring
/// parameters live in the taxonomy documents under `config_dir`, not here.
pub struct Config {
    /// Directory holding main_config.yaml and one YAML file per industry.
    pub config_dir: PathBuf,
    pub db_path: String,
    /// Overrides `performance.max_workers` from main_config.yaml when set.
    pub workers: Option<usize>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Everything has a default; a malformed TAGGER_WORKERS is an error
    /// rather than a silent fallback.
    pub fn load() -> Result<Self> {
        let workers = match env::var("TAGGER_WORKERS") {
            Ok(raw) if !raw.trim().is_empty() => {
                let n: usize = raw.trim().parse().map_err(|_| {
                    anyhow::anyhow!("TAGGER_WORKERS must be a positive integer, got {raw:?}")
                })?;
                if n == 0 {
                    anyhow::bail!("TAGGER_WORKERS must be at least 1");
                }
                Some(n)
            }
            _ => None,
        };

        Ok(Self {
            config_dir: env::var("TAGGER_CONFIG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_DIR)),
            db_path: env::var("TAGGER_DB_PATH").unwrap_or_else(|_| DEFAULT_DB_PATH.to_string()),
            workers,
        })
    }

    /// Check that the taxonomy directory exists.
    /// Call this before any operation that needs to score text.
    pub fn require_config_dir(&self) -> Result<()> {
        if !self.config_dir.is_dir() {
            anyhow::bail!(
                "Taxonomy directory {} not found.\n\
                 Set TAGGER_CONFIG_DIR in your .env file. See .env.example for details.",
                self.config_dir.display()
            );
        }
        Ok(())
    }
}
