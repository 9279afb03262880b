use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use industry_tagger::classifier::Classifier;
use industry_tagger::config::Config;
use industry_tagger::db::models::NewArticle;
use industry_tagger::pipeline::batch::{self, BatchPlan};
use industry_tagger::scoring::cache::ScoreCache;
use industry_tagger::taxonomy::{Taxonomy, TaxonomyLoader};

/// Industry tagger: label news articles with industries using keyword taxonomies.
///
/// Each industry is a YAML document of layered keywords. Articles are scored
/// against every enabled industry and tagged with the best matches.
#[derive(Parser)]
#[command(name = "industry-tagger", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database
    Init,

    /// Import articles from a JSON Lines file (one {url, title, content} per line)
    Import {
        /// Path to the .jsonl file
        file: PathBuf,
    },

    /// Classify every stored article and write the labels back
    Run {
        /// Number of batches processed in parallel (default: from main_config.yaml)
        #[arg(long)]
        workers: Option<usize>,

        /// Articles per batch (default: from main_config.yaml)
        #[arg(long)]
        batch_size: Option<usize>,
    },

    /// Print the industries for one piece of text
    Classify {
        /// Read the text from a file instead of the argument
        #[arg(long)]
        file: Option<PathBuf>,

        /// The text to classify (reads stdin when neither this nor --file is given)
        text: Option<String>,
    },

    /// Show how one industry scores a piece of text, layer by layer
    Explain {
        /// Industry id (the YAML file name without extension)
        industry: String,

        /// Read the text from a file instead of the argument
        #[arg(long)]
        file: Option<PathBuf>,

        /// The text to score (reads stdin when neither this nor --file is given)
        text: Option<String>,
    },

    /// List available and enabled industries
    Industries,

    /// Validate main_config.yaml and every industry document
    Validate,

    /// Run labeled cases and report precision, recall and F1
    Evaluate {
        /// JSON array of {name, content, expected}
        cases: PathBuf,
    },

    /// Show database stats and the last run
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("industry_tagger=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Init => {
            info!("Initializing industry-tagger database...");
            let db = industry_tagger::db::initialize_sqlite(&config.db_path)?;
            let table_count = db.table_count().await?;
            println!("Database initialized at: {}", config.db_path);
            println!("Tables created: {table_count}");
            println!("\nNext step: import articles");
            println!("  industry-tagger import articles.jsonl");
        }

        Commands::Import { file } => {
            let db = industry_tagger::db::open_sqlite(&config.db_path)?;
            let articles = read_jsonl(&file)?;
            println!("Importing {} articles from {}...", articles.len(), file.display());

            let summary = db.insert_articles(&articles).await?;
            println!("\n{}", "Import complete.".bold());
            println!("  Inserted:   {}", summary.inserted);
            if summary.duplicates > 0 {
                println!("  Duplicates: {} (skipped)", summary.duplicates);
            }
        }

        Commands::Run {
            workers,
            batch_size,
        } => {
            config.require_config_dir()?;
            let db = industry_tagger::db::open_sqlite(&config.db_path)?;
            let taxonomy = load_taxonomy(&config)?;
            let main_config = taxonomy.main_config().clone();
            let classifier = Arc::new(build_classifier(&taxonomy));

            let mut performance = main_config.performance;
            if let Some(n) = config.workers {
                performance.max_workers = n;
            }

            let total = usize::try_from(db.count_articles().await?).unwrap_or(0);
            let mut plan = BatchPlan::for_corpus(total, &performance);
            // Explicit flags win over the small-corpus scaling
            if let Some(n) = workers {
                plan.workers = n.max(1);
            }
            if let Some(n) = batch_size {
                plan.batch_size = n.max(1);
            }

            println!(
                "Classifying {} articles against {} industries ({} workers, batches of {})...",
                total,
                classifier.industries().len(),
                plan.workers,
                plan.batch_size
            );

            let summary = batch::run(
                Arc::clone(&db),
                classifier,
                plan,
                main_config.database.batch_update_size,
            )
            .await?;
            industry_tagger::output::terminal::display_run_summary(&summary);
        }

        Commands::Classify { file, text } => {
            config.require_config_dir()?;
            let taxonomy = load_taxonomy(&config)?;
            let classifier = build_classifier(&taxonomy);
            let content = read_input(file.as_deref(), text)?;

            let matches = classifier.classify_scored(&content);
            industry_tagger::output::terminal::display_labels(&content, &matches);
        }

        Commands::Explain {
            industry,
            file,
            text,
        } => {
            config.require_config_dir()?;
            let taxonomy = load_taxonomy(&config)?;
            let classifier = build_classifier(&taxonomy);
            let content = read_input(file.as_deref(), text)?;

            match classifier.explain(&content, &industry) {
                Some(breakdown) => industry_tagger::output::terminal::display_breakdown(&breakdown),
                None => anyhow::bail!(
                    "Industry '{}' is not enabled or failed to load.\n\
                     Run `industry-tagger industries` to see what is available.",
                    industry
                ),
            }
        }

        Commands::Industries => {
            config.require_config_dir()?;
            let loader = TaxonomyLoader::new(&config.config_dir);
            let available = loader.list_available_industries()?;
            let taxonomy = loader.load();
            industry_tagger::output::terminal::display_industries(
                taxonomy.main_config().version.as_deref(),
                &available,
                taxonomy.profiles(),
            );
        }

        Commands::Validate => {
            config.require_config_dir()?;
            let loader = TaxonomyLoader::new(&config.config_dir);
            let results = loader.validate_all()?;
            industry_tagger::output::terminal::display_validation(&results);

            if results.values().any(|r| r.is_err()) {
                anyhow::bail!("Taxonomy validation failed");
            }
        }

        Commands::Evaluate { cases } => {
            config.require_config_dir()?;
            let taxonomy = load_taxonomy(&config)?;
            let classifier = build_classifier(&taxonomy);
            let cases = industry_tagger::evaluate::load_cases(&cases)?;

            let summary = industry_tagger::evaluate::evaluate(&classifier, &cases);
            industry_tagger::output::terminal::display_evaluation(&summary);
        }

        Commands::Status => {
            if !industry_tagger::status::is_initialized(&config.db_path) {
                println!("Database: not initialized");
                println!("\nRun `industry-tagger init` to set up the database.");
                return Ok(());
            }
            let db = industry_tagger::db::open_sqlite(&config.db_path)?;
            industry_tagger::status::show(&db, &config.db_path).await?;
        }
    }

    Ok(())
}

/// Load the taxonomy, refusing to continue when nothing is enabled.
fn load_taxonomy(config: &Config) -> Result<Taxonomy> {
    let taxonomy = TaxonomyLoader::new(&config.config_dir).load();
    if taxonomy.profiles().is_empty() {
        anyhow::bail!(
            "No industries loaded from {}.\n\
             Check enabled_industries in main_config.yaml and run `industry-tagger validate`.",
            config.config_dir.display()
        );
    }
    Ok(taxonomy)
}

fn build_classifier(taxonomy: &Taxonomy) -> Classifier {
    let cache = ScoreCache::from_settings(&taxonomy.main_config().performance);
    let classifier = Classifier::new(taxonomy, cache);
    info!(
        industries = classifier.industries().len(),
        cache = classifier.cache().is_enabled(),
        "Classifier ready"
    );
    classifier
}

/// Text from --file, the positional argument, or stdin, in that order.
fn read_input(file: Option<&Path>, text: Option<String>) -> Result<String> {
    if let Some(path) = file {
        return std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()));
    }
    if let Some(text) = text {
        return Ok(text);
    }

    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("Failed to read text from stdin")?;
    Ok(buf)
}

/// Parse a JSON Lines file of articles. Blank lines are skipped; a malformed
/// line is reported with its line number and skipped.
fn read_jsonl(path: &Path) -> Result<Vec<NewArticle>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let mut articles = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<NewArticle>(line) {
            Ok(article) => articles.push(article),
            Err(e) => warn!(line = i + 1, error = %e, "Skipping malformed article"),
        }
    }
    Ok(articles)
}
