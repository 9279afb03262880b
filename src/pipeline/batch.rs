// Batch classification pipeline — tag every stored article.
//
// The corpus is cut into fixed-size ranges. A bounded pool of workers
// (buffer_unordered over the ranges) each fetches its range, classifies it on
// the blocking pool, and hands back label updates. A failed range is logged
// and dropped; there is no retry at this level. Results are reduced on this
// task and written back in chunks that shrink on failure.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{info, warn};

use crate::classifier::Classifier;
use crate::db::models::{Article, LabelUpdate};
use crate::db::Database;
use crate::taxonomy::models::PerformanceSettings;

pub const LAST_RUN_AT_KEY: &str = "last_run_at";
pub const LAST_RUN_SUMMARY_KEY: &str = "last_run_summary";

/// Worker count and range size for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchPlan {
    pub batch_size: usize,
    pub workers: usize,
}

impl BatchPlan {
    /// Scale the configured settings down for small corpora so the work
    /// still spreads across workers.
    pub fn for_corpus(total: usize, settings: &PerformanceSettings) -> Self {
        let mut batch_size = settings.batch_size.max(1);
        let mut workers = settings.max_workers.max(1);

        if total < 100 {
            batch_size = batch_size.min(10);
            workers = workers.min(4);
        } else if total < 500 {
            batch_size = batch_size.min(25);
            workers = workers.min(6);
        }

        Self {
            batch_size,
            workers,
        }
    }

    /// Range start offsets covering `total` items.
    pub fn offsets(&self, total: usize) -> Vec<usize> {
        (0..total).step_by(self.batch_size.max(1)).collect()
    }
}

/// Processed/matched counts, summed from batches that came back whole.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchStats {
    pub processed: usize,
    pub matched: usize,
}

impl MatchStats {
    pub fn add(&mut self, batch: &[LabelUpdate]) {
        self.processed += batch.len();
        self.matched += batch.iter().filter(|u| !u.industries.is_empty()).count();
    }
}

/// Outcome of writing label updates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PersistSummary {
    pub written: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub processed: usize,
    pub matched: usize,
    pub failed_batches: usize,
    pub persisted: PersistSummary,
    pub elapsed: Duration,
}

impl RunSummary {
    /// Share of processed articles that got at least one label, in percent.
    pub fn match_rate(&self) -> f64 {
        if self.processed == 0 {
            0.0
        } else {
            self.matched as f64 / self.processed as f64 * 100.0
        }
    }
}

/// Classify one fetched range.
pub fn classify_batch(classifier: &Classifier, articles: &[Article]) -> Vec<LabelUpdate> {
    articles
        .iter()
        .map(|article| LabelUpdate {
            article_id: article.id,
            industries: classifier.classify(&article.content),
        })
        .collect()
}

/// Run the whole corpus through the classifier and persist the labels.
pub async fn run(
    db: Arc<dyn Database>,
    classifier: Arc<Classifier>,
    plan: BatchPlan,
    update_batch_size: usize,
) -> Result<RunSummary> {
    let started = Instant::now();
    let total = usize::try_from(db.count_articles().await?)
        .context("negative article count")?;

    if total == 0 {
        info!("No articles to classify");
        return Ok(RunSummary {
            total: 0,
            processed: 0,
            matched: 0,
            failed_batches: 0,
            persisted: PersistSummary::default(),
            elapsed: started.elapsed(),
        });
    }

    let offsets = plan.offsets(total);
    info!(
        total,
        workers = plan.workers,
        batch_size = plan.batch_size,
        batches = offsets.len(),
        "Starting classification run"
    );

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  Classifying [{bar:30}] {pos}/{len} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let batch_size = plan.batch_size;
    let ranges = offsets.into_iter().map(|offset| {
        let db = Arc::clone(&db);
        let classifier = Arc::clone(&classifier);
        let pb = pb.clone();
        async move {
            let result = process_range(db, classifier, offset, batch_size).await;
            if let Ok(ref updates) = result {
                pb.inc(updates.len() as u64);
            }
            (offset, result)
        }
    });
    let results: Vec<(usize, Result<Vec<LabelUpdate>>)> = stream::iter(ranges)
        .buffer_unordered(plan.workers.max(1))
        .collect()
        .await;
    pb.finish_and_clear();

    let mut updates = Vec::with_capacity(total);
    let mut stats = MatchStats::default();
    let mut failed_batches = 0;
    for (offset, result) in results {
        match result {
            Ok(batch) => {
                stats.add(&batch);
                updates.extend(batch);
            }
            Err(e) => {
                failed_batches += 1;
                warn!(offset, error = %e, "Batch failed, dropping its results");
            }
        }
    }

    info!(updates = updates.len(), "Writing labels");
    let persisted = persist_updates(db.as_ref(), &updates, update_batch_size).await;

    let summary = RunSummary {
        total,
        processed: stats.processed,
        matched: stats.matched,
        failed_batches,
        persisted,
        elapsed: started.elapsed(),
    };

    db.set_run_state(LAST_RUN_AT_KEY, &chrono::Utc::now().to_rfc3339())
        .await?;
    db.set_run_state(LAST_RUN_SUMMARY_KEY, &serde_json::to_string(&summary)?)
        .await?;

    info!(
        processed = summary.processed,
        matched = summary.matched,
        written = summary.persisted.written,
        skipped = summary.persisted.skipped,
        elapsed_secs = summary.elapsed.as_secs_f64(),
        "Classification run complete"
    );

    Ok(summary)
}

async fn process_range(
    db: Arc<dyn Database>,
    classifier: Arc<Classifier>,
    offset: usize,
    limit: usize,
) -> Result<Vec<LabelUpdate>> {
    let articles = db
        .fetch_articles(offset, limit)
        .await
        .with_context(|| format!("Failed to fetch articles at offset {offset}"))?;
    if articles.is_empty() {
        return Ok(Vec::new());
    }

    // Scoring is CPU-bound; keep it off the async workers.
    let updates = tokio::task::spawn_blocking(move || classify_batch(&classifier, &articles))
        .await
        .context("Classification worker panicked")?;
    Ok(updates)
}

/// Write updates in chunks of `initial_chunk`. A failing chunk is retried at
/// half the size; a single row that still fails is skipped. After a success
/// the chunk size grows back toward `initial_chunk`.
pub async fn persist_updates(
    db: &dyn Database,
    updates: &[LabelUpdate],
    initial_chunk: usize,
) -> PersistSummary {
    let initial_chunk = initial_chunk.max(1);
    let mut chunk = initial_chunk;
    let mut summary = PersistSummary::default();
    let mut i = 0;

    while i < updates.len() {
        let end = (i + chunk).min(updates.len());
        match db.update_industries(&updates[i..end]).await {
            Ok(_) => {
                summary.written += end - i;
                i = end;
                if chunk < initial_chunk {
                    chunk = (chunk * 2).min(initial_chunk);
                }
            }
            Err(e) if chunk > 1 => {
                chunk = (chunk / 2).max(1);
                warn!(error = %e, chunk, "Label write failed, retrying with a smaller chunk");
            }
            Err(e) => {
                warn!(
                    article_id = updates[i].article_id,
                    error = %e,
                    "Skipping article that cannot be written"
                );
                summary.skipped += 1;
                i += 1;
            }
        }
    }

    summary
}
