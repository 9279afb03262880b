// SQLite store and batch pipeline tests.
//
// Everything runs against an in-memory database. The flaky store wraps the
// real one and rejects oversized or poisoned label batches so the chunked
// write-back can be observed recovering.

#![cfg(feature = "sqlite")]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use industry_tagger::classifier::Classifier;
use industry_tagger::db::models::{
    Article, ArticleStats, ImportSummary, LabelUpdate, NewArticle,
};
use industry_tagger::db::Database;
use industry_tagger::pipeline::batch::{self, BatchPlan, LAST_RUN_AT_KEY, LAST_RUN_SUMMARY_KEY};
use industry_tagger::scoring::cache::ScoreCache;
use industry_tagger::taxonomy::models::{
    IndustryProfile, IndustryTerms, KeywordLayer, LayerWeights, MatchingParameters, SpecialRules,
    Thresholds,
};
use industry_tagger::taxonomy::StaticProvider;

const SEMIS: &str =
    "wafer lithography foundry transistor etching photomask dopant epitaxy stepper reticle";

fn article(url: &str, content: &str) -> NewArticle {
    NewArticle {
        url: Some(url.to_string()),
        title: Some(format!("title {url}")),
        content: content.to_string(),
    }
}

fn semis_classifier() -> Classifier {
    let profile = IndustryProfile {
        id: "semiconductor".into(),
        display_name: "Semiconductors".into(),
        priority: 1,
        terms: IndustryTerms {
            core: KeywordLayer::new(SEMIS.split(' ')),
            ..IndustryTerms::default()
        },
        rules: SpecialRules::default(),
    };
    let params = MatchingParameters {
        layer_weights: LayerWeights {
            core_keywords: 1.0,
            technical_terms: 0.0,
            application_scenarios: 0.0,
            related_entities: 0.0,
        },
        thresholds: Thresholds {
            high_confidence: 0.7,
            low_confidence: 0.5,
            fuzzy_similarity: 0.85,
        },
        context_window_size: 0,
        high_value_keywords: Default::default(),
        ..MatchingParameters::default()
    };
    let provider = StaticProvider::new(vec![profile], params);
    Classifier::new(&provider, ScoreCache::new(1_000))
}

/// 10 semiconductor articles (ids 1..=10) followed by 20 unrelated ones.
async fn seeded_db() -> Arc<dyn Database> {
    let db = industry_tagger::db::in_memory().unwrap();
    let mut items = Vec::new();
    for i in 0..10 {
        items.push(article(&format!("semis-{i}"), &format!("{SEMIS} {SEMIS} report {i}")));
    }
    for i in 0..20 {
        items.push(article(&format!("other-{i}"), &format!("local weather update number {i}")));
    }
    let summary = db.insert_articles(&items).await.unwrap();
    assert_eq!(summary.inserted, 30);
    db
}

// ============================================================
// Store
// ============================================================

#[tokio::test]
async fn import_skips_known_urls() {
    let db = seeded_db().await;
    let summary = db
        .insert_articles(&[article("semis-0", "again"), article("fresh", "new")])
        .await
        .unwrap();
    assert_eq!(summary.inserted, 1);
    assert_eq!(summary.duplicates, 1);
    assert_eq!(db.count_articles().await.unwrap(), 31);
}

#[tokio::test]
async fn fetch_pages_in_id_order() {
    let db = seeded_db().await;
    let first = db.fetch_articles(0, 4).await.unwrap();
    let second = db.fetch_articles(4, 4).await.unwrap();
    assert_eq!(first.iter().map(|a| a.id).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
    assert_eq!(second[0].id, 5);
    assert!(db.fetch_articles(30, 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn labels_round_trip_and_feed_stats() {
    let db = seeded_db().await;
    assert_eq!(db.get_industries(1).await.unwrap(), None);

    let changed = db
        .update_industries(&[
            LabelUpdate {
                article_id: 1,
                industries: vec!["Semiconductors".into()],
            },
            LabelUpdate {
                article_id: 2,
                industries: vec![],
            },
        ])
        .await
        .unwrap();
    assert_eq!(changed, 2);
    assert_eq!(db.get_industries(1).await.unwrap(), Some(vec!["Semiconductors".to_string()]));
    assert_eq!(db.get_industries(2).await.unwrap(), Some(vec![]));

    let stats = db.article_stats().await.unwrap();
    assert_eq!(
        stats,
        ArticleStats {
            total: 30,
            classified: 2,
            labelled: 1
        }
    );
}

#[tokio::test]
async fn run_state_upserts() {
    let db = industry_tagger::db::in_memory().unwrap();
    assert_eq!(db.get_run_state("k").await.unwrap(), None);
    db.set_run_state("k", "one").await.unwrap();
    db.set_run_state("k", "two").await.unwrap();
    assert_eq!(db.get_run_state("k").await.unwrap().as_deref(), Some("two"));
}

#[tokio::test]
async fn schema_has_three_tables() {
    let db = industry_tagger::db::in_memory().unwrap();
    assert_eq!(db.table_count().await.unwrap(), 3);
}

// ============================================================
// Batch run
// ============================================================

#[tokio::test]
async fn run_labels_the_whole_corpus() {
    let db = seeded_db().await;
    let classifier = Arc::new(semis_classifier());
    let plan = BatchPlan {
        batch_size: 7,
        workers: 3,
    };

    let summary = batch::run(Arc::clone(&db), classifier, plan, 4).await.unwrap();
    assert_eq!(summary.total, 30);
    assert_eq!(summary.processed, 30);
    assert_eq!(summary.matched, 10);
    assert_eq!(summary.failed_batches, 0);
    assert_eq!(summary.persisted.written, 30);
    assert_eq!(summary.persisted.skipped, 0);

    for id in 1..=10 {
        assert_eq!(
            db.get_industries(id).await.unwrap(),
            Some(vec!["Semiconductors".to_string()])
        );
    }
    assert_eq!(db.get_industries(11).await.unwrap(), Some(vec![]));

    let stats = db.article_stats().await.unwrap();
    assert_eq!(stats.classified, 30);
    assert_eq!(stats.labelled, 10);

    assert!(db.get_run_state(LAST_RUN_AT_KEY).await.unwrap().is_some());
    let saved = db.get_run_state(LAST_RUN_SUMMARY_KEY).await.unwrap().unwrap();
    let saved: serde_json::Value = serde_json::from_str(&saved).unwrap();
    assert_eq!(saved["matched"], 10);
}

#[tokio::test]
async fn run_on_empty_corpus_is_a_no_op() {
    let db = industry_tagger::db::in_memory().unwrap();
    let plan = BatchPlan {
        batch_size: 10,
        workers: 2,
    };
    let summary = batch::run(Arc::clone(&db), Arc::new(semis_classifier()), plan, 10)
        .await
        .unwrap();
    assert_eq!(summary.processed, 0);
    assert_eq!(summary.match_rate(), 0.0);
}

#[tokio::test]
async fn worker_count_does_not_change_results() {
    for workers in [1, 4] {
        let db = seeded_db().await;
        let plan = BatchPlan {
            batch_size: 5,
            workers,
        };
        let summary = batch::run(Arc::clone(&db), Arc::new(semis_classifier()), plan, 100)
            .await
            .unwrap();
        assert_eq!(summary.matched, 10, "workers = {workers}");
        assert_eq!(db.article_stats().await.unwrap().labelled, 10);
    }
}

// ============================================================
// Chunked write-back
// ============================================================

/// Rejects label batches larger than `max_chunk` or containing `poison`,
/// and fails the page fetch starting at `broken_offset`.
struct FlakyDb {
    inner: Arc<dyn Database>,
    max_chunk: usize,
    poison: Option<i64>,
    broken_offset: Option<usize>,
    attempts: AtomicUsize,
}

#[async_trait]
impl Database for FlakyDb {
    async fn table_count(&self) -> Result<i64> {
        self.inner.table_count().await
    }

    async fn get_run_state(&self, key: &str) -> Result<Option<String>> {
        self.inner.get_run_state(key).await
    }

    async fn set_run_state(&self, key: &str, value: &str) -> Result<()> {
        self.inner.set_run_state(key, value).await
    }

    async fn insert_articles(&self, articles: &[NewArticle]) -> Result<ImportSummary> {
        self.inner.insert_articles(articles).await
    }

    async fn count_articles(&self) -> Result<i64> {
        self.inner.count_articles().await
    }

    async fn fetch_articles(&self, offset: usize, limit: usize) -> Result<Vec<Article>> {
        if self.broken_offset == Some(offset) {
            anyhow::bail!("connection reset at offset {offset}");
        }
        self.inner.fetch_articles(offset, limit).await
    }

    async fn update_industries(&self, updates: &[LabelUpdate]) -> Result<usize> {
        self.attempts.fetch_add(1, Ordering::Relaxed);
        if updates.len() > self.max_chunk {
            anyhow::bail!("payload too large: {} rows", updates.len());
        }
        if let Some(bad) = self.poison {
            if updates.iter().any(|u| u.article_id == bad) {
                anyhow::bail!("constraint violation on article {bad}");
            }
        }
        self.inner.update_industries(updates).await
    }

    async fn get_industries(&self, article_id: i64) -> Result<Option<Vec<String>>> {
        self.inner.get_industries(article_id).await
    }

    async fn article_stats(&self) -> Result<ArticleStats> {
        self.inner.article_stats().await
    }
}

fn updates(ids: std::ops::RangeInclusive<i64>) -> Vec<LabelUpdate> {
    ids.map(|article_id| LabelUpdate {
        article_id,
        industries: vec!["Semiconductors".into()],
    })
    .collect()
}

#[tokio::test]
async fn oversized_chunks_are_split_until_they_fit() {
    let db = FlakyDb {
        inner: seeded_db().await,
        max_chunk: 2,
        poison: None,
        broken_offset: None,
        attempts: AtomicUsize::new(0),
    };

    let summary = batch::persist_updates(&db, &updates(1..=10), 8).await;
    assert_eq!(summary.written, 10);
    assert_eq!(summary.skipped, 0);
    assert!(db.attempts.load(Ordering::Relaxed) > 5);
    assert_eq!(db.inner.article_stats().await.unwrap().labelled, 10);
}

#[tokio::test]
async fn a_row_that_never_fits_is_skipped() {
    let db = FlakyDb {
        inner: seeded_db().await,
        max_chunk: usize::MAX,
        poison: Some(4),
        broken_offset: None,
        attempts: AtomicUsize::new(0),
    };

    let summary = batch::persist_updates(&db, &updates(1..=10), 4).await;
    assert_eq!(summary.written, 9);
    assert_eq!(summary.skipped, 1);
    assert_eq!(db.inner.get_industries(4).await.unwrap(), None);
    assert_eq!(
        db.inner.get_industries(5).await.unwrap(),
        Some(vec!["Semiconductors".to_string()])
    );
}

#[tokio::test]
async fn run_survives_a_flaky_store() {
    let db: Arc<dyn Database> = Arc::new(FlakyDb {
        inner: seeded_db().await,
        max_chunk: 3,
        poison: Some(12),
        broken_offset: None,
        attempts: AtomicUsize::new(0),
    });
    let plan = BatchPlan {
        batch_size: 10,
        workers: 2,
    };

    let summary = batch::run(Arc::clone(&db), Arc::new(semis_classifier()), plan, 16)
        .await
        .unwrap();
    assert_eq!(summary.processed, 30);
    assert_eq!(summary.persisted.written, 29);
    assert_eq!(summary.persisted.skipped, 1);
}

#[tokio::test]
async fn failed_range_is_left_out_of_the_counts() {
    // ids 1..=10 match; the range at offset 5 holds ids 6..=10
    let db: Arc<dyn Database> = Arc::new(FlakyDb {
        inner: seeded_db().await,
        max_chunk: usize::MAX,
        poison: None,
        broken_offset: Some(5),
        attempts: AtomicUsize::new(0),
    });
    let plan = BatchPlan {
        batch_size: 5,
        workers: 3,
    };

    let summary = batch::run(Arc::clone(&db), Arc::new(semis_classifier()), plan, 100)
        .await
        .unwrap();
    assert_eq!(summary.failed_batches, 1);
    assert_eq!(summary.processed, 25);
    assert_eq!(summary.matched, 5);
    assert_eq!(summary.persisted.written, 25);
    assert_eq!(db.get_industries(6).await.unwrap(), None);
}
