// Database trait — backend-agnostic async interface for the article store.
//
// SqliteDatabase is the shipped implementation. Methods are async so a
// network-backed store can sit behind the same interface as the
// mutex-wrapped rusqlite connection.

use anyhow::Result;
use async_trait::async_trait;

use super::models::{Article, ArticleStats, ImportSummary, LabelUpdate, NewArticle};

#[async_trait]
pub trait Database: Send + Sync {
    // --- Lifecycle ---

    /// Count the number of user-created tables in the database.
    async fn table_count(&self) -> Result<i64>;

    // --- Run state ---

    async fn get_run_state(&self, key: &str) -> Result<Option<String>>;

    async fn set_run_state(&self, key: &str, value: &str) -> Result<()>;

    // --- Articles ---

    /// Insert new articles, skipping urls that are already stored.
    async fn insert_articles(&self, articles: &[NewArticle]) -> Result<ImportSummary>;

    async fn count_articles(&self) -> Result<i64>;

    /// Fetch up to `limit` articles starting at `offset`, ordered by id.
    async fn fetch_articles(&self, offset: usize, limit: usize) -> Result<Vec<Article>>;

    /// Persist labels for a batch atomically. Returns rows changed.
    async fn update_industries(&self, updates: &[LabelUpdate]) -> Result<usize>;

    async fn get_industries(&self, article_id: i64) -> Result<Option<Vec<String>>>;

    async fn article_stats(&self) -> Result<ArticleStats>;
}
