// SqliteDatabase — rusqlite backend implementing the Database trait.
//
// The Connection is wrapped in tokio::sync::Mutex because Connection is
// !Sync. Trait methods lock, do synchronous rusqlite work, and return; the
// lock is never held across an .await.

use anyhow::Result;
use async_trait::async_trait;
use rusqlite::Connection;
use tokio::sync::Mutex;

use super::models::{Article, ArticleStats, ImportSummary, LabelUpdate, NewArticle};
use super::traits::Database;

pub struct SqliteDatabase {
    conn: Mutex<Connection>,
}

impl SqliteDatabase {
    /// Wrap an already-opened rusqlite Connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }
}

#[async_trait]
impl Database for SqliteDatabase {
    async fn table_count(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::schema::table_count(&conn)
    }

    async fn get_run_state(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().await;
        super::queries::get_run_state(&conn, key)
    }

    async fn set_run_state(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock().await;
        super::queries::set_run_state(&conn, key, value)
    }

    async fn insert_articles(&self, articles: &[NewArticle]) -> Result<ImportSummary> {
        let conn = self.conn.lock().await;
        super::queries::insert_articles(&conn, articles)
    }

    async fn count_articles(&self) -> Result<i64> {
        let conn = self.conn.lock().await;
        super::queries::count_articles(&conn)
    }

    async fn fetch_articles(&self, offset: usize, limit: usize) -> Result<Vec<Article>> {
        let conn = self.conn.lock().await;
        super::queries::fetch_articles(&conn, offset, limit)
    }

    async fn update_industries(&self, updates: &[LabelUpdate]) -> Result<usize> {
        let conn = self.conn.lock().await;
        super::queries::update_industries(&conn, updates)
    }

    async fn get_industries(&self, article_id: i64) -> Result<Option<Vec<String>>> {
        let conn = self.conn.lock().await;
        super::queries::get_industries(&conn, article_id)
    }

    async fn article_stats(&self) -> Result<ArticleStats> {
        let conn = self.conn.lock().await;
        super::queries::article_stats(&conn)
    }
}
