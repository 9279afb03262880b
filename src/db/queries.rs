// Database queries — every SQL statement the app runs lives here.

use anyhow::Result;
use rusqlite::{params, Connection, OptionalExtension};

use super::models::{Article, ArticleStats, ImportSummary, LabelUpdate, NewArticle};

// --- Run state ---

pub fn get_run_state(conn: &Connection, key: &str) -> Result<Option<String>> {
    let mut stmt = conn.prepare("SELECT value FROM run_state WHERE key = ?1")?;
    let result = stmt.query_row(params![key], |row| row.get(0)).optional()?;
    Ok(result)
}

/// Set a run state value (upsert).
pub fn set_run_state(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO run_state (key, value, updated_at)
         VALUES (?1, ?2, datetime('now'))
         ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
        params![key, value],
    )?;
    Ok(())
}

// --- Articles ---

/// Insert articles in one transaction, skipping urls already stored.
pub fn insert_articles(conn: &Connection, articles: &[NewArticle]) -> Result<ImportSummary> {
    let tx = conn.unchecked_transaction()?;
    let mut summary = ImportSummary {
        total: articles.len(),
        ..ImportSummary::default()
    };
    {
        let mut stmt = tx.prepare(
            "INSERT OR IGNORE INTO news_items (url, title, content) VALUES (?1, ?2, ?3)",
        )?;
        for article in articles {
            let changed = stmt.execute(params![article.url, article.title, article.content])?;
            if changed > 0 {
                summary.inserted += 1;
            } else {
                summary.duplicates += 1;
            }
        }
    }
    tx.commit()?;
    Ok(summary)
}

pub fn count_articles(conn: &Connection) -> Result<i64> {
    let count = conn.query_row("SELECT COUNT(*) FROM news_items", [], |row| row.get(0))?;
    Ok(count)
}

/// A page of articles ordered by id.
pub fn fetch_articles(conn: &Connection, offset: usize, limit: usize) -> Result<Vec<Article>> {
    let mut stmt = conn.prepare(
        "SELECT id, url, title, content FROM news_items ORDER BY id LIMIT ?1 OFFSET ?2",
    )?;
    let rows = stmt.query_map(params![limit as i64, offset as i64], |row| {
        Ok(Article {
            id: row.get(0)?,
            url: row.get(1)?,
            title: row.get(2)?,
            content: row.get(3)?,
        })
    })?;

    let mut articles = Vec::new();
    for row in rows {
        articles.push(row?);
    }
    Ok(articles)
}

/// Write labels for a batch atomically: either every row in the batch is
/// updated or none is. Returns the number of rows changed.
pub fn update_industries(conn: &Connection, updates: &[LabelUpdate]) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    let mut changed = 0;
    {
        let mut stmt = tx.prepare(
            "UPDATE news_items SET industries = ?1, classified_at = datetime('now') WHERE id = ?2",
        )?;
        for update in updates {
            let json = serde_json::to_string(&update.industries)?;
            changed += stmt.execute(params![json, update.article_id])?;
        }
    }
    tx.commit()?;
    Ok(changed)
}

/// Stored labels for one article; `None` until it has been classified.
pub fn get_industries(conn: &Connection, article_id: i64) -> Result<Option<Vec<String>>> {
    let mut stmt = conn.prepare("SELECT industries FROM news_items WHERE id = ?1")?;
    let result: Option<Option<String>> = stmt
        .query_row(params![article_id], |row| row.get(0))
        .optional()?;

    match result.flatten() {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

pub fn article_stats(conn: &Connection) -> Result<ArticleStats> {
    let stats = conn.query_row(
        "SELECT COUNT(*),
                COUNT(industries),
                COALESCE(SUM(CASE WHEN industries IS NOT NULL AND industries != '[]'
                                  THEN 1 ELSE 0 END), 0)
         FROM news_items",
        [],
        |row| {
            Ok(ArticleStats {
                total: row.get(0)?,
                classified: row.get(1)?,
                labelled: row.get(2)?,
            })
        },
    )?;
    Ok(stats)
}
