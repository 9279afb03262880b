// Data models — Rust structs that map to database rows.
//
// Kept apart from the queries so the pipeline and output modules can use
// them without depending on rusqlite directly.

use serde::{Deserialize, Serialize};

/// A stored news item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub url: Option<String>,
    pub title: Option<String>,
    pub content: String,
}

/// An item to import. Items sharing a url with a stored article are skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewArticle {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: String,
}

/// Labels computed for one article, waiting to be persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelUpdate {
    pub article_id: i64,
    pub industries: Vec<String>,
}

/// Corpus-level counts for the status display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ArticleStats {
    pub total: i64,
    pub classified: i64,
    pub labelled: i64,
}

/// Outcome of an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub total: usize,
    pub inserted: usize,
    pub duplicates: usize,
}
