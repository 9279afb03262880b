// System status display — shows DB stats, label coverage, last run time.

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use crate::db::Database;
use crate::pipeline::batch::{LAST_RUN_AT_KEY, LAST_RUN_SUMMARY_KEY};

/// Display system status to the terminal.
pub async fn show(db: &Arc<dyn Database>, db_display_path: &str) -> Result<()> {
    // Database file size
    let file_size = std::fs::metadata(db_display_path)
        .map(|m| format_bytes(m.len()))
        .unwrap_or_else(|_| "unknown".to_string());
    println!("Database: {} ({})", db_display_path, file_size);

    let stats = db.article_stats().await?;
    if stats.total == 0 {
        println!("Articles: none imported yet");
        println!("  Run `industry-tagger import <file.jsonl>` to add some");
        return Ok(());
    }

    println!(
        "Articles: {} total, {} classified, {} with at least one label",
        stats.total, stats.classified, stats.labelled
    );
    if stats.classified > 0 {
        println!(
            "  Label coverage: {:.1}%",
            stats.labelled as f64 / stats.classified as f64 * 100.0
        );
    }

    match db.get_run_state(LAST_RUN_AT_KEY).await? {
        Some(last_run) => {
            println!("Last run: {}", last_run);
            if let Some(summary) = db.get_run_state(LAST_RUN_SUMMARY_KEY).await? {
                if let Ok(value) = serde_json::from_str::<serde_json::Value>(&summary) {
                    let processed = value["processed"].as_u64().unwrap_or(0);
                    let matched = value["matched"].as_u64().unwrap_or(0);
                    println!("  {} processed, {} labelled", processed, matched);
                }
            }
        }
        None => {
            println!("Last run: never");
            println!("  Run `industry-tagger run` to label the corpus");
        }
    }

    Ok(())
}

/// Whether a database file exists at `db_path` yet.
pub fn is_initialized(db_path: &str) -> bool {
    Path::new(db_path).exists()
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
