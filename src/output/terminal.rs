// Colored terminal output for labels, score breakdowns and run reports.
//
// This module handles all terminal-specific formatting. The main.rs command
// handlers delegate here.

use std::collections::BTreeMap;

use colored::{ColoredString, Colorize};

use crate::classifier::{Confidence, IndustryMatch, ScoreBreakdown};
use crate::evaluate::EvaluationSummary;
use crate::pipeline::batch::RunSummary;
use crate::taxonomy::models::IndustryProfile;

/// Display the labels chosen for one text.
pub fn display_labels(content: &str, matches: &[IndustryMatch]) {
    println!("\n  {}", super::truncate_chars(content.trim(), 80).dimmed());

    if matches.is_empty() {
        println!("  {}", "No industry matched.".yellow());
        return;
    }

    for m in matches {
        println!(
            "  {:<24} {:>5.3}  {}",
            m.display_name,
            m.score,
            colorize_confidence(m.confidence)
        );
    }
}

/// Display the per-layer score breakdown for one industry.
pub fn display_breakdown(breakdown: &ScoreBreakdown) {
    println!(
        "\n{}",
        format!(
            "=== {} ({}) ===",
            breakdown.display_name, breakdown.industry_id
        )
        .bold()
    );

    for (layer, detail) in &breakdown.layers {
        println!(
            "  {:<24} {:>5.3}  freq {:>3}  high-value {:>2}  boost {:.2}x",
            layer.section(),
            detail.score,
            detail.total_frequency,
            detail.high_value_matches,
            detail.context_boost,
        );
        if !detail.matched.is_empty() {
            println!("    matched: {}", detail.matched.join(", ").dimmed());
        }
    }

    println!("  {}", "-".repeat(60).dimmed());
    println!("  Weighted score:  {:.3}", breakdown.aggregate);
    println!("  After rules:     {:.3}", breakdown.adjusted);
    println!("  Confidence:      {}", colorize_confidence(breakdown.confidence));
}

/// Display every industry document found and whether it is enabled.
pub fn display_industries(
    version: Option<&str>,
    available: &[String],
    enabled: &[IndustryProfile],
) {
    println!(
        "\n{}",
        format!("=== Industries ({} available) ===", available.len()).bold()
    );
    if let Some(version) = version {
        println!("  Taxonomy version: {}", version.cyan());
    }

    for id in available {
        match enabled.iter().find(|p| &p.id == id) {
            Some(profile) => println!(
                "  {} {:<20} {:<20} {} keywords",
                "*".green(),
                id,
                profile.display_name,
                profile.terms.total_keywords()
            ),
            None => println!("    {:<20} {}", id, "(disabled)".dimmed()),
        }
    }

    // Enabled in main_config.yaml but no document on disk
    for profile in enabled.iter().filter(|p| !available.contains(&p.id)) {
        println!("  {} {:<20} {}", "?".yellow(), profile.id, "(no document)".yellow());
    }
}

/// Display the result of validating every taxonomy document.
pub fn display_validation(results: &BTreeMap<String, Result<(), String>>) {
    println!("\n{}", "=== Taxonomy validation ===".bold());

    let mut failures = 0;
    for (id, result) in results {
        match result {
            Ok(()) => println!("  {} {}", "ok".green(), id),
            Err(e) => {
                failures += 1;
                println!("  {} {}: {}", "FAIL".red().bold(), id, e);
            }
        }
    }

    println!();
    if failures == 0 {
        println!("  All {} documents valid.", results.len());
    } else {
        println!("  {} of {} documents invalid.", failures, results.len());
    }
}

/// Display per-case and averaged evaluation metrics.
pub fn display_evaluation(summary: &EvaluationSummary) {
    println!(
        "\n{}",
        format!("=== Evaluation ({} cases) ===", summary.cases.len()).bold()
    );

    for case in &summary.cases {
        let mark = if case.passed() {
            "pass".green()
        } else {
            "FAIL".red().bold()
        };
        println!(
            "  {}  {:<32} P {:.2}  R {:.2}  F1 {:.2}",
            mark, case.name, case.metrics.precision, case.metrics.recall, case.metrics.f1
        );
        if !case.false_positives.is_empty() {
            println!("        unexpected: {}", case.false_positives.join(", ").yellow());
        }
        if !case.false_negatives.is_empty() {
            println!("        missed:     {}", case.false_negatives.join(", ").yellow());
        }
    }

    let avg = &summary.average;
    println!();
    println!(
        "  Average  P {:.3}  R {:.3}  F1 {:.3}  accuracy {:.3}",
        avg.precision, avg.recall, avg.f1, avg.accuracy
    );
    println!("  Passed   {}/{}", summary.passed, summary.cases.len());
}

/// Display the totals of a classification run.
pub fn display_run_summary(summary: &RunSummary) {
    println!("\n{}", "Classification complete.".bold());
    println!("  Articles:   {}", summary.total);
    println!(
        "  Labelled:   {}/{} ({:.1}%)",
        summary.matched,
        summary.processed,
        summary.match_rate()
    );
    println!("  Written:    {}", summary.persisted.written);
    if summary.persisted.skipped > 0 {
        println!(
            "  {} {} articles could not be written",
            "!".bright_red(),
            summary.persisted.skipped
        );
    }
    if summary.failed_batches > 0 {
        println!(
            "  {} {} batches failed and were dropped",
            "!".bright_red(),
            summary.failed_batches
        );
    }

    let secs = summary.elapsed.as_secs_f64();
    if secs > 0.0 {
        println!(
            "  Elapsed:    {:.1}s ({:.0} articles/s)",
            secs,
            summary.processed as f64 / secs
        );
    }
}

/// Color a confidence band for terminal display.
pub fn colorize_confidence(confidence: Confidence) -> ColoredString {
    match confidence {
        Confidence::High => confidence.as_str().green().bold(),
        Confidence::Low => confidence.as_str().yellow(),
        Confidence::None => confidence.as_str().dimmed(),
    }
}
