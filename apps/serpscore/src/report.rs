use std::fmt::Write;

use seo_analyzer::AnalysisReport;
use seo_scoring::{
    describe_meta_description, AnalysisResult, CategoryKey, ScoreDetail, ScoreRating,
};
use seo_storage::entities::AnalysisModel;

fn write_list(out: &mut String, title: &str, items: &[String]) {
    let _ = writeln!(out, "\n{}:", title);
    if items.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for item in items {
        let _ = writeln!(out, "  - {}", item);
    }
}

/// Plain text rendering of a report for the terminal.
pub fn render_report(report: &AnalysisReport) -> String {
    let result = &report.result;
    let score = &report.score;
    let mut out = String::new();

    if let Some(url) = &result.url {
        let _ = writeln!(out, "URL: {}", url);
    }
    let _ = writeln!(
        out,
        "Analysis: {} (source: {}{})",
        result.analysis_type.as_str(),
        report.source.as_str(),
        report
            .relay
            .as_ref()
            .map(|relay| format!(", relay: {}", relay))
            .unwrap_or_default()
    );
    write_analysis(&mut out, result, score);
    out
}

/// A saved record with its score rebuilt from the stored result.
pub fn render_saved(record: &AnalysisModel, result: &AnalysisResult, score: &ScoreDetail) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Saved analysis #{} ({})",
        record.id,
        record.created_at.format("%Y-%m-%d %H:%M")
    );
    let _ = writeln!(out, "URL: {}", record.url);
    let _ = writeln!(
        out,
        "Analysis: {} (score when saved: {}/100)",
        result.analysis_type.as_str(),
        record.score
    );
    write_analysis(&mut out, result, score);
    out
}

fn write_analysis(out: &mut String, result: &AnalysisResult, score: &ScoreDetail) {
    if score.is_url_only_analysis {
        let _ = writeln!(
            out,
            "Page content could not be retrieved; this analysis is based on the URL only."
        );
    }
    let _ = writeln!(
        out,
        "Overall score: {}/100 ({})",
        score.overall_score,
        ScoreRating::from_score(score.overall_score as f64).label()
    );
    let _ = writeln!(
        out,
        "Focus keyword: {}",
        if score.focus_keyword.is_empty() {
            "(none)"
        } else {
            score.focus_keyword.as_str()
        }
    );

    for key in CategoryKey::ALL {
        let category = score.scores.get(key);
        let _ = writeln!(
            out,
            "\n{} ({}%): {}/{} points, {:.0}% ({})",
            key.label(),
            key.weight(),
            category.points,
            category.max_points,
            category.score,
            ScoreRating::from_score(category.score).label()
        );
        for check in &category.details {
            let _ = writeln!(out, "  [{}] {}", if check.passed { "x" } else { " " }, check.text);
        }
    }

    write_list(out, "Primary keywords", &result.primary_keywords);
    write_list(out, "Secondary keywords", &result.secondary_keywords);
    write_list(out, "Tags", &result.tags);

    let _ = writeln!(out, "\nMeta descriptions:");
    for (index, description) in result.meta_descriptions.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {}. {}\n     {}",
            index + 1,
            description,
            describe_meta_description(description)
        );
    }

    write_list(out, "Strengths", &result.analysis.strengths);
    write_list(out, "Weaknesses", &result.analysis.weaknesses);
    write_list(out, "Recommendations", &result.recommendations);
}

/// One line per stored analysis, newest first as given.
pub fn render_history(records: &[AnalysisModel]) -> String {
    if records.is_empty() {
        return "No saved analyses.\n".to_string();
    }
    let mut out = String::new();
    for record in records {
        let _ = writeln!(
            out,
            "#{:<5} {}  {:>3}/100  {}{}",
            record.id,
            record.created_at.format("%Y-%m-%d %H:%M"),
            record.score,
            record.url,
            record
                .stored_focus_keyword()
                .map(|keyword| format!("  [{}]", keyword))
                .unwrap_or_default()
        );
    }
    out
}
