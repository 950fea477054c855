//! Plain-text dashboard for the CLI
//!
//! Layout, top to bottom:
//! - one percentage card per label (Positive, Neutral, Negative)
//! - a distribution bar per label
//! - the executive summary
//! - the reviews of each label, numbered from 1

use crate::models::AnalysisRun;
use crate::services::format_percentage;
use revlens_common::SentimentLabel;
use std::fmt::Write as _;

const BAR_WIDTH: usize = 40;

/// Full dashboard text for a completed run
pub fn render_dashboard(run: &AnalysisRun) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Review Sentiment Dashboard");
    let _ = writeln!(out, "==========================");
    let _ = writeln!(
        out,
        "Run {} | {} reviews | {} ms",
        run.run_id,
        run.stats.total,
        run.duration_ms()
    );
    out.push('\n');

    out.push_str(&render_cards(run));
    out.push('\n');
    out.push_str(&render_distribution(run));

    let _ = writeln!(out, "\nExecutive Summary");
    let _ = writeln!(out, "-----------------");
    let _ = writeln!(out, "{}", run.report.text.trim_end());

    for label in SentimentLabel::ALL {
        let _ = writeln!(out, "\n{} Reviews", label);
        let _ = writeln!(out, "{}", "-".repeat(label.as_str().len() + 8));
        out.push_str(&render_review_list(run, label));
    }

    out
}

/// One row of cards: label over percentage
fn render_cards(run: &AnalysisRun) -> String {
    let mut titles = String::new();
    let mut values = String::new();
    for label in SentimentLabel::ALL {
        let _ = write!(titles, "| {:^12} ", label.as_str());
        let _ = write!(values, "| {:^12} ", format_percentage(run.stats.percentage(label)));
    }
    format!("{}|\n{}|\n", titles, values)
}

fn render_distribution(run: &AnalysisRun) -> String {
    let mut out = String::new();
    for label in SentimentLabel::ALL {
        let percentage = run.stats.percentage(label);
        let filled = ((percentage / 100.0) * BAR_WIDTH as f64).round() as usize;
        let _ = writeln!(
            out,
            "{:<9} {}{} {:>4}",
            label.as_str(),
            "#".repeat(filled.min(BAR_WIDTH)),
            ".".repeat(BAR_WIDTH - filled.min(BAR_WIDTH)),
            run.stats.count(label)
        );
    }
    out
}

fn render_review_list(run: &AnalysisRun, label: SentimentLabel) -> String {
    let reviews = run.partitions.get(&label).map(Vec::as_slice).unwrap_or(&[]);
    if reviews.is_empty() {
        return "(none)\n".to_string();
    }

    let mut out = String::new();
    for (i, review) in reviews.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, review);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ReportResult, ReviewBatch};
    use crate::services::aggregator::{aggregate, partition};
    use chrono::Utc;
    use uuid::Uuid;

    fn run_with(texts_and_labels: &[(&str, SentimentLabel)], report: ReportResult) -> AnalysisRun {
        let mut batch = ReviewBatch::from_texts(texts_and_labels.iter().map(|(t, _)| *t));
        for (record, (_, label)) in batch.records_mut().iter_mut().zip(texts_and_labels) {
            record.sentiment = Some(*label);
        }
        let now = Utc::now();
        AnalysisRun {
            run_id: Uuid::new_v4(),
            started_at: now,
            completed_at: now,
            stats: aggregate(&batch),
            partitions: partition(&batch),
            batch,
            report,
        }
    }

    #[test]
    fn test_dashboard_sections() {
        use SentimentLabel::*;
        let run = run_with(
            &[
                ("Great taste", Positive),
                ("Love it", Positive),
                ("Too salty", Negative),
                ("It was ok", Neutral),
            ],
            ReportResult::generated("Overall Satisfaction: high".to_string()),
        );

        let text = render_dashboard(&run);
        assert!(text.contains("50.0%"));
        assert!(text.contains("25.0%"));
        assert!(text.contains("Overall Satisfaction: high"));
        assert!(text.contains("Positive Reviews"));
        assert!(text.contains("1. Great taste\n2. Love it\n"));
        assert!(text.contains("1. Too salty\n"));

        let positive = text.find("Positive Reviews").unwrap();
        let neutral = text.find("Neutral Reviews").unwrap();
        let negative = text.find("Negative Reviews").unwrap();
        assert!(positive < neutral && neutral < negative);
    }

    #[test]
    fn test_empty_run_shows_zero_cards_and_fallback() {
        let run = run_with(&[], ReportResult::no_data("No review data to analyze."));
        let text = render_dashboard(&run);

        assert_eq!(text.matches("0.0%").count(), 3);
        assert!(text.contains("No review data to analyze."));
        assert_eq!(text.matches("(none)").count(), 3);
    }
}
