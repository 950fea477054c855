//! Sentiment aggregator
//!
//! Pure functions over a classified batch. Records without a label are not
//! counted (they only exist if classification was bypassed) and are reported
//! with a warning.

use crate::models::{AggregateStats, Partitions, ReviewBatch};
use revlens_common::SentimentLabel;
use std::collections::BTreeMap;
use tracing::warn;

/// Counts and percentages per label
pub fn aggregate(batch: &ReviewBatch) -> AggregateStats {
    let mut counts: BTreeMap<SentimentLabel, usize> =
        SentimentLabel::ALL.iter().map(|label| (*label, 0)).collect();

    for label in batch.iter().filter_map(|record| record.sentiment) {
        *counts.entry(label).or_insert(0) += 1;
    }

    let unclassified = batch.unclassified_count();
    if unclassified > 0 {
        warn!(unclassified, "Aggregating batch with unclassified records; they are excluded");
    }

    let total: usize = counts.values().sum();
    let percentages = counts
        .iter()
        .map(|(label, count)| (*label, percentage_of(*count, total)))
        .collect();

    AggregateStats {
        total,
        counts,
        percentages,
    }
}

/// Texts bucketed by label, row order preserved; every label has a bucket
pub fn partition(batch: &ReviewBatch) -> Partitions {
    let mut partitions: Partitions = SentimentLabel::ALL
        .iter()
        .map(|label| (*label, Vec::new()))
        .collect();

    for record in batch {
        if let Some(label) = record.sentiment {
            partitions
                .entry(label)
                .or_default()
                .push(record.raw_text.clone());
        }
    }

    partitions
}

/// `100 * count / total`, defined as 0 for an empty batch
pub fn percentage_of(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 * 100.0 / total as f64
    }
}

/// Dashboard card text, e.g. `"33.3%"`
pub fn format_percentage(percentage: f64) -> String {
    format!("{:.1}%", percentage)
}
