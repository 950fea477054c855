//! Aggregate sentiment statistics

use revlens_common::SentimentLabel;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Review texts bucketed by label, row order preserved within each bucket
pub type Partitions = BTreeMap<SentimentLabel, Vec<String>>;

/// Counts and percentages over one classified batch
///
/// Every label is present in both maps, with zero values where no record
/// carries that label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateStats {
    pub total: usize,
    pub counts: BTreeMap<SentimentLabel, usize>,
    /// 0.0-100.0; all zero when `total == 0`
    pub percentages: BTreeMap<SentimentLabel, f64>,
}

impl AggregateStats {
    /// Stats for an empty batch
    pub fn empty() -> Self {
        Self {
            total: 0,
            counts: SentimentLabel::ALL.iter().map(|l| (*l, 0)).collect(),
            percentages: SentimentLabel::ALL.iter().map(|l| (*l, 0.0)).collect(),
        }
    }

    pub fn count(&self, label: SentimentLabel) -> usize {
        self.counts.get(&label).copied().unwrap_or(0)
    }

    pub fn percentage(&self, label: SentimentLabel) -> f64 {
        self.percentages.get(&label).copied().unwrap_or(0.0)
    }
}

impl Default for AggregateStats {
    fn default() -> Self {
        Self::empty()
    }
}
