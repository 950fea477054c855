//! Result bundle returned by the pipeline orchestrator

use super::{AggregateStats, Partitions, ReportResult, ReviewBatch};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Everything a presentation layer needs from one completed run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRun {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    /// Labeled records in input order
    pub batch: ReviewBatch,
    pub stats: AggregateStats,
    /// Texts per label for the review columns
    pub partitions: Partitions,
    pub report: ReportResult,
}

impl AnalysisRun {
    pub fn duration_ms(&self) -> i64 {
        (self.completed_at - self.started_at).num_milliseconds()
    }
}
