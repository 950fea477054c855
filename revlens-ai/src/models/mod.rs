//! Data models for one analysis run

pub mod analysis_run;
pub mod report;
pub mod review;
pub mod stats;

pub use analysis_run::AnalysisRun;
pub use report::{
    ReportRequest, ReportResult, ReportStatus, MAX_GENERAL_SAMPLES, MAX_NEGATIVE_SAMPLES,
};
pub use review::{ReviewBatch, ReviewRecord};
pub use stats::{AggregateStats, Partitions};
