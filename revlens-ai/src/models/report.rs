//! Executive report request and result types

use revlens_common::SentimentLabel;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maximum general samples sent to the generative service
pub const MAX_GENERAL_SAMPLES: usize = 30;

/// Maximum negative-only samples sent to the generative service
pub const MAX_NEGATIVE_SAMPLES: usize = 15;

/// Grounding material for one generated report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRequest {
    pub total: usize,
    pub counts: BTreeMap<SentimentLabel, usize>,
    pub percentages: BTreeMap<SentimentLabel, f64>,
    /// First rows of the whole batch (≤ MAX_GENERAL_SAMPLES)
    pub general_samples: Vec<String>,
    /// First Negative rows (≤ MAX_NEGATIVE_SAMPLES)
    pub negative_samples: Vec<String>,
}

/// How the report text was produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportStatus {
    /// Text returned by the generative service
    Generated,
    /// Fixed message; there were no records to analyze
    NoData,
    /// Generative service failed; text is a diagnostic
    Degraded { error: String },
}

/// Executive report attached to a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportResult {
    pub text: String,
    pub is_fallback: bool,
    pub status: ReportStatus,
}

impl ReportResult {
    pub fn generated(text: String) -> Self {
        Self {
            text,
            is_fallback: false,
            status: ReportStatus::Generated,
        }
    }

    pub fn no_data(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_fallback: true,
            status: ReportStatus::NoData,
        }
    }

    pub fn degraded(text: String, error: String) -> Self {
        Self {
            text,
            is_fallback: false,
            status: ReportStatus::Degraded { error },
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self.status, ReportStatus::Degraded { .. })
    }
}
