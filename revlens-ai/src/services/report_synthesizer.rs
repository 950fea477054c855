//! Executive report synthesizer
//!
//! Builds a grounded prompt from the aggregate statistics and bounded review
//! samples, delegates to a [`TextGenerator`], and normalizes the outcome:
//!
//! - no records: fixed fallback text, no service call
//! - service success: generated text verbatim
//! - service failure: one-line diagnostic, run continues

use crate::models::{
    AggregateStats, ReportRequest, ReportResult, ReviewBatch, MAX_GENERAL_SAMPLES,
    MAX_NEGATIVE_SAMPLES,
};
use revlens_common::SentimentLabel;
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// Report text when there is nothing to analyze
pub const NO_DATA_MESSAGE: &str = "No review data to analyze.";

/// Prefix of the diagnostic text used when the generative service fails
pub const FAILURE_PREFIX: &str = "Report generation failed";

/// Section headings requested from the generative service, in order
pub const REPORT_SECTIONS: [&str; 4] = [
    "Overall Satisfaction",
    "Recurring Themes",
    "Top 3 Urgent Issues",
    "Strategic Recommendation",
];

/// Generative service errors (never fatal to a run)
#[derive(Debug, Error)]
pub enum ReportServiceError {
    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("no response within {0:?}")]
    Timeout(Duration),

    #[error("generative service not configured: {0}")]
    NotConfigured(String),
}

/// External generative-text service
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    /// Service/model name for logs
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String, ReportServiceError>;
}

/// Bounded sampling for the prompt
pub fn build_request(batch: &ReviewBatch, stats: &AggregateStats) -> ReportRequest {
    let general_samples = batch
        .iter()
        .take(MAX_GENERAL_SAMPLES)
        .map(|record| record.raw_text.clone())
        .collect();

    let negative_samples = batch
        .texts_with_label(SentimentLabel::Negative)
        .take(MAX_NEGATIVE_SAMPLES)
        .map(str::to_string)
        .collect();

    ReportRequest {
        total: stats.total,
        counts: stats.counts.clone(),
        percentages: stats.percentages.clone(),
        general_samples,
        negative_samples,
    }
}

/// Single prompt embedding the statistics, both sample blocks and the
/// four-section instruction
pub fn render_prompt(request: &ReportRequest, language: &str) -> String {
    let mut prompt = String::new();

    prompt.push_str(
        "You are a business strategy analyst. Summarize the following customer reviews \
         for an executive audience.\n\n",
    );

    prompt.push_str("Overview:\n");
    let _ = writeln!(prompt, "- Total reviews analyzed: {}", request.total);
    for label in SentimentLabel::ALL {
        let count = request.counts.get(&label).copied().unwrap_or(0);
        let percentage = request.percentages.get(&label).copied().unwrap_or(0.0);
        let _ = writeln!(prompt, "- {}: {} ({:.1}%)", label, count, percentage);
    }

    let _ = writeln!(
        prompt,
        "\nSample reviews for identifying common themes ({} shown):",
        request.general_samples.len()
    );
    push_bullets(&mut prompt, &request.general_samples);

    let _ = writeln!(
        prompt,
        "\nNegative reviews for identifying critical issues ({} shown):",
        request.negative_samples.len()
    );
    if request.negative_samples.is_empty() {
        prompt.push_str("- None. No negative reviews were found.\n");
    } else {
        push_bullets(&mut prompt, &request.negative_samples);
    }

    let _ = writeln!(
        prompt,
        "\nWrite the report in {}. Use exactly these four sections, in this order:",
        language
    );
    let _ = writeln!(
        prompt,
        "1. {}: a short narrative of overall customer satisfaction.",
        REPORT_SECTIONS[0]
    );
    let _ = writeln!(
        prompt,
        "2. {}: keywords for the themes that recur across the reviews.",
        REPORT_SECTIONS[1]
    );
    let _ = writeln!(
        prompt,
        "3. {}: the three most urgent problems raised in the negative reviews \
         (state that there are none if no negative reviews were found).",
        REPORT_SECTIONS[2]
    );
    let _ = writeln!(
        prompt,
        "4. {}: one concrete recommendation.",
        REPORT_SECTIONS[3]
    );
    prompt.push_str("Be concise and professional.\n");

    prompt
}

fn push_bullets(prompt: &mut String, samples: &[String]) {
    for sample in samples {
        // one line per review
        let line = sample.split_whitespace().collect::<Vec<_>>().join(" ");
        let _ = writeln!(prompt, "- {}", line);
    }
}

/// Report synthesizer used by the pipeline
pub struct ReportSynthesizer {
    generator: Arc<dyn TextGenerator>,
    language: String,
    timeout: Duration,
}

impl ReportSynthesizer {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            language: "Thai".to_string(),
            timeout: Duration::from_secs(60),
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Produce the executive report; never fails
    pub async fn synthesize(&self, batch: &ReviewBatch, stats: &AggregateStats) -> ReportResult {
        if stats.total == 0 {
            info!("No records to summarize, returning fallback report");
            return ReportResult::no_data(NO_DATA_MESSAGE);
        }

        let request = build_request(batch, stats);
        let prompt = render_prompt(&request, &self.language);

        info!(
            generator = self.generator.name(),
            general_samples = request.general_samples.len(),
            negative_samples = request.negative_samples.len(),
            "Requesting executive report"
        );

        let outcome = match tokio::time::timeout(self.timeout, self.generator.generate(&prompt)).await {
            Ok(result) => result,
            Err(_) => Err(ReportServiceError::Timeout(self.timeout)),
        };

        match outcome {
            Ok(text) => ReportResult::generated(text),
            Err(err) => {
                warn!("Executive report degraded: {}", err);
                let detail = err.to_string().split_whitespace().collect::<Vec<_>>().join(" ");
                ReportResult::degraded(format!("{}: {}", FAILURE_PREFIX, detail), detail)
            }
        }
    }
}
