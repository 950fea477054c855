//! Sentiment classifier adapter
//!
//! Wraps an external text-classification model behind [`SentimentModel`] and
//! owns the truncation, timeout and batching policy. The model answers with
//! an ordinal class index which is mapped with a fixed convention:
//!
//! | index | label    |
//! |-------|----------|
//! | 0     | Negative |
//! | 1     | Neutral  |
//! | 2     | Positive |
//!
//! Failures are never retried: a record that cannot be classified aborts the
//! whole batch so that aggregation never sees a silently wrong label.

use crate::models::ReviewBatch;
use futures::stream::{self, StreamExt, TryStreamExt};
use revlens_common::config::ClassifierConfig;
use revlens_common::SentimentLabel;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Classifier errors (fatal to a run)
#[derive(Debug, Error)]
pub enum ClassificationError {
    #[error("Classifier service error: {0}")]
    Service(String),

    #[error("Classifier did not answer within {0:?}")]
    Timeout(Duration),

    #[error("Classifier returned class index {0}, expected 0, 1 or 2")]
    InvalidClassIndex(usize),

    #[error("Unexpected classifier response: {0}")]
    UnexpectedResponse(String),

    #[error("Classification failed at row {row_index}: {source}")]
    Row {
        row_index: usize,
        #[source]
        source: Box<ClassificationError>,
    },
}

/// External classification model
///
/// Implementations receive text already truncated to the input budget and
/// return the raw class index.
#[async_trait::async_trait]
pub trait SentimentModel: Send + Sync {
    /// Model name for logs
    fn name(&self) -> &str;

    async fn predict(&self, text: &str) -> Result<usize, ClassificationError>;
}

/// Fixed ordinal mapping from model output to label
pub fn label_from_class_index(index: usize) -> Result<SentimentLabel, ClassificationError> {
    match index {
        0 => Ok(SentimentLabel::Negative),
        1 => Ok(SentimentLabel::Neutral),
        2 => Ok(SentimentLabel::Positive),
        other => Err(ClassificationError::InvalidClassIndex(other)),
    }
}

/// Input budget applied before a text is submitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TruncationPolicy {
    /// Whitespace-delimited tokens kept
    pub max_tokens: usize,
    /// Characters kept (applies to scripts written without spaces)
    pub max_chars: usize,
}

/// Default word budget; keeps subword-tokenized English under a 512-token model limit
pub const DEFAULT_MAX_TOKENS: usize = 350;

/// Default character budget; keeps unspaced scripts (e.g. Thai) under a 512-token model limit
pub const DEFAULT_MAX_CHARS: usize = 1000;

impl Default for TruncationPolicy {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
            max_chars: DEFAULT_MAX_CHARS,
        }
    }
}

impl TruncationPolicy {
    /// Longest prefix of `text` within both budgets
    pub fn apply<'a>(&self, text: &'a str) -> &'a str {
        truncate_chars(truncate_tokens(text, self.max_tokens), self.max_chars)
    }
}

fn truncate_tokens(text: &str, max_tokens: usize) -> &str {
    let mut count = 0;
    let mut in_token = false;
    for (i, c) in text.char_indices() {
        if c.is_whitespace() {
            in_token = false;
        } else if !in_token {
            in_token = true;
            count += 1;
            if count > max_tokens {
                return text[..i].trim_end();
            }
        }
    }
    text
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

/// Classifier adapter used by the pipeline
pub struct ClassifierAdapter {
    model: Arc<dyn SentimentModel>,
    truncation: TruncationPolicy,
    timeout: Duration,
    concurrency: usize,
}

impl ClassifierAdapter {
    /// Adapter with default policy: 350 words / 1000 chars, 30 s timeout, sequential
    pub fn new(model: Arc<dyn SentimentModel>) -> Self {
        Self {
            model,
            truncation: TruncationPolicy::default(),
            timeout: Duration::from_secs(30),
            concurrency: 1,
        }
    }

    pub fn from_config(model: Arc<dyn SentimentModel>, config: &ClassifierConfig) -> Self {
        Self::new(model)
            .with_truncation(TruncationPolicy {
                max_tokens: config.max_tokens,
                max_chars: config.max_chars,
            })
            .with_timeout(Duration::from_secs(config.timeout_secs))
            .with_concurrency(config.concurrency)
    }

    pub fn with_truncation(mut self, truncation: TruncationPolicy) -> Self {
        self.truncation = truncation;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// In-flight requests during [`classify_batch`](Self::classify_batch); clamped to ≥ 1
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Classify one text
    pub async fn classify(&self, text: &str) -> Result<SentimentLabel, ClassificationError> {
        let input = self.truncation.apply(text);
        if input.len() < text.len() {
            debug!(
                original_chars = text.chars().count(),
                kept_chars = input.chars().count(),
                "Truncated review before classification"
            );
        }

        let index = tokio::time::timeout(self.timeout, self.model.predict(input))
            .await
            .map_err(|_| ClassificationError::Timeout(self.timeout))??;

        label_from_class_index(index)
    }

    /// Label every record of `batch` exactly once, in row order
    ///
    /// `on_label` observes each assigned label (row index, label) once the
    /// whole batch has been classified. On error the batch is left untouched
    /// and `on_label` is never called.
    pub async fn classify_batch<F>(
        &self,
        batch: &mut ReviewBatch,
        mut on_label: F,
    ) -> Result<(), ClassificationError>
    where
        F: FnMut(usize, SentimentLabel),
    {
        let inputs: Vec<(usize, String)> = batch
            .iter()
            .map(|record| (record.row_index, record.raw_text.clone()))
            .collect();

        let labels: Vec<SentimentLabel> = stream::iter(inputs)
            .map(|(row_index, text)| async move {
                self.classify(&text)
                    .await
                    .map_err(|source| ClassificationError::Row {
                        row_index,
                        source: Box::new(source),
                    })
            })
            .buffered(self.concurrency)
            .try_collect()
            .await?;

        for (record, label) in batch.records_mut().iter_mut().zip(labels) {
            record.sentiment = Some(label);
            on_label(record.row_index, label);
        }
        Ok(())
    }
}
