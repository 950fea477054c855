//! Test Helper Utilities
//!
//! Stub collaborators for the classifier and the generative service.

#![allow(dead_code)]

use revlens_ai::services::{
    ClassificationError, ClassifierAdapter, ReportServiceError, ReportSynthesizer,
    SentimentModel, TextGenerator,
};
use revlens_ai::workflow::Pipeline;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Class index per exact text; unknown texts are Neutral (1). Counts calls.
pub struct ScriptedModel {
    indices: HashMap<String, usize>,
    calls: AtomicUsize,
}

impl ScriptedModel {
    pub fn new<'a>(pairs: impl IntoIterator<Item = (&'a str, usize)>) -> Self {
        Self {
            indices: pairs
                .into_iter()
                .map(|(text, index)| (text.to_string(), index))
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn neutral() -> Self {
        Self::new(Vec::<(&'static str, usize)>::new())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl SentimentModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn predict(&self, text: &str) -> Result<usize, ClassificationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.indices.get(text).copied().unwrap_or(1))
    }
}

/// Fails for one specific text
pub struct FailingModel {
    pub fail_on: String,
}

#[async_trait::async_trait]
impl SentimentModel for FailingModel {
    fn name(&self) -> &str {
        "failing"
    }

    async fn predict(&self, text: &str) -> Result<usize, ClassificationError> {
        if text == self.fail_on {
            Err(ClassificationError::Service("HTTP 503: model loading".to_string()))
        } else {
            Ok(2)
        }
    }
}

/// How [`RecordingGenerator`] answers
pub enum Reply {
    Text(String),
    Quota(String),
}

/// Records every prompt it receives
pub struct RecordingGenerator {
    reply: Reply,
    prompts: Mutex<Vec<String>>,
}

impl RecordingGenerator {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Reply::Text(text.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn quota_exceeded(detail: &str) -> Self {
        Self {
            reply: Reply::Quota(detail.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait::async_trait]
impl TextGenerator for RecordingGenerator {
    fn name(&self) -> &str {
        "recording"
    }

    async fn generate(&self, prompt: &str) -> Result<String, ReportServiceError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.reply {
            Reply::Text(text) => Ok(text.clone()),
            Reply::Quota(detail) => Err(ReportServiceError::QuotaExceeded(detail.clone())),
        }
    }
}

/// Pipeline over the given stubs, English reports
pub fn test_pipeline(model: Arc<dyn SentimentModel>, generator: Arc<dyn TextGenerator>) -> Pipeline {
    Pipeline::new(
        ClassifierAdapter::new(model),
        ReportSynthesizer::new(generator).with_language("English"),
    )
}

/// CSV body with a `review` column (and an unrelated `id` column)
pub fn review_csv(reviews: &[&str]) -> Vec<u8> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["id", "review"]).unwrap();
    for (i, review) in reviews.iter().enumerate() {
        writer.write_record([i.to_string().as_str(), *review]).unwrap();
    }
    writer.into_inner().unwrap()
}
