//! Pipeline components and their external-service clients
//!
//! Components, leaves first:
//! - [`record_loader`]: CSV table → [`ReviewBatch`](crate::models::ReviewBatch)
//! - [`classifier`]: text → sentiment label via a [`SentimentModel`]
//! - [`aggregator`]: counts, percentages and per-label partitions
//! - [`report_synthesizer`]: executive report via a [`TextGenerator`]
//!
//! Clients for the external services:
//! - [`classifier_client`]: HTTP inference endpoint
//! - [`generative_client`]: Gemini `generateContent`

pub mod aggregator;
pub mod classifier;
pub mod classifier_client;
pub mod generative_client;
pub mod record_loader;
pub mod report_synthesizer;

pub use aggregator::{aggregate, format_percentage, partition};
pub use classifier::{
    label_from_class_index, ClassificationError, ClassifierAdapter, SentimentModel,
    TruncationPolicy,
};
pub use classifier_client::HttpClassifierClient;
pub use generative_client::GeminiClient;
pub use record_loader::{LoadError, RecordLoader, TableSource, REVIEW_COLUMN};
pub use report_synthesizer::{
    build_request, render_prompt, ReportServiceError, ReportSynthesizer, TextGenerator,
    NO_DATA_MESSAGE,
};
