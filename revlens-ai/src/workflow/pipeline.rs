//! Pipeline Orchestrator
//!
//! Runs the four phases of one analysis in sequence:
//! 1. Load the review table ([`RecordLoader`])
//! 2. Label every record ([`ClassifierAdapter`])
//! 3. Aggregate counts, percentages and partitions
//! 4. Synthesize the executive report ([`ReportSynthesizer`])
//!
//! # Error Handling
//! - Load and classification failures abort the run ([`PipelineError`])
//! - Report failures never abort; the report carries the diagnostic
//!
//! # Example
//! ```rust,ignore
//! let pipeline = Pipeline::new(classifier, synthesizer);
//! let run = pipeline.run(&TableSource::File("reviews.csv".into())).await?;
//! ```

use crate::models::AnalysisRun;
use crate::services::aggregator::{aggregate, partition};
use crate::services::{
    ClassificationError, ClassifierAdapter, LoadError, RecordLoader, ReportSynthesizer,
    TableSource,
};
use chrono::Utc;
use revlens_common::events::{EventBus, PipelineEvent};
use revlens_common::SentimentLabel;
use thiserror::Error;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

/// Fatal run errors
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Classification(#[from] ClassificationError),
}

/// Analysis pipeline; immutable once built and shared between runs
pub struct Pipeline {
    loader: RecordLoader,
    classifier: ClassifierAdapter,
    synthesizer: ReportSynthesizer,
    events: Option<EventBus>,
}

impl Pipeline {
    pub fn new(classifier: ClassifierAdapter, synthesizer: ReportSynthesizer) -> Self {
        Self {
            loader: RecordLoader::new(),
            classifier,
            synthesizer,
            events: None,
        }
    }

    /// Publish progress on `events`
    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    pub fn classifier(&self) -> &ClassifierAdapter {
        &self.classifier
    }

    pub fn synthesizer(&self) -> &ReportSynthesizer {
        &self.synthesizer
    }

    /// Execute one complete run over `source`
    pub async fn run(&self, source: &TableSource) -> Result<AnalysisRun, PipelineError> {
        let run_id = Uuid::new_v4();
        let span = info_span!("analysis_run", %run_id);

        async move {
            let started_at = Utc::now();
            self.emit(PipelineEvent::RunStarted {
                run_id,
                source: source.describe(),
                timestamp: started_at,
            });

            match self.execute(run_id, started_at, source).await {
                Ok(run) => {
                    info!(
                        total = run.stats.total,
                        duration_ms = run.duration_ms(),
                        "Analysis run completed"
                    );
                    self.emit(PipelineEvent::RunCompleted {
                        run_id,
                        total: run.stats.total,
                        timestamp: run.completed_at,
                    });
                    Ok(run)
                }
                Err(e) => {
                    error!("Analysis run failed: {}", e);
                    self.emit(PipelineEvent::RunFailed {
                        run_id,
                        error: e.to_string(),
                        timestamp: Utc::now(),
                    });
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn execute(
        &self,
        run_id: Uuid,
        started_at: chrono::DateTime<Utc>,
        source: &TableSource,
    ) -> Result<AnalysisRun, PipelineError> {
        // Phase 1: load
        info!("Loading reviews from {}", source.describe());
        let mut batch = self.loader.load(source)?;
        let total = batch.len();
        self.emit(PipelineEvent::RecordsLoaded { run_id, total });

        // Phase 2: classify
        info!(
            total,
            model = self.classifier.model_name(),
            "Classifying reviews"
        );
        self.classifier
            .classify_batch(&mut batch, |row_index, label| {
                self.emit(PipelineEvent::RecordClassified {
                    run_id,
                    row_index,
                    total,
                    label,
                });
            })
            .await?;

        // Phase 3: aggregate
        let stats = aggregate(&batch);
        let partitions = partition(&batch);
        self.emit(PipelineEvent::ClassificationCompleted {
            run_id,
            positive: stats.count(SentimentLabel::Positive),
            neutral: stats.count(SentimentLabel::Neutral),
            negative: stats.count(SentimentLabel::Negative),
        });

        // Phase 4: report
        self.emit(PipelineEvent::ReportStarted { run_id });
        let report = self.synthesizer.synthesize(&batch, &stats).await;
        self.emit(PipelineEvent::ReportCompleted {
            run_id,
            is_fallback: report.is_fallback,
            degraded: report.is_degraded(),
        });

        Ok(AnalysisRun {
            run_id,
            started_at,
            completed_at: Utc::now(),
            batch,
            stats,
            partitions,
            report,
        })
    }

    fn emit(&self, event: PipelineEvent) {
        if let Some(events) = &self.events {
            events.emit_lossy(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{ReportServiceError, SentimentModel, TextGenerator};
    use std::sync::Arc;

    struct ConstantModel(usize);

    #[async_trait::async_trait]
    impl SentimentModel for ConstantModel {
        fn name(&self) -> &str {
            "constant"
        }

        async fn predict(&self, _text: &str) -> Result<usize, ClassificationError> {
            Ok(self.0)
        }
    }

    struct EchoGenerator;

    #[async_trait::async_trait]
    impl TextGenerator for EchoGenerator {
        fn name(&self) -> &str {
            "echo"
        }

        async fn generate(&self, _prompt: &str) -> Result<String, ReportServiceError> {
            Ok("report".to_string())
        }
    }

    fn pipeline(class_index: usize) -> Pipeline {
        Pipeline::new(
            ClassifierAdapter::new(Arc::new(ConstantModel(class_index))),
            ReportSynthesizer::new(Arc::new(EchoGenerator)),
        )
    }

    #[tokio::test]
    async fn test_pipeline_without_events() {
        let run = pipeline(2)
            .run(&TableSource::Bytes(b"review\ngood\nfine\n".to_vec()))
            .await
            .unwrap();

        assert_eq!(run.stats.total, 2);
        assert_eq!(run.stats.count(SentimentLabel::Positive), 2);
        assert_eq!(run.report.text, "report");
        assert!(run.completed_at >= run.started_at);
    }

    #[tokio::test]
    async fn test_schema_error_propagates() {
        let err = pipeline(2)
            .run(&TableSource::Bytes(b"comment\nx\n".to_vec()))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Load(LoadError::Schema { .. })));
    }

    #[tokio::test]
    async fn test_invalid_class_index_propagates() {
        let err = pipeline(7)
            .run(&TableSource::Bytes(b"review\nx\n".to_vec()))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Classification(_)));
        assert!(err.to_string().contains("class index 7"));
    }

    #[tokio::test]
    async fn test_events_published_in_phase_order() {
        let bus = EventBus::new(64);
        let mut rx = bus.subscribe();
        let pipeline = pipeline(0).with_events(bus);

        let run = pipeline
            .run(&TableSource::Bytes(b"review\na\nb\n".to_vec()))
            .await
            .unwrap();

        let mut types = Vec::new();
        while let Ok(event) = rx.try_recv() {
            assert_eq!(event.run_id(), run.run_id);
            types.push(event.event_type());
        }
        assert_eq!(
            types,
            vec![
                "RunStarted",
                "RecordsLoaded",
                "RecordClassified",
                "RecordClassified",
                "ClassificationCompleted",
                "ReportStarted",
                "ReportCompleted",
                "RunCompleted",
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_run_publishes_run_failed() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();
        let pipeline = pipeline(0).with_events(bus);

        let _ = pipeline
            .run(&TableSource::Bytes(b"text\nx\n".to_vec()))
            .await;

        let mut last = None;
        while let Ok(event) = rx.try_recv() {
            last = Some(event);
        }
        match last {
            Some(PipelineEvent::RunFailed { error, .. }) => assert!(error.contains("review")),
            other => panic!("expected RunFailed, got {:?}", other),
        }
    }
}
