//! Pipeline progress events and the broadcast event bus
//!
//! Events are informational only: the pipeline never depends on anyone
//! listening, and a run's result is always returned directly to its caller.

use crate::sentiment::SentimentLabel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Progress events emitted by one analysis run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum PipelineEvent {
    /// Run accepted; nothing loaded yet
    RunStarted {
        run_id: Uuid,
        /// Human-readable description of the input (file path or "request body")
        source: String,
        timestamp: DateTime<Utc>,
    },

    /// Input table parsed and validated
    RecordsLoaded { run_id: Uuid, total: usize },

    /// One record received its label
    RecordClassified {
        run_id: Uuid,
        /// 0-based input row
        row_index: usize,
        total: usize,
        label: SentimentLabel,
    },

    /// Every record is labeled
    ClassificationCompleted {
        run_id: Uuid,
        positive: usize,
        neutral: usize,
        negative: usize,
    },

    /// Executive report requested
    ReportStarted { run_id: Uuid },

    /// Executive report available
    ReportCompleted {
        run_id: Uuid,
        is_fallback: bool,
        /// True when the generative service failed and the text is a diagnostic
        degraded: bool,
    },

    /// Run finished successfully
    RunCompleted {
        run_id: Uuid,
        total: usize,
        timestamp: DateTime<Utc>,
    },

    /// Run aborted by a fatal error (schema or classification)
    RunFailed {
        run_id: Uuid,
        error: String,
        timestamp: DateTime<Utc>,
    },
}

impl PipelineEvent {
    /// SSE event name
    pub fn event_type(&self) -> &'static str {
        match self {
            PipelineEvent::RunStarted { .. } => "RunStarted",
            PipelineEvent::RecordsLoaded { .. } => "RecordsLoaded",
            PipelineEvent::RecordClassified { .. } => "RecordClassified",
            PipelineEvent::ClassificationCompleted { .. } => "ClassificationCompleted",
            PipelineEvent::ReportStarted { .. } => "ReportStarted",
            PipelineEvent::ReportCompleted { .. } => "ReportCompleted",
            PipelineEvent::RunCompleted { .. } => "RunCompleted",
            PipelineEvent::RunFailed { .. } => "RunFailed",
        }
    }

    pub fn run_id(&self) -> Uuid {
        match self {
            PipelineEvent::RunStarted { run_id, .. }
            | PipelineEvent::RecordsLoaded { run_id, .. }
            | PipelineEvent::RecordClassified { run_id, .. }
            | PipelineEvent::ClassificationCompleted { run_id, .. }
            | PipelineEvent::ReportStarted { run_id }
            | PipelineEvent::ReportCompleted { run_id, .. }
            | PipelineEvent::RunCompleted { run_id, .. }
            | PipelineEvent::RunFailed { run_id, .. } => *run_id,
        }
    }
}

/// Broadcast bus fanning pipeline events out to SSE clients
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<PipelineEvent>,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// Slow subscribers lose the oldest events once `capacity` is exceeded.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<PipelineEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: PipelineEvent) {
        let _ = self.tx.send(event);
    }

    /// Currently connected receivers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serializes_with_type_tag() {
        let run_id = Uuid::new_v4();
        let event = PipelineEvent::RecordClassified {
            run_id,
            row_index: 2,
            total: 4,
            label: SentimentLabel::Negative,
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "RecordClassified");
        assert_eq!(json["label"], "Negative");
        assert_eq!(event.event_type(), "RecordClassified");
        assert_eq!(event.run_id(), run_id);
    }

    #[tokio::test]
    async fn test_bus_delivers_to_subscriber() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();
        let run_id = Uuid::new_v4();

        bus.emit_lossy(PipelineEvent::ReportStarted { run_id });

        let received = rx.recv().await.unwrap();
        assert_eq!(received, PipelineEvent::ReportStarted { run_id });
    }

    #[test]
    fn test_emit_without_subscribers() {
        let bus = EventBus::new(4);
        assert_eq!(bus.subscriber_count(), 0);
        bus.emit_lossy(PipelineEvent::ReportStarted { run_id: Uuid::new_v4() });

        let rx = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);
        drop(rx);
        assert_eq!(bus.subscriber_count(), 0);
    }
}
