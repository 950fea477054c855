//! revlens-ai library interface
//!
//! Review sentiment analysis: load a review table, label every review,
//! aggregate the labels and write an executive report. Exposed to the CLI,
//! the HTTP service and integration tests.

pub mod api;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod models;
pub mod services;
pub mod workflow;

pub use crate::error::{ApiError, ApiResult};

use axum::extract::DefaultBodyLimit;
use axum::Router;
use chrono::{DateTime, Utc};
use revlens_common::events::EventBus;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use workflow::Pipeline;

/// Request body limit when none is configured (10 MiB)
pub const DEFAULT_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Shared, immutable analysis pipeline
    pub pipeline: Arc<Pipeline>,
    /// Event bus for SSE broadcasting
    pub event_bus: EventBus,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last classifier failure for diagnostics
    pub last_error: Arc<RwLock<Option<String>>>,
    /// Largest accepted request body in bytes
    pub body_limit: usize,
}

impl AppState {
    /// `pipeline` should publish on `event_bus` for `/events` to see its runs
    pub fn new(pipeline: Pipeline, event_bus: EventBus) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            event_bus,
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    pub fn with_body_limit(mut self, body_limit: usize) -> Self {
        self.body_limit = body_limit;
        self
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    let body_limit = state.body_limit;
    Router::new()
        .merge(api::analyze_routes())
        .merge(api::health_routes())
        .route("/events", get(api::event_stream))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
