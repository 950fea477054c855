//! HTTP API handlers for revlens-ai

pub mod analyze;
pub mod health;
pub mod sse;

pub use analyze::analyze_routes;
pub use health::health_routes;
pub use sse::event_stream;
