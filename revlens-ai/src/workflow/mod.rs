//! Analysis workflow
//!
//! One run = load → classify → aggregate → report. Progress is published as
//! [`PipelineEvent`](revlens_common::events::PipelineEvent)s on an optional
//! event bus; the result is returned directly to the caller.

pub mod pipeline;

pub use pipeline::{Pipeline, PipelineError};
