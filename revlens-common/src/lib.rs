//! # RevLens Common Library
//!
//! Shared code for the RevLens crates:
//! - Error and result types
//! - TOML configuration model and config file resolution
//! - Pipeline progress events and the broadcast event bus
//! - The sentiment label vocabulary

pub mod config;
pub mod error;
pub mod events;
pub mod sentiment;

pub use error::{Error, Result};
pub use sentiment::SentimentLabel;
