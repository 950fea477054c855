//! Configuration resolution for revlens-ai
//!
//! Secrets resolve with ENV → TOML priority; the pipeline is assembled from
//! the resolved [`TomlConfig`].

use crate::services::{
    ClassifierAdapter, GeminiClient, HttpClassifierClient, ReportSynthesizer,
};
use crate::workflow::Pipeline;
use revlens_common::config::TomlConfig;
use revlens_common::events::EventBus;
use revlens_common::{Error, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable holding the Gemini API key
pub const GEMINI_API_KEY_ENV: &str = "REVLENS_GEMINI_API_KEY";

/// Environment variable holding the classifier bearer token
pub const CLASSIFIER_TOKEN_ENV: &str = "REVLENS_CLASSIFIER_TOKEN";

/// Gemini API key (ENV → TOML); `None` degrades every report
pub fn resolve_gemini_api_key(toml_config: &TomlConfig) -> Option<String> {
    resolve_secret(
        "Gemini API key",
        GEMINI_API_KEY_ENV,
        toml_config.generator.api_key.as_deref(),
    )
}

/// Classifier bearer token (ENV → TOML); optional for local endpoints
pub fn resolve_classifier_token(toml_config: &TomlConfig) -> Option<String> {
    resolve_secret(
        "Classifier token",
        CLASSIFIER_TOKEN_ENV,
        toml_config.classifier.api_token.as_deref(),
    )
}

fn resolve_secret(name: &str, env_var: &str, toml_value: Option<&str>) -> Option<String> {
    let env_value = std::env::var(env_var).ok().filter(|v| is_valid_key(v));
    let toml_value = toml_value.filter(|v| is_valid_key(v));

    if env_value.is_some() && toml_value.is_some() {
        warn!(
            "{} found in multiple sources: environment, TOML. Using environment (highest priority).",
            name
        );
    }

    if let Some(value) = env_value {
        info!("{} loaded from environment variable", name);
        return Some(value);
    }

    if let Some(value) = toml_value {
        info!("{} loaded from TOML config", name);
        return Some(value.to_string());
    }

    None
}

/// Non-empty, non-whitespace
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Pipeline wired to the HTTP classifier and the Gemini client
pub fn build_pipeline(toml_config: &TomlConfig, events: Option<EventBus>) -> Result<Pipeline> {
    let classifier_client = HttpClassifierClient::from_config(
        &toml_config.classifier,
        resolve_classifier_token(toml_config),
    )
    .map_err(|e| Error::Config(format!("classifier client: {}", e)))?;

    let gemini_key = resolve_gemini_api_key(toml_config);
    if gemini_key.is_none() {
        warn!(
            "Gemini API key not configured ({} or [generator].api_key); reports will be degraded",
            GEMINI_API_KEY_ENV
        );
    }
    let generator = GeminiClient::new(&toml_config.generator, gemini_key)
        .map_err(|e| Error::Config(format!("generative client: {}", e)))?;

    let classifier =
        ClassifierAdapter::from_config(Arc::new(classifier_client), &toml_config.classifier);
    let synthesizer = ReportSynthesizer::new(Arc::new(generator))
        .with_language(toml_config.report.language.clone())
        .with_timeout(Duration::from_secs(toml_config.generator.timeout_secs));

    let pipeline = Pipeline::new(classifier, synthesizer);
    Ok(match events {
        Some(bus) => pipeline.with_events(bus),
        None => pipeline,
    })
}
