//! Configuration loading and config file resolution
//!
//! All sections are optional in the TOML file; anything missing falls back to
//! the compiled defaults below.
//!
//! ```toml
//! [classifier]
//! endpoint = "http://127.0.0.1:8080/classify"
//! concurrency = 4
//!
//! [generator]
//! model = "gemini-1.5-flash"
//! api_key = "..."
//!
//! [report]
//! language = "English"
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "REVLENS_CONFIG";

/// Top-level TOML configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TomlConfig {
    pub classifier: ClassifierConfig,
    pub generator: GeneratorConfig,
    pub report: ReportConfig,
    pub logging: LoggingConfig,
    pub server: ServerConfig,
}

/// External text-classification service settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Inference endpoint receiving `{"inputs": text}`
    pub endpoint: String,
    /// Optional bearer token
    pub api_token: Option<String>,
    /// Whitespace-word budget applied before submission
    ///
    /// The model limit (512) counts subword tokens, which run well above one
    /// per word; 350 words keeps typical English reviews under it.
    pub max_tokens: usize,
    /// Character budget applied before submission
    ///
    /// Applies to scripts written without spaces (Thai); 1000 characters
    /// keeps those under the model limit.
    pub max_chars: usize,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Number of in-flight classification requests (1 = strictly sequential)
    pub concurrency: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api-inference.huggingface.co/models/cardiffnlp/twitter-xlm-roberta-base-sentiment"
                .to_string(),
            api_token: None,
            max_tokens: 350,
            max_chars: 1000,
            timeout_secs: 30,
            concurrency: 1,
        }
    }
}

/// Generative-text (Gemini) service settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeneratorConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    /// Client-side quota guard
    pub requests_per_minute: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-1.5-flash".to_string(),
            api_key: None,
            timeout_secs: 60,
            requests_per_minute: 15,
        }
    }
}

/// Executive report settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReportConfig {
    /// Natural language the operator reads the report in
    pub language: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            language: "Thai".to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is not set (e.g. "info", "revlens_ai=debug")
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Largest accepted `/analyze` request body
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5780,
            max_body_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Config file resolution, highest priority first:
/// 1. Command-line argument
/// 2. `REVLENS_CONFIG` environment variable
/// 3. `<config_dir>/revlens/config.toml` if it exists
///
/// Returns `None` when no file applies (compiled defaults are used).
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    default_config_path().filter(|p| p.exists())
}

/// Platform config location (`~/.config/revlens/config.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("revlens").join("config.toml"))
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    let config = parse_toml_config(&content)?;
    debug!("Parsed configuration from {}", path.display());
    Ok(config)
}

/// Parse TOML config text
pub fn parse_toml_config(content: &str) -> Result<TomlConfig> {
    let config: TomlConfig =
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?;
    validate(&config)?;
    Ok(config)
}

/// Resolve and load configuration; an explicitly named file must exist
pub fn load_config(cli_arg: Option<&Path>) -> Result<TomlConfig> {
    match resolve_config_path(cli_arg) {
        Some(path) => load_toml_config(&path),
        None => {
            debug!("No config file found, using defaults");
            Ok(TomlConfig::default())
        }
    }
}

fn validate(config: &TomlConfig) -> Result<()> {
    if config.classifier.concurrency == 0 {
        return Err(Error::Config(
            "classifier.concurrency must be at least 1".to_string(),
        ));
    }
    if config.classifier.max_tokens == 0 || config.classifier.max_chars == 0 {
        return Err(Error::Config(
            "classifier.max_tokens and classifier.max_chars must be positive".to_string(),
        ));
    }
    if config.classifier.timeout_secs == 0 {
        return Err(Error::Config(
            "classifier.timeout_secs must be at least 1".to_string(),
        ));
    }
    if config.generator.timeout_secs == 0 {
        return Err(Error::Config(
            "generator.timeout_secs must be at least 1".to_string(),
        ));
    }
    if config.server.max_body_bytes == 0 {
        return Err(Error::Config(
            "server.max_body_bytes must be positive".to_string(),
        ));
    }
    if config.generator.requests_per_minute == 0 {
        return Err(Error::Config(
            "generator.requests_per_minute must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// User-Agent for outbound HTTP clients
pub fn get_user_agent() -> String {
    format!("revlens/{}", env!("CARGO_PKG_VERSION"))
}
