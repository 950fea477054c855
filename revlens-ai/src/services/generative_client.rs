//! Gemini generative-text client
//!
//! `POST {base_url}/models/{model}:generateContent?key={api_key}` with a
//! single user turn. The reply text is the concatenation of the first
//! candidate's text parts.
//!
//! Requests pass through a client-side quota guard (requests per minute) so a
//! burst of runs does not immediately trip the service's own rate limit.

use super::report_synthesizer::{ReportServiceError, TextGenerator};
use governor::{Quota, RateLimiter};
use reqwest::{Client, StatusCode};
use revlens_common::config::{get_user_agent, GeneratorConfig};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

type DirectRateLimiter = RateLimiter<
    governor::state::direct::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// reqwest-backed [`TextGenerator`] for the Gemini API
pub struct GeminiClient {
    http_client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    rate_limiter: DirectRateLimiter,
}

impl GeminiClient {
    /// Client from generator settings; `api_key` is the resolved key
    ///
    /// A missing key is not an error here: every call then fails with
    /// [`ReportServiceError::NotConfigured`], which degrades the report.
    pub fn new(config: &GeneratorConfig, api_key: Option<String>) -> Result<Self, ReportServiceError> {
        let http_client = Client::builder()
            .user_agent(get_user_agent())
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ReportServiceError::Network(e.to_string()))?;

        let per_minute = NonZeroU32::new(config.requests_per_minute).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = RateLimiter::direct(Quota::per_minute(per_minute));

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            rate_limiter,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait::async_trait]
impl TextGenerator for GeminiClient {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String, ReportServiceError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            ReportServiceError::NotConfigured(
                "set REVLENS_GEMINI_API_KEY or [generator].api_key".to_string(),
            )
        })?;

        self.rate_limiter.until_ready().await;

        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        tracing::debug!(model = %self.model, prompt_chars = prompt.chars().count(), "Calling generative service");

        let response = self
            .http_client
            .post(self.endpoint())
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ReportServiceError::Network(format!("request timed out: {}", e.without_url()))
                } else {
                    ReportServiceError::Network(e.without_url().to_string())
                }
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ReportServiceError::Network(e.without_url().to_string()))?;

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ReportServiceError::QuotaExceeded(summarize_body(&text)));
        }
        if !status.is_success() {
            return Err(ReportServiceError::Api(status.as_u16(), summarize_body(&text)));
        }

        parse_generate_response(&text)
    }
}

/// Concatenated text of the first candidate
fn parse_generate_response(body: &str) -> Result<String, ReportServiceError> {
    let response: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| ReportServiceError::MalformedResponse(e.to_string()))?;

    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| content.parts.into_iter().filter_map(|part| part.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(ReportServiceError::MalformedResponse(
            "response contained no text".to_string(),
        ));
    }

    Ok(text)
}

/// Error message from a Gemini error body, or the raw body
fn summarize_body(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorEnvelope {
        error: ErrorBody,
    }

    #[derive(Deserialize)]
    struct ErrorBody {
        #[serde(default)]
        status: Option<String>,
        #[serde(default)]
        message: String,
    }

    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => match envelope.error.status {
            Some(status) => format!("{}: {}", status, envelope.error.message),
            None => envelope.error.message,
        },
        Err(_) => body.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_concatenates_parts_of_first_candidate() {
        let body = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "Overall Satisfaction: good. "}, {"text": "Recurring Themes: price."}]}},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]
        }"#;
        assert_eq!(
            parse_generate_response(body).unwrap(),
            "Overall Satisfaction: good. Recurring Themes: price."
        );
    }

    #[test]
    fn test_parse_rejects_empty_candidates() {
        assert!(matches!(
            parse_generate_response(r#"{"candidates": []}"#),
            Err(ReportServiceError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_generate_response(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#),
            Err(ReportServiceError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_parse_rejects_non_json() {
        assert!(matches!(
            parse_generate_response("<html>bad gateway</html>"),
            Err(ReportServiceError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_summarize_error_body() {
        let body = r#"{"error": {"code": 429, "message": "Quota exceeded for metric", "status": "RESOURCE_EXHAUSTED"}}"#;
        assert_eq!(
            summarize_body(body),
            "RESOURCE_EXHAUSTED: Quota exceeded for metric"
        );
        assert_eq!(summarize_body(" plain text "), "plain text");
    }

    #[test]
    fn test_endpoint_format() {
        let config = GeneratorConfig {
            base_url: "http://localhost:1234/v1beta/".to_string(),
            ..GeneratorConfig::default()
        };
        let client = GeminiClient::new(&config, Some("k".to_string())).unwrap();
        assert_eq!(
            client.endpoint(),
            "http://localhost:1234/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }

    #[tokio::test]
    async fn test_missing_key_is_not_configured() {
        let client = GeminiClient::new(&GeneratorConfig::default(), Some("  ".to_string())).unwrap();
        assert!(!client.is_configured());
        assert!(matches!(
            client.generate("prompt").await,
            Err(ReportServiceError::NotConfigured(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_network_error() {
        let config = GeneratorConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            ..GeneratorConfig::default()
        };
        let client = GeminiClient::new(&config, Some("k".to_string())).unwrap();
        assert!(matches!(
            client.generate("prompt").await,
            Err(ReportServiceError::Network(_))
        ));
    }
}
