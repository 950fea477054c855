//! HTTP text-classification client
//!
//! Talks to an inference endpoint in the Hugging Face style:
//! `POST {endpoint}` with `{"inputs": "<text>"}` and a bearer token when
//! configured. Accepted response shapes:
//!
//! - `[[{"label": "LABEL_2", "score": 0.91}, ...]]`
//! - `[{"label": "positive", "score": 0.91}, ...]`
//! - `{"label_index": 2}`
//!
//! The highest-scoring label is converted back to the model's class index.

use super::classifier::{ClassificationError, SentimentModel};
use reqwest::Client;
use revlens_common::config::{get_user_agent, ClassifierConfig};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
    Index { label_index: usize },
}

/// reqwest-backed [`SentimentModel`]
pub struct HttpClassifierClient {
    http_client: Client,
    endpoint: String,
    api_token: Option<String>,
}

impl HttpClassifierClient {
    pub fn new(endpoint: impl Into<String>, api_token: Option<String>) -> Result<Self, ClassificationError> {
        let http_client = Client::builder()
            .user_agent(get_user_agent())
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| ClassificationError::Service(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into(),
            api_token,
        })
    }

    /// Client for the configured endpoint; `api_token` is the resolved token
    pub fn from_config(
        config: &ClassifierConfig,
        api_token: Option<String>,
    ) -> Result<Self, ClassificationError> {
        Self::new(config.endpoint.clone(), api_token)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl SentimentModel for HttpClassifierClient {
    fn name(&self) -> &str {
        &self.endpoint
    }

    async fn predict(&self, text: &str) -> Result<usize, ClassificationError> {
        let mut request = self
            .http_client
            .post(&self.endpoint)
            .json(&InferenceRequest { inputs: text });
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ClassificationError::Service(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClassificationError::Service(format!(
                "HTTP {}: {}",
                status.as_u16(),
                body.trim()
            )));
        }

        let body: InferenceResponse = response
            .json()
            .await
            .map_err(|e| ClassificationError::UnexpectedResponse(e.to_string()))?;

        let index = class_index_from_response(body)?;
        tracing::debug!(class_index = index, "Classifier response received");
        Ok(index)
    }
}

fn class_index_from_response(response: InferenceResponse) -> Result<usize, ClassificationError> {
    let scores = match response {
        InferenceResponse::Index { label_index } => return Ok(label_index),
        InferenceResponse::Flat(scores) => scores,
        InferenceResponse::Nested(mut batches) => {
            if batches.is_empty() {
                Vec::new()
            } else {
                batches.swap_remove(0)
            }
        }
    };

    let best = scores
        .iter()
        .max_by(|a, b| a.score.total_cmp(&b.score))
        .ok_or_else(|| ClassificationError::UnexpectedResponse("empty score list".to_string()))?;

    class_index_from_label(&best.label)
}

/// `LABEL_n` → n; `negative` / `neutral` / `positive` → 0 / 1 / 2
fn class_index_from_label(label: &str) -> Result<usize, ClassificationError> {
    if let Some(n) = label.strip_prefix("LABEL_") {
        return n
            .parse::<usize>()
            .map_err(|_| ClassificationError::UnexpectedResponse(format!("bad label '{}'", label)));
    }

    match label.trim().to_ascii_lowercase().as_str() {
        "negative" => Ok(0),
        "neutral" => Ok(1),
        "positive" => Ok(2),
        _ => Err(ClassificationError::UnexpectedResponse(format!(
            "unknown label '{}'",
            label
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<usize, ClassificationError> {
        let response: InferenceResponse = serde_json::from_str(json).unwrap();
        class_index_from_response(response)
    }

    #[test]
    fn test_nested_scores_pick_highest() {
        let json = r#"[[{"label":"LABEL_0","score":0.1},{"label":"LABEL_2","score":0.7},{"label":"LABEL_1","score":0.2}]]"#;
        assert_eq!(parse(json).unwrap(), 2);
    }

    #[test]
    fn test_flat_named_labels() {
        let json = r#"[{"label":"Negative","score":0.8},{"label":"Positive","score":0.2}]"#;
        assert_eq!(parse(json).unwrap(), 0);
    }

    #[test]
    fn test_explicit_index() {
        assert_eq!(parse(r#"{"label_index": 1}"#).unwrap(), 1);
    }

    #[test]
    fn test_empty_scores_rejected() {
        assert!(matches!(
            parse("[[]]"),
            Err(ClassificationError::UnexpectedResponse(_))
        ));
        assert!(matches!(
            parse("[]"),
            Err(ClassificationError::UnexpectedResponse(_))
        ));
    }

    #[test]
    fn test_unknown_label_rejected() {
        assert!(class_index_from_label("mixed").is_err());
        assert!(class_index_from_label("LABEL_x").is_err());
        assert_eq!(class_index_from_label("LABEL_1").unwrap(), 1);
    }

    #[test]
    fn test_client_creation() {
        let client = HttpClassifierClient::from_config(&ClassifierConfig::default(), None).unwrap();
        assert!(client.endpoint().contains("twitter-xlm-roberta-base-sentiment"));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_service_error() {
        // Port 9 (discard) on localhost is not expected to run an HTTP server
        let client = HttpClassifierClient::new("http://127.0.0.1:9/classify", None).unwrap();
        let result = client.predict("hello").await;
        assert!(matches!(result, Err(ClassificationError::Service(_))));
    }
}
