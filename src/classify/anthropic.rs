//! Anthropic Messages API classifier.

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{Classifier, build_prompt, parse_classification};
use crate::config::{ANTHROPIC_VERSION, ClassifierConfig};
use crate::contact::model::{Classification, Submission};
use crate::error::ClassifyError;

const PROVIDER: &str = "anthropic";

/// Classifier backed by `POST /v1/messages`.
pub struct AnthropicClassifier {
    client: reqwest::Client,
    config: ClassifierConfig,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<RequestMessage>,
}

#[derive(Debug, Serialize)]
struct RequestMessage {
    role: &'static str,
    content: Vec<RequestContent>,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    #[serde(rename = "type")]
    kind: &'static str,
    text: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    text: Option<String>,
}

impl AnthropicClassifier {
    pub fn new(client: reqwest::Client, config: ClassifierConfig) -> Self {
        Self { client, config }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/messages", self.config.base_url.trim_end_matches('/'))
    }

    fn request_failed(reason: impl std::fmt::Display) -> ClassifyError {
        ClassifyError::RequestFailed {
            provider: PROVIDER.into(),
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
impl Classifier for AnthropicClassifier {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn classify(&self, submission: &Submission) -> Result<Classification, ClassifyError> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or_else(|| ClassifyError::NotConfigured {
                provider: PROVIDER.into(),
                key: "ANTHROPIC_API_KEY".into(),
            })?;

        let body = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            messages: vec![RequestMessage {
                role: "user",
                content: vec![RequestContent {
                    kind: "text",
                    text: build_prompt(submission),
                }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-api-key", api_key.expose_secret())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(Self::request_failed)?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(Self::request_failed(format!("status {status}: {detail}")));
        }

        let parsed: MessagesResponse = response.json().await.map_err(|e| {
            ClassifyError::InvalidResponse {
                provider: PROVIDER.into(),
                reason: e.to_string(),
            }
        })?;

        let text = parsed
            .content
            .into_iter()
            .next()
            .and_then(|block| block.text)
            .ok_or_else(|| ClassifyError::InvalidResponse {
                provider: PROVIDER.into(),
                reason: "response has no text content".into(),
            })?;

        let classification = parse_classification(&text)?;
        info!(
            model = %self.config.model,
            category = %classification.category,
            "Submission classified"
        );
        Ok(classification)
    }
}
