//! Client for the text-completion endpoint.
//!
//! Speaks the OpenAI-style `/v1/completions` wire format.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::config::{ApiConfig, SecureString};

use super::error::CompletionError;

/// Maximum number of tokens in the response.
pub const MAX_RESPONSE_TOKENS: u32 = 1000;

/// Fixed sampling parameters sent with every request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_tokens: MAX_RESPONSE_TOKENS,
            temperature: 0.9,
            top_p: 0.5,
            frequency_penalty: 0.5,
            presence_penalty: 0.0,
        }
    }
}

/// Completions API request format.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub frequency_penalty: f32,
    pub presence_penalty: f32,
}

impl CompletionRequest {
    pub fn new(model: &str, prompt: String, params: GenerationParams) -> Self {
        Self {
            model: model.to_string(),
            prompt,
            max_tokens: params.max_tokens,
            temperature: params.temperature,
            top_p: params.top_p,
            frequency_penalty: params.frequency_penalty,
            presence_penalty: params.presence_penalty,
        }
    }
}

/// Completions API response format.
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

/// One candidate completion.
#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub text: Option<String>,
}

impl CompletionResponse {
    /// Text of the first candidate, if the API returned one.
    pub fn first_text(&self) -> Option<&str> {
        self.choices.first().and_then(|c| c.text.as_deref())
    }
}

/// A completion backend.
///
/// The returned future is the request's only suspension point; dropping it
/// must abort the underlying call.
#[async_trait]
pub trait CompletionApi: Send + Sync {
    /// Model identifier used when building requests.
    fn model(&self) -> &str;

    async fn complete(
        &self,
        request: &CompletionRequest,
        credential: &SecureString,
    ) -> Result<CompletionResponse, CompletionError>;
}

/// HTTP client for OpenAI-compatible completion endpoints.
pub struct OpenAiClient {
    client: Client,
    config: ApiConfig,
}

impl OpenAiClient {
    pub fn new(config: ApiConfig) -> Result<Self, CompletionError> {
        let client = Client::builder().build()?;
        Ok(Self { client, config })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/completions", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl CompletionApi for OpenAiClient {
    fn model(&self) -> &str {
        &self.config.model
    }

    async fn complete(
        &self,
        request: &CompletionRequest,
        credential: &SecureString,
    ) -> Result<CompletionResponse, CompletionError> {
        let url = self.endpoint();

        tracing::debug!(
            url = %url,
            model = %request.model,
            prompt_len = request.prompt.len(),
            "Sending completion request"
        );

        let start = Instant::now();
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", credential.expose()))
            .json(request)
            .send()
            .await?;

        let latency_ms = millis(start.elapsed());
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());

            tracing::error!(
                status = %status,
                latency_ms,
                error = %error_text,
                "Completion API error"
            );

            return Err(CompletionError::ApiError {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let response_text = response.text().await?;
        let body: CompletionResponse = serde_json::from_str(&response_text).map_err(|e| {
            CompletionError::ParseError(format!("Failed to parse response JSON: {}", e))
        })?;

        tracing::debug!(
            status = %status,
            latency_ms,
            choices = body.choices.len(),
            "Completion response received"
        );

        Ok(body)
    }
}

/// Whole milliseconds in `elapsed`, saturating at `u64::MAX`.
fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
