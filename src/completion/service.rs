//! The completion request service: validate, prompt, call, clean up.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::SecureString;

use super::client::{CompletionApi, CompletionRequest, GenerationParams};
use super::error::CompletionError;
use super::intent::TextIntent;
use super::prompt::{build_prompt, clean_completion, validate};

/// Everything one request attempt needs. Built once, consumed by the call.
#[derive(Debug)]
pub struct RequestParams {
    pub intent: TextIntent,
    pub text: String,
    pub credential: SecureString,
    pub cancellation: CancellationToken,
}

/// Outcome of a request.
///
/// `Failure(None)` is a silent outcome (cancellation) that must not be
/// shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestResult {
    Success(String),
    Failure(Option<String>),
}

impl RequestResult {
    pub fn is_success(&self) -> bool {
        matches!(self, RequestResult::Success(_))
    }

    /// The message to surface, if any.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            RequestResult::Failure(Some(message)) => Some(message),
            _ => None,
        }
    }
}

impl From<CompletionError> for RequestResult {
    fn from(err: CompletionError) -> Self {
        RequestResult::Failure(err.user_message())
    }
}

impl From<Result<String, CompletionError>> for RequestResult {
    fn from(result: Result<String, CompletionError>) -> Self {
        match result {
            Ok(text) => RequestResult::Success(text),
            Err(err) => err.into(),
        }
    }
}

/// Turns a selection into rewritten text through a [`CompletionApi`].
#[derive(Clone)]
pub struct CompletionService {
    api: Arc<dyn CompletionApi>,
    params: GenerationParams,
}

impl CompletionService {
    pub fn new(api: Arc<dyn CompletionApi>) -> Self {
        Self {
            api,
            params: GenerationParams::default(),
        }
    }

    pub async fn request(&self, params: RequestParams) -> RequestResult {
        let intent = params.intent;
        let result = self.try_request(params).await;

        match &result {
            Ok(text) => tracing::info!(intent = intent.as_str(), result_len = text.len(), "Request succeeded"),
            Err(CompletionError::Cancelled) => tracing::info!(intent = intent.as_str(), "Request cancelled"),
            Err(err) => tracing::warn!(intent = intent.as_str(), kind = err.kind(), error = %err, "Request failed"),
        }

        result.into()
    }

    /// Same as [`request`](Self::request) but keeps the typed error.
    pub async fn try_request(&self, params: RequestParams) -> Result<String, CompletionError> {
        validate(&params.text)?;

        let prompt = build_prompt(params.intent, &params.text);
        let request = CompletionRequest::new(self.api.model(), prompt, self.params);

        // Dropping the losing branch aborts the HTTP call.
        let response = tokio::select! {
            biased;
            _ = params.cancellation.cancelled() => return Err(CompletionError::Cancelled),
            response = self.api.complete(&request, &params.credential) => response?,
        };

        let text = response
            .first_text()
            .filter(|text| !text.trim().is_empty())
            .ok_or(CompletionError::EmptyResponse)?;

        let cleaned = clean_completion(text);
        if cleaned.is_empty() {
            return Err(CompletionError::EmptyResponse);
        }

        Ok(cleaned)
    }
}
