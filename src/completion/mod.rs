//! Completion request path: intents, prompt rendering, the API client and
//! the service that ties them together.

pub mod client;
pub mod error;
pub mod intent;
pub mod prompt;
pub mod service;

pub use client::{
    Choice, CompletionApi, CompletionRequest, CompletionResponse, GenerationParams, OpenAiClient,
};
pub use error::{CompletionError, MISSING_CREDENTIAL_MESSAGE, UNKNOWN_ERROR_MESSAGE};
pub use intent::{TextIntent, UnknownIntent};
pub use service::{CompletionService, RequestParams, RequestResult};
