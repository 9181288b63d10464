//! Error types for the completion path.

use thiserror::Error;

use crate::config::CredentialError;

/// Shown for every failure the user cannot act on.
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error has occurred";

/// Shown when no API key has been stored yet.
pub const MISSING_CREDENTIAL_MESSAGE: &str =
    "You have not configured your API Key yet. Run command \"text-companion set-key\" to set an API key.";

/// Errors that can occur while rewriting a selection.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("The selected text is too short")]
    TooShort,

    #[error("The selected text is too long")]
    TooLong,

    #[error("{}", MISSING_CREDENTIAL_MESSAGE)]
    MissingCredential,

    /// Superseded by a newer request or cancelled by the user.
    #[error("Request cancelled")]
    Cancelled,

    #[error("Failed to read credential: {0}")]
    Credential(#[from] CredentialError),

    #[error("Connection failed: {0}")]
    Connection(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Empty response from API")]
    EmptyResponse,
}

impl CompletionError {
    /// Text to show the user, or `None` when nothing should be shown.
    ///
    /// Transport and protocol details collapse onto one generic message.
    pub fn user_message(&self) -> Option<String> {
        match self {
            CompletionError::TooShort
            | CompletionError::TooLong
            | CompletionError::MissingCredential => Some(self.to_string()),
            CompletionError::Cancelled => None,
            CompletionError::Credential(_)
            | CompletionError::Connection(_)
            | CompletionError::ApiError { .. }
            | CompletionError::ParseError(_)
            | CompletionError::EmptyResponse => Some(UNKNOWN_ERROR_MESSAGE.to_string()),
        }
    }

    /// Short label for log events.
    pub fn kind(&self) -> &'static str {
        match self {
            CompletionError::TooShort => "too_short",
            CompletionError::TooLong => "too_long",
            CompletionError::MissingCredential => "missing_credential",
            CompletionError::Cancelled => "cancelled",
            CompletionError::Credential(_) => "credential_error",
            CompletionError::Connection(_) => "connection_error",
            CompletionError::ApiError { .. } => "api_error",
            CompletionError::ParseError(_) => "parse_error",
            CompletionError::EmptyResponse => "empty_response",
        }
    }
}
