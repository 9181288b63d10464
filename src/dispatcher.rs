//! Maps user actions onto completion requests and applies the results.
//!
//! Exactly one request is in flight at a time. Starting a new one cancels
//! whatever is running; the cancelled request resolves to a silent failure
//! and never touches the document.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use crate::completion::{
    CompletionError, CompletionService, RequestParams, RequestResult, TextIntent,
};
use crate::config::{CredentialStore, SecureString, API_KEY_SECRET};
use crate::host::EditorHost;

pub const NO_EDITOR_MESSAGE: &str = "Found no text editor";
pub const NO_SELECTION_MESSAGE: &str = "No text selected";
pub const API_KEY_SET_MESSAGE: &str = "The API Key has been set";
pub const API_KEY_DELETED_MESSAGE: &str = "The API Key has been deleted";
pub const DELETE_API_KEY_QUESTION: &str = "Do you really want to delete the OpenAI API Key?";

struct InFlight {
    id: Uuid,
    token: CancellationToken,
}

/// Single slot holding the cancellation handle of the running request.
#[derive(Default)]
pub struct InFlightSlot {
    current: Mutex<Option<InFlight>>,
}

impl InFlightSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel the running request, if any, and install a fresh handle for `id`.
    pub fn begin(&self, id: Uuid) -> CancellationToken {
        let token = CancellationToken::new();
        let previous = self.current.lock().replace(InFlight {
            id,
            token: token.clone(),
        });

        if let Some(previous) = previous {
            tracing::info!(superseded = %previous.id, by = %id, "Cancelling previous request");
            previous.token.cancel();
        }

        token
    }

    /// Clear the slot if it still belongs to `id`.
    pub fn finish(&self, id: Uuid) {
        let mut current = self.current.lock();
        if current.as_ref().is_some_and(|f| f.id == id) {
            *current = None;
        }
    }

    /// Cancel the running request without starting another.
    pub fn cancel(&self) {
        if let Some(previous) = self.current.lock().take() {
            previous.token.cancel();
        }
    }

    pub fn is_idle(&self) -> bool {
        self.current.lock().is_none()
    }
}

pub struct Dispatcher {
    service: CompletionService,
    credentials: Arc<dyn CredentialStore>,
    host: Arc<dyn EditorHost>,
    in_flight: InFlightSlot,
}

impl Dispatcher {
    pub fn new(
        service: CompletionService,
        credentials: Arc<dyn CredentialStore>,
        host: Arc<dyn EditorHost>,
    ) -> Self {
        Self {
            service,
            credentials,
            host,
            in_flight: InFlightSlot::new(),
        }
    }

    pub fn in_flight(&self) -> &InFlightSlot {
        &self.in_flight
    }

    /// Rewrite the current selection according to `intent`.
    ///
    /// Errors with a message are shown through the host before returning.
    pub async fn run(&self, intent: TextIntent) -> RequestResult {
        let Some(selection) = self.host.selection() else {
            return self.report(RequestResult::Failure(Some(NO_EDITOR_MESSAGE.to_string())));
        };
        if selection.is_empty() {
            return self.report(RequestResult::Failure(Some(NO_SELECTION_MESSAGE.to_string())));
        }

        let progress = self.host.start_progress(intent.progress_title());
        let result = self
            .rewrite(intent, selection.text, progress.cancellation())
            .await;

        let result = match result {
            RequestResult::Success(text) => match self.host.replace(selection.range, &text) {
                Ok(()) => RequestResult::Success(text),
                Err(err) => {
                    tracing::error!(error = %err, "Failed to apply edit");
                    RequestResult::Failure(Some(format!("Failed to apply the edit: {}", err)))
                }
            },
            failure => failure,
        };
        drop(progress);

        self.report(result)
    }

    async fn rewrite(
        &self,
        intent: TextIntent,
        text: String,
        ui_cancel: &CancellationToken,
    ) -> RequestResult {
        let credential = match self.credentials.get(API_KEY_SECRET) {
            Ok(Some(credential)) => credential,
            Ok(None) => return CompletionError::MissingCredential.into(),
            Err(err) => {
                tracing::error!(error = %err, "Failed to read credential");
                return CompletionError::from(err).into();
            }
        };

        let id = Uuid::new_v4();
        let span = tracing::info_span!("request", %id, intent = intent.as_str());
        let token = self.in_flight.begin(id);

        let request = self
            .service
            .request(RequestParams {
                intent,
                text,
                credential,
                cancellation: token.clone(),
            })
            .instrument(span);
        tokio::pin!(request);

        let result = tokio::select! {
            result = &mut request => result,
            _ = ui_cancel.cancelled() => {
                token.cancel();
                request.await
            }
        };

        self.in_flight.finish(id);
        result
    }

    fn report(&self, result: RequestResult) -> RequestResult {
        if let Some(message) = result.error_message() {
            self.host.show_error(message);
        }
        result
    }

    /// Store a new API key. Blank input is ignored.
    pub fn set_api_key(&self, key: &str) -> Result<bool, CompletionError> {
        if key.trim().is_empty() {
            return Ok(false);
        }

        self.credentials
            .store(API_KEY_SECRET, SecureString::new(key.to_string()))?;
        self.host.show_info(API_KEY_SET_MESSAGE);
        Ok(true)
    }

    /// Delete the stored API key after the caller confirmed.
    pub fn delete_api_key(&self, confirmed: bool) -> Result<bool, CompletionError> {
        if !confirmed {
            return Ok(false);
        }

        self.credentials.delete(API_KEY_SECRET)?;
        self.host.show_info(API_KEY_DELETED_MESSAGE);
        Ok(true)
    }
}
