//! Shared test utilities and fakes.

#![allow(dead_code, unused_imports)]

pub mod mock_api;

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use text_companion::completion::{
    Choice, CompletionApi, CompletionError, CompletionRequest, CompletionResponse,
};
use text_companion::config::{ApiConfig, SecureString};
use text_companion::host::{EditorHost, HostError, Progress, Selection};

/// Text long enough to pass validation.
pub const SAMPLE_TEXT: &str = "This sentence are long enough to be rewrote by the model.";

pub fn api_config(base_url: &str) -> ApiConfig {
    ApiConfig {
        base_url: base_url.to_string(),
        model: "test-model".to_string(),
    }
}

pub fn test_key() -> SecureString {
    SecureString::new("sk-test".to_string())
}

/// Scripted reply of [`FakeApi`].
#[derive(Debug, Clone)]
pub enum FakeReply {
    Text(String),
    Failure,
}

/// In-process completion backend with scripted replies.
#[derive(Default)]
pub struct FakeApi {
    calls: AtomicUsize,
    replies: Mutex<VecDeque<(FakeReply, Duration)>>,
    prompts: Mutex<Vec<String>>,
}

impl FakeApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(&self, text: &str) {
        self.reply_after(text, Duration::ZERO);
    }

    pub fn reply_after(&self, text: &str, delay: Duration) {
        self.replies
            .lock()
            .push_back((FakeReply::Text(text.to_string()), delay));
    }

    pub fn fail(&self) {
        self.replies.lock().push_back((FakeReply::Failure, Duration::ZERO));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl CompletionApi for FakeApi {
    fn model(&self) -> &str {
        "fake-model"
    }

    async fn complete(
        &self,
        request: &CompletionRequest,
        _credential: &SecureString,
    ) -> Result<CompletionResponse, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().push(request.prompt.clone());

        let (reply, delay) = self
            .replies
            .lock()
            .pop_front()
            .unwrap_or((FakeReply::Text("Rewritten.".to_string()), Duration::ZERO));

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        match reply {
            FakeReply::Text(text) => Ok(CompletionResponse {
                choices: vec![Choice { text: Some(text) }],
            }),
            FakeReply::Failure => Err(CompletionError::ApiError {
                status: 500,
                message: "boom".to_string(),
            }),
        }
    }
}

/// Editor host that records everything the dispatcher does.
#[derive(Default)]
pub struct RecordingHost {
    pub selection: Mutex<Option<Selection>>,
    pub edits: Mutex<Vec<(Range<usize>, String)>>,
    pub errors: Mutex<Vec<String>>,
    pub infos: Mutex<Vec<String>>,
    pub progress_titles: Mutex<Vec<String>>,
    pub active_progress: Arc<AtomicUsize>,
    progress_tokens: Mutex<Vec<CancellationToken>>,
}

impl RecordingHost {
    /// Host with `text` selected at the start of a document.
    pub fn with_selection(text: &str) -> Arc<Self> {
        let host = Self::default();
        *host.selection.lock() = Some(Selection {
            range: 0..text.len(),
            text: text.to_string(),
        });
        Arc::new(host)
    }

    pub fn without_editor() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Simulate the user pressing cancel on the latest progress indicator.
    pub fn cancel_progress(&self) {
        if let Some(token) = self.progress_tokens.lock().last() {
            token.cancel();
        }
    }
}

impl EditorHost for RecordingHost {
    fn selection(&self) -> Option<Selection> {
        self.selection.lock().clone()
    }

    fn replace(&self, range: Range<usize>, text: &str) -> Result<(), HostError> {
        self.edits.lock().push((range, text.to_string()));
        Ok(())
    }

    fn show_info(&self, message: &str) {
        self.infos.lock().push(message.to_string());
    }

    fn show_error(&self, message: &str) {
        self.errors.lock().push(message.to_string());
    }

    fn start_progress(&self, title: &str) -> Progress {
        self.progress_titles.lock().push(title.to_string());
        let token = CancellationToken::new();
        self.progress_tokens.lock().push(token.clone());

        let active = Arc::clone(&self.active_progress);
        active.fetch_add(1, Ordering::SeqCst);
        Progress::new(token).on_finish(move || {
            active.fetch_sub(1, Ordering::SeqCst);
        })
    }
}
