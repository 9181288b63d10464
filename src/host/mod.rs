//! The editor-side collaborator: selection access, edits, notifications
//! and progress feedback.

pub mod input;
pub mod terminal;

use std::ops::Range;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

pub use terminal::TerminalHost;

/// Errors raised by an editor host.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("Selection {start}..{end} is outside the document ({len} characters)")]
    InvalidRange { start: usize, end: usize, len: usize },

    #[error("Range {start}..{end} does not fall on character boundaries")]
    StaleRange { start: usize, end: usize },
}

/// The current selection of the active editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Byte range of the selection within the document.
    pub range: Range<usize>,
    pub text: String,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }
}

/// A visible, cancellable progress indicator.
///
/// The host triggers [`cancellation`](Self::cancellation) when the user
/// asks to cancel. Dropping the value hides the indicator.
pub struct Progress {
    cancellation: CancellationToken,
    on_finish: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Progress {
    pub fn new(cancellation: CancellationToken) -> Self {
        Self {
            cancellation,
            on_finish: None,
        }
    }

    /// Run `f` when the indicator is dropped.
    pub fn on_finish(mut self, f: impl FnOnce() + Send + Sync + 'static) -> Self {
        self.on_finish = Some(Box::new(f));
        self
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }
}

impl Drop for Progress {
    fn drop(&mut self) {
        if let Some(f) = self.on_finish.take() {
            f();
        }
    }
}

/// Editor integration used by the dispatcher.
pub trait EditorHost: Send + Sync {
    /// Selection of the active editor, or `None` when there is no editor.
    fn selection(&self) -> Option<Selection>;

    /// Replace `range` (as captured in a [`Selection`]) with `text`.
    fn replace(&self, range: Range<usize>, text: &str) -> Result<(), HostError>;

    fn show_info(&self, message: &str);

    fn show_error(&self, message: &str);

    /// Show an indeterminate progress indicator labelled `title`.
    fn start_progress(&self, title: &str) -> Progress;
}
