//! Editor host backed by an in-memory document and the terminal.
//!
//! Notifications go to stderr and Ctrl-C cancels a running request.

use std::future::Future;
use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use super::{EditorHost, HostError, Progress, Selection};

pub struct TerminalHost {
    document: Mutex<String>,
    selection: Mutex<Range<usize>>,
    error_shown: AtomicBool,
}

impl TerminalHost {
    /// Host over `document` with `chars` selected (character offsets,
    /// end exclusive). `None` selects the whole document.
    pub fn new(document: String, chars: Option<Range<usize>>) -> Result<Self, HostError> {
        let selection = match chars {
            None => 0..document.len(),
            Some(chars) => char_range_to_bytes(&document, chars)?,
        };

        Ok(Self {
            document: Mutex::new(document),
            selection: Mutex::new(selection),
            error_shown: AtomicBool::new(false),
        })
    }

    /// Current document contents.
    pub fn document(&self) -> String {
        self.document.lock().clone()
    }

    /// Whether an error notification has been shown.
    pub fn error_shown(&self) -> bool {
        self.error_shown.load(Ordering::SeqCst)
    }
}

fn char_range_to_bytes(document: &str, chars: Range<usize>) -> Result<Range<usize>, HostError> {
    let len = document.chars().count();
    if chars.start > chars.end || chars.end > len {
        return Err(HostError::InvalidRange {
            start: chars.start,
            end: chars.end,
            len,
        });
    }

    let byte_at = |n: usize| {
        document
            .char_indices()
            .nth(n)
            .map_or(document.len(), |(i, _)| i)
    };

    Ok(byte_at(chars.start)..byte_at(chars.end))
}

/// Where `selection` lands after `edit` was replaced by `len` bytes.
///
/// An edit touching the selection selects the inserted text; edits before
/// it shift it; edits after it leave it alone.
fn track_selection(selection: Range<usize>, edit: &Range<usize>, len: usize) -> Range<usize> {
    if edit.end <= selection.start && edit.end < selection.end {
        let start = selection.start - edit.len() + len;
        return start..start + selection.len();
    }
    if edit.start >= selection.end && edit.start > selection.start {
        return selection;
    }
    edit.start..edit.start + len
}

/// Registers for Ctrl-C immediately, so the process is no longer killed by
/// it once this returns. The registration lasts for the rest of the
/// process; later Ctrl-Cs are swallowed.
#[cfg(unix)]
fn interrupt_listener() -> std::io::Result<impl Future<Output = ()> + Send + 'static> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt = signal(SignalKind::interrupt())?;
    Ok(async move {
        interrupt.recv().await;
    })
}

#[cfg(windows)]
fn interrupt_listener() -> std::io::Result<impl Future<Output = ()> + Send + 'static> {
    let mut ctrl_c = tokio::signal::windows::ctrl_c()?;
    Ok(async move {
        ctrl_c.recv().await;
    })
}

impl EditorHost for TerminalHost {
    fn selection(&self) -> Option<Selection> {
        let document = self.document.lock();
        let range = self.selection.lock().clone();
        match document.get(range.clone()) {
            Some(text) => Some(Selection {
                range,
                text: text.to_string(),
            }),
            None => Some(Selection {
                range: document.len()..document.len(),
                text: String::new(),
            }),
        }
    }

    fn replace(&self, range: Range<usize>, text: &str) -> Result<(), HostError> {
        let mut document = self.document.lock();
        if range.end > document.len()
            || !document.is_char_boundary(range.start)
            || !document.is_char_boundary(range.end)
        {
            return Err(HostError::StaleRange {
                start: range.start,
                end: range.end,
            });
        }

        document.replace_range(range.clone(), text);

        let mut selection = self.selection.lock();
        *selection = track_selection(selection.clone(), &range, text.len());
        Ok(())
    }

    fn show_info(&self, message: &str) {
        eprintln!("{}", message);
    }

    fn show_error(&self, message: &str) {
        self.error_shown.store(true, Ordering::SeqCst);
        eprintln!("Error: {}", message);
    }

    fn start_progress(&self, title: &str) -> Progress {
        eprintln!("{}... (press Ctrl-C to cancel)", title);

        let cancellation = CancellationToken::new();
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            return Progress::new(cancellation);
        };

        let interrupted = match interrupt_listener() {
            Ok(interrupted) => interrupted,
            Err(err) => {
                tracing::warn!(error = %err, "Failed to listen for Ctrl-C");
                return Progress::new(cancellation);
            }
        };

        let token = cancellation.clone();
        let watcher = runtime.spawn(async move {
            interrupted.await;
            tracing::info!("Cancellation requested from terminal");
            token.cancel();
        });

        Progress::new(cancellation).on_finish(move || watcher.abort())
    }
}
