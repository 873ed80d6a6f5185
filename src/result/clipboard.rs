//! System clipboard access backed by the `arboard` crate.
//!
//! [`SystemClipboard`] opens a short-lived [`arboard::Clipboard`] per write
//! rather than sharing one, because `arboard::Clipboard` is not `Send` on
//! all platforms and the handle is cheap to create.

use arboard::Clipboard;
use thiserror::Error;

/// Errors from a [`ClipboardSink`] write.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClipboardError {
    /// Could not open the system clipboard.
    #[error("cannot access clipboard: {0}")]
    Access(String),

    /// Could not write text to the system clipboard.
    #[error("cannot set clipboard text: {0}")]
    Set(String),
}

/// Anything that can receive caption text.
///
/// Writes are blocking; callers run them on `spawn_blocking`.
pub trait ClipboardSink: Send + Sync {
    fn set_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// The OS clipboard.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClipboard;

impl ClipboardSink for SystemClipboard {
    fn set_text(&self, text: &str) -> Result<(), ClipboardError> {
        let mut clipboard = Clipboard::new().map_err(|e| ClipboardError::Access(e.to_string()))?;
        clipboard
            .set_text(text)
            .map_err(|e| ClipboardError::Set(e.to_string()))
    }
}
