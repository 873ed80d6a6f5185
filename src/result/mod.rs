//! Actions over a generated caption.
//!
//! * [`ResultManager`] — copy, download (text / JSON), save, clear.
//! * [`ClipboardSink`] / [`SystemClipboard`] — clipboard seam, `arboard` backed.
//! * [`render_json`] — the `captions.json` document.
//! * [`ResultError`] — per-action failures; never affect pipeline state.

pub mod clipboard;
pub mod export;
pub mod manager;

pub use clipboard::{ClipboardError, ClipboardSink, SystemClipboard};
pub use export::{render_json, write_export, JSON_EXPORT_NAME, TEXT_EXPORT_NAME};
pub use manager::{ResultManager, DEFAULT_SAVE_MESSAGE};

use thiserror::Error;

// ---------------------------------------------------------------------------
// ResultError
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResultError {
    /// The caption is empty or whitespace.
    #[error("No caption available yet.")]
    EmptyCaption,

    /// `save` needs both a filename and a caption.
    #[error("Missing filename or generated caption.")]
    MissingData,

    #[error("Save failed: {0}")]
    SaveFailed(String),

    #[error("Failed to copy caption: {0}")]
    CopyFailed(String),

    #[error("Export failed: {0}")]
    ExportFailed(String),

    /// `clear` was requested while a run is in flight.
    #[error("Captioning is in progress; wait for it to finish.")]
    PipelineRunning,
}
