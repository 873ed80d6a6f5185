//! Input validation for user-selected videos.
//!
//! * [`Validator`] — MIME and size checks, filename sanitisation.
//! * [`PreviewRegistry`] / [`PreviewHandle`] — revocable local preview URLs.
//! * [`ValidationError`] — why a selection was refused.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use video_captioner::input::{PreviewRegistry, Validator, VideoCandidate};
//!
//! let candidate = VideoCandidate::from_path("clips/My Holiday.mp4").unwrap();
//! let file = Validator::default().validate(&candidate).unwrap();
//! assert_eq!(file.name, "My_Holiday.mp4");
//!
//! let previews = PreviewRegistry::new();
//! let handle = previews.acquire(&file.path, &file.name);
//! println!("preview at {}", handle.url());
//! handle.release();
//! ```

pub mod preview;
pub mod validator;

pub use preview::{PreviewHandle, PreviewRegistry};
pub use validator::{mime_for_path, sanitize_filename, NormalizedFile, Validator, VideoCandidate};

use thiserror::Error;

// ---------------------------------------------------------------------------
// ValidationError
// ---------------------------------------------------------------------------

/// Reasons a file selection is refused.  None of them change the session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The MIME type does not name a video.
    #[error("Please upload a valid video file.")]
    NotVideo,

    /// The file is larger than the upload limit.
    #[error("File size exceeds {} MB limit.", .limit_bytes / (1024 * 1024))]
    TooLarge { size_bytes: u64, limit_bytes: u64 },

    /// The file could not be inspected.
    #[error("cannot read selected file: {0}")]
    Unreadable(String),

    /// A captioning run is in flight; the selection cannot be replaced.
    #[error("Captioning is in progress; wait for it to finish before choosing another video.")]
    PipelineBusy,
}
