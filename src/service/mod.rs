//! Client side of the remote captioning service.
//!
//! * [`CaptionService`] — async trait covering every endpoint the client
//!   calls; the pipeline and result manager only see this trait.
//! * [`HttpCaptionService`] — `reqwest` implementation.
//! * [`ServiceError`] — non-2xx responses and transport failures.
//!
//! | Call | Method/Path | Request | Success body |
//! |------|-------------|---------|--------------|
//! | upload | POST `/upload` | multipart `video` | ignored |
//! | extract_features | POST `/extract_features` | `{filename}` | ignored |
//! | generate_caption | POST `/generate_caption` | `{filename}` | `{caption?}` |
//! | save_caption | POST `/save_caption` | `{filename, caption}` | `{message?}` |
//! | health | GET `/` | — | `{status?, message?}` |

pub mod client;
#[cfg(test)]
pub mod mock;

pub use client::{error_message, string_field, HttpCaptionService};
#[cfg(test)]
pub use mock::MockCaptionService;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::input::NormalizedFile;

// ---------------------------------------------------------------------------
// ServiceError
// ---------------------------------------------------------------------------

/// Errors returned by a [`CaptionService`] call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The service answered with a non-2xx status.  `message` is the body's
    /// `error` field, or a generic description when the body has none.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// The request never produced a response (connection refused, timeout…).
    #[error("{0}")]
    Transport(String),

    /// The local video could not be read for upload.
    #[error("cannot read video for upload: {0}")]
    Io(String),
}

impl From<reqwest::Error> for ServiceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ServiceError::Transport("request timed out".into())
        } else {
            ServiceError::Transport(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Progress callback
// ---------------------------------------------------------------------------

/// Upload progress callback: `(bytes_sent, bytes_total)`.
///
/// Called from whichever thread drives the request body, possibly many
/// times per second; keep it short.
pub type ProgressFn = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// Convert a byte count into a whole percentage in `0..=100`.
///
/// An empty body counts as fully sent.
///
/// ```
/// use video_captioner::service::progress_percent;
///
/// assert_eq!(progress_percent(0, 200), 0);
/// assert_eq!(progress_percent(1, 200), 1); // 0.5 rounds up
/// assert_eq!(progress_percent(200, 200), 100);
/// assert_eq!(progress_percent(0, 0), 100);
/// ```
pub fn progress_percent(sent: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    let pct = (sent as f64 * 100.0 / total as f64).round();
    pct.clamp(0.0, 100.0) as u8
}

// ---------------------------------------------------------------------------
// HealthStatus
// ---------------------------------------------------------------------------

/// Body of the service's `GET /` health check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HealthStatus {
    pub status: Option<String>,
    pub message: Option<String>,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status.as_deref() == Some("ok")
    }
}

// ---------------------------------------------------------------------------
// CaptionService trait
// ---------------------------------------------------------------------------

/// The remote captioning service, as seen by the client.
///
/// Implementors must be `Send + Sync` so they can be held behind an
/// `Arc<dyn CaptionService>` and called from spawned tasks.
#[async_trait]
pub trait CaptionService: Send + Sync {
    /// Send the video bytes as multipart field `video`, reporting progress
    /// through `on_progress` while the body is transmitted.
    async fn upload(&self, file: &NormalizedFile, on_progress: ProgressFn)
        -> Result<(), ServiceError>;

    /// Ask the service to extract features for a previously uploaded file.
    async fn extract_features(&self, filename: &str) -> Result<(), ServiceError>;

    /// Ask for a caption.  `Ok(None)` means the response had no usable
    /// `caption` field.
    async fn generate_caption(&self, filename: &str) -> Result<Option<String>, ServiceError>;

    /// Persist a caption server-side.  Returns the response's `message`.
    async fn save_caption(
        &self,
        filename: &str,
        caption: &str,
    ) -> Result<Option<String>, ServiceError>;

    /// Check that the service root answers.
    async fn health(&self) -> Result<HealthStatus, ServiceError>;
}

// Compile-time assertion: Box<dyn CaptionService> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn CaptionService>) {}
};
