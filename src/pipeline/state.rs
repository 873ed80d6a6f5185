//! Pipeline status machine and the shared upload session.
//!
//! [`PipelineStatus`] is the single authoritative "where are we" field.
//! Whether a run is in flight is derived from it ([`PipelineStatus::is_running`]),
//! never stored separately.
//!
//! [`UploadSession`] is everything the UI shows: the selected video and its
//! preview URL, upload progress, status, caption and error.  Its fields are
//! private to the crate; the orchestrator and result manager are the only
//! writers.
//!
//! [`SharedSession`] is a type alias for `Arc<Mutex<UploadSession>>`, cheap
//! to clone and safe to share across threads.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::input::{
    NormalizedFile, PreviewHandle, PreviewRegistry, ValidationError, Validator, VideoCandidate,
};

/// Caption used when the generate stage succeeds without a caption field.
pub const NO_CAPTION_PLACEHOLDER: &str = "No caption returned.";

// ---------------------------------------------------------------------------
// PipelineStatus
// ---------------------------------------------------------------------------

/// States of the captioning pipeline.
///
/// ```text
/// Idle ──start──▶ UploadingVideo ──2xx──▶ ExtractingFeatures ──2xx──▶ GeneratingCaption ──2xx──▶ Done
///                      │                        │                          │
///                      └────── non-2xx / transport failure ────────────────┴──▶ Failed
/// Done / Failed ──start──▶ UploadingVideo
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStatus {
    /// No run has started for the current selection.
    Idle,
    /// Stage 1: the video is being sent to the service.
    UploadingVideo,
    /// Stage 2: the service is extracting features.
    ExtractingFeatures,
    /// Stage 3: the service is generating the caption.
    GeneratingCaption,
    /// The last run produced a caption.
    Done,
    /// The last run stopped at a failed stage.
    Failed,
}

impl PipelineStatus {
    /// Returns `true` while a run is in flight.
    ///
    /// The UI uses this to disable the generate button.
    ///
    /// ```
    /// use video_captioner::pipeline::PipelineStatus;
    ///
    /// assert!(!PipelineStatus::Idle.is_running());
    /// assert!(PipelineStatus::UploadingVideo.is_running());
    /// assert!(PipelineStatus::ExtractingFeatures.is_running());
    /// assert!(PipelineStatus::GeneratingCaption.is_running());
    /// assert!(!PipelineStatus::Done.is_running());
    /// assert!(!PipelineStatus::Failed.is_running());
    /// ```
    pub fn is_running(&self) -> bool {
        !matches!(
            self,
            PipelineStatus::Idle | PipelineStatus::Done | PipelineStatus::Failed
        )
    }

    /// Short label for the status bar.
    pub fn label(&self) -> &'static str {
        match self {
            PipelineStatus::Idle => "Idle",
            PipelineStatus::UploadingVideo => "Uploading video...",
            PipelineStatus::ExtractingFeatures => "Extracting features...",
            PipelineStatus::GeneratingCaption => "Generating caption...",
            PipelineStatus::Done => "Done",
            PipelineStatus::Failed => "Error",
        }
    }
}

impl Default for PipelineStatus {
    fn default() -> Self {
        PipelineStatus::Idle
    }
}

// ---------------------------------------------------------------------------
// SelectedVideo
// ---------------------------------------------------------------------------

/// A validated video together with its live preview reference.
///
/// Keeping both in one value means the session can never hold a file
/// without a preview URL or the other way round.
#[derive(Debug)]
pub struct SelectedVideo {
    pub file: NormalizedFile,
    preview: PreviewHandle,
}

impl SelectedVideo {
    pub fn preview_url(&self) -> &str {
        self.preview.url()
    }

    fn release(self) {
        self.preview.release();
    }
}

// ---------------------------------------------------------------------------
// UploadSession
// ---------------------------------------------------------------------------

/// The single live record of one captioning attempt.
#[derive(Debug, Default)]
pub struct UploadSession {
    pub(crate) video: Option<SelectedVideo>,
    pub(crate) upload_progress_pct: u8,
    pub(crate) status: PipelineStatus,
    pub(crate) caption_text: String,
    pub(crate) error_message: Option<String>,
}

impl UploadSession {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Read access ──────────────────────────────────────────────────────

    pub fn video(&self) -> Option<&SelectedVideo> {
        self.video.as_ref()
    }

    pub fn raw_file(&self) -> Option<&NormalizedFile> {
        self.video.as_ref().map(|v| &v.file)
    }

    /// Sanitised name of the selected video, or `""` when none is selected.
    pub fn sanitized_name(&self) -> &str {
        self.raw_file().map(|f| f.name.as_str()).unwrap_or("")
    }

    pub fn preview_url(&self) -> Option<&str> {
        self.video.as_ref().map(SelectedVideo::preview_url)
    }

    pub fn upload_progress_pct(&self) -> u8 {
        self.upload_progress_pct
    }

    pub fn status(&self) -> PipelineStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status.is_running()
    }

    pub fn caption_text(&self) -> &str {
        &self.caption_text
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Human-readable status line.
    ///
    /// Running stages describe what is about to happen; `Done` shows the
    /// caption and `Failed` shows the error.
    pub fn status_text(&self) -> String {
        match self.status {
            PipelineStatus::Idle => String::new(),
            PipelineStatus::Done => self.caption_text.clone(),
            PipelineStatus::Failed => {
                format!("Error: {}", self.error_message.as_deref().unwrap_or("unknown error"))
            }
            running => running.label().to_string(),
        }
    }

    // ── Selection ────────────────────────────────────────────────────────

    /// Validate `candidate` and make it the selected video.
    ///
    /// Refused selections leave the session untouched.  On success the
    /// previous preview reference is released before the new one is
    /// acquired, and progress, status, caption and error start over.
    pub fn select_video(
        &mut self,
        candidate: &VideoCandidate,
        validator: &Validator,
        previews: &PreviewRegistry,
    ) -> Result<&NormalizedFile, ValidationError> {
        if self.is_running() {
            return Err(ValidationError::PipelineBusy);
        }
        let file = validator.validate(candidate)?;

        self.reset();
        let preview = previews.acquire(&file.path, &file.name);
        log::info!(
            "session: selected {} ({} bytes, {})",
            file.name,
            file.size_bytes,
            file.mime_type
        );

        let video = self.video.insert(SelectedVideo { file, preview });
        Ok(&video.file)
    }

    /// Release the preview reference and return every field to its initial
    /// value.
    pub(crate) fn reset(&mut self) {
        if let Some(video) = self.video.take() {
            video.release();
        }
        self.upload_progress_pct = 0;
        self.status = PipelineStatus::Idle;
        self.caption_text.clear();
        self.error_message = None;
    }
}

// ---------------------------------------------------------------------------
// SharedSession
// ---------------------------------------------------------------------------

/// Thread-safe handle to [`UploadSession`].
///
/// Lock with [`lock_session`] for a short critical section; do **not** hold
/// the lock across `.await` points.
pub type SharedSession = Arc<Mutex<UploadSession>>;

/// Construct a new [`SharedSession`] wrapping an empty [`UploadSession`].
pub fn new_shared_session() -> SharedSession {
    Arc::new(Mutex::new(UploadSession::new()))
}

/// Lock the session, recovering the data if a previous holder panicked.
pub fn lock_session(session: &SharedSession) -> MutexGuard<'_, UploadSession> {
    session.lock().unwrap_or_else(|e| e.into_inner())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
