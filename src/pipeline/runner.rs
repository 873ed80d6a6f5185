//! Pipeline orchestrator: drives upload → extract → generate.
//!
//! [`PipelineOrchestrator`] shares the [`SharedSession`] with the UI and
//! talks to the service through `Arc<dyn CaptionService>`.
//!
//! # Pipeline flow
//!
//! ```text
//! run()
//!   └─▶ guard: video selected, nothing in flight      [UploadingVideo]
//!         └─▶ service.upload (progress → session)
//!               └─▶ service.extract_features         [ExtractingFeatures]
//!                     └─▶ service.generate_caption   [GeneratingCaption]
//!                           └─▶ caption or placeholder [Done]
//! any stage error ─────────────────────────────────────▶ [Failed]
//! ```
//!
//! Every status change is written before the stage's request is sent, and
//! the session lock is never held across an `.await`.

use std::sync::Arc;

use thiserror::Error;

use crate::service::{progress_percent, CaptionService, ProgressFn, ServiceError};

use super::state::{lock_session, PipelineStatus, SharedSession, NO_CAPTION_PLACEHOLDER};

// ---------------------------------------------------------------------------
// PipelineError
// ---------------------------------------------------------------------------

/// Errors that end (or refuse to start) a pipeline run.
///
/// Stage failures carry the upstream message verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// `run` was called with no video selected.
    #[error("Please upload a video first.")]
    NoVideoSelected,

    /// Another run is still in flight.
    #[error("Captioning is already in progress.")]
    AlreadyRunning,

    /// The upload endpoint answered with a non-2xx status.
    #[error("{0}")]
    UploadFailed(String),

    /// The feature-extraction endpoint answered with a non-2xx status.
    #[error("{0}")]
    ExtractFailed(String),

    /// The caption-generation endpoint answered with a non-2xx status.
    #[error("{0}")]
    GenerateFailed(String),

    /// A request never got a response, or the video could not be read.
    #[error("{0}")]
    Transport(String),
}

impl PipelineError {
    /// Classify a service error raised while `stage` was running.
    fn from_stage(stage: PipelineStatus, err: ServiceError) -> Self {
        match err {
            ServiceError::Status { message, .. } => match stage {
                PipelineStatus::UploadingVideo => PipelineError::UploadFailed(message),
                PipelineStatus::ExtractingFeatures => PipelineError::ExtractFailed(message),
                _ => PipelineError::GenerateFailed(message),
            },
            other => PipelineError::Transport(other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// PipelineOrchestrator
// ---------------------------------------------------------------------------

/// Drives one captioning run at a time against a [`CaptionService`].
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use video_captioner::config::AppConfig;
/// use video_captioner::pipeline::{new_shared_session, PipelineOrchestrator};
/// use video_captioner::service::HttpCaptionService;
///
/// # async fn example() {
/// let config = AppConfig::default();
/// let session = new_shared_session();
/// let service = Arc::new(HttpCaptionService::from_config(&config.service));
///
/// let orchestrator = PipelineOrchestrator::new(session, service);
/// match orchestrator.run().await {
///     Ok(caption) => println!("{caption}"),
///     Err(e) => eprintln!("{e}"),
/// }
/// # }
/// ```
pub struct PipelineOrchestrator {
    session: SharedSession,
    service: Arc<dyn CaptionService>,
}

impl PipelineOrchestrator {
    pub fn new(session: SharedSession, service: Arc<dyn CaptionService>) -> Self {
        Self { session, service }
    }

    pub fn session(&self) -> &SharedSession {
        &self.session
    }

    // -----------------------------------------------------------------------
    // Run
    // -----------------------------------------------------------------------

    /// Run all three stages for the selected video and return the caption.
    ///
    /// Refusals ([`PipelineError::NoVideoSelected`],
    /// [`PipelineError::AlreadyRunning`]) leave the session untouched.  Any
    /// other error has already been recorded in the session as `Failed`
    /// when this returns.
    pub async fn run(&self) -> Result<String, PipelineError> {
        // ── 0. Guard + enter UploadingVideo atomically ───────────────────
        let file = {
            let mut st = lock_session(&self.session);
            if st.status.is_running() {
                log::warn!("pipeline: run requested while {:?}", st.status);
                return Err(PipelineError::AlreadyRunning);
            }
            let Some(file) = st.raw_file().cloned() else {
                return Err(PipelineError::NoVideoSelected);
            };
            st.status = PipelineStatus::UploadingVideo;
            st.upload_progress_pct = 0;
            st.caption_text.clear();
            st.error_message = None;
            file
        };
        log::info!("pipeline: {} → UploadingVideo", file.name);

        // ── 1. Upload ────────────────────────────────────────────────────
        if let Err(e) = self.service.upload(&file, self.progress_callback()).await {
            return Err(self.fail(PipelineStatus::UploadingVideo, e));
        }
        self.record_progress(100);

        // ── 2. Extract features ──────────────────────────────────────────
        self.transition(PipelineStatus::ExtractingFeatures);
        if let Err(e) = self.service.extract_features(&file.name).await {
            return Err(self.fail(PipelineStatus::ExtractingFeatures, e));
        }

        // ── 3. Generate caption ──────────────────────────────────────────
        self.transition(PipelineStatus::GeneratingCaption);
        let caption = match self.service.generate_caption(&file.name).await {
            Ok(Some(caption)) if !caption.is_empty() => caption,
            Ok(_) => {
                log::warn!("pipeline: generate returned no caption for {}", file.name);
                NO_CAPTION_PLACEHOLDER.to_string()
            }
            Err(e) => return Err(self.fail(PipelineStatus::GeneratingCaption, e)),
        };

        // ── 4. Done ──────────────────────────────────────────────────────
        {
            let mut st = lock_session(&self.session);
            st.status = PipelineStatus::Done;
            st.caption_text = caption.clone();
        }
        log::info!("pipeline: {} → Done", file.name);

        Ok(caption)
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// Progress callback that folds `(sent, total)` into the session.
    fn progress_callback(&self) -> ProgressFn {
        let session = Arc::clone(&self.session);
        Arc::new(move |sent, total| {
            let pct = progress_percent(sent, total);
            let mut st = lock_session(&session);
            if st.status == PipelineStatus::UploadingVideo && pct > st.upload_progress_pct {
                st.upload_progress_pct = pct;
            }
        })
    }

    fn record_progress(&self, pct: u8) {
        let mut st = lock_session(&self.session);
        st.upload_progress_pct = st.upload_progress_pct.max(pct);
    }

    fn transition(&self, status: PipelineStatus) {
        lock_session(&self.session).status = status;
        log::info!("pipeline: → {status:?}");
    }

    fn fail(&self, stage: PipelineStatus, err: ServiceError) -> PipelineError {
        let err = PipelineError::from_stage(stage, err);
        let message = err.to_string();
        {
            let mut st = lock_session(&self.session);
            st.status = PipelineStatus::Failed;
            st.error_message = Some(message.clone());
        }
        log::error!("pipeline error during {stage:?}: {message}");
        err
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
