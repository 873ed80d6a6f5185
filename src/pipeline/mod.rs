//! Pipeline orchestrator module for the video captioner.
//!
//! This module runs the upload → extract → generate sequence and exposes
//! the shared session that the UI reads every frame.
//!
//! # Architecture
//!
//! ```text
//! "Generate" click (egui)
//!        │  tokio::spawn
//!        ▼
//! PipelineOrchestrator::run()  ← async tokio task
//!        │
//!        ├─ CaptionService::upload            → UploadingVideo (+ progress %)
//!        ├─ CaptionService::extract_features  → ExtractingFeatures
//!        └─ CaptionService::generate_caption  → GeneratingCaption → Done
//!                                               (any error → Failed)
//!
//! SharedSession (Arc<Mutex<UploadSession>>) ←─── read by egui update() each frame
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use video_captioner::config::AppConfig;
//! use video_captioner::input::{PreviewRegistry, Validator, VideoCandidate};
//! use video_captioner::pipeline::{lock_session, new_shared_session, PipelineOrchestrator};
//! use video_captioner::service::HttpCaptionService;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let session = new_shared_session();
//!     let previews = PreviewRegistry::new();
//!
//!     let candidate = VideoCandidate::from_path("dog.mp4").unwrap();
//!     lock_session(&session)
//!         .select_video(&candidate, &Validator::default(), &previews)
//!         .unwrap();
//!
//!     let service = Arc::new(HttpCaptionService::from_config(&config.service));
//!     let orchestrator = PipelineOrchestrator::new(session.clone(), service);
//!     let caption = orchestrator.run().await.unwrap();
//!     println!("{caption}");
//! }
//! ```

pub mod runner;
pub mod state;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use runner::{PipelineError, PipelineOrchestrator};
pub use state::{
    lock_session, new_shared_session, PipelineStatus, SelectedVideo, SharedSession,
    UploadSession, NO_CAPTION_PLACEHOLDER,
};
