//! Copy / download / save / clear over the generated caption.
//!
//! Every action checks its inputs first and returns a [`ResultError`]
//! without touching the clipboard, the filesystem or the network when they
//! are missing.  Nothing here changes the pipeline status except `clear`.

use std::path::PathBuf;
use std::sync::Arc;

use crate::pipeline::{lock_session, SharedSession};
use crate::service::CaptionService;

use super::clipboard::ClipboardSink;
use super::export::{render_json, write_export, JSON_EXPORT_NAME, TEXT_EXPORT_NAME};
use super::ResultError;

/// Message shown after a save when the service does not provide one.
pub const DEFAULT_SAVE_MESSAGE: &str = "Saved successfully.";

fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

pub struct ResultManager {
    session: SharedSession,
    service: Arc<dyn CaptionService>,
    clipboard: Arc<dyn ClipboardSink>,
    export_dir: PathBuf,
}

impl ResultManager {
    pub fn new(
        session: SharedSession,
        service: Arc<dyn CaptionService>,
        clipboard: Arc<dyn ClipboardSink>,
        export_dir: PathBuf,
    ) -> Self {
        Self {
            session,
            service,
            clipboard,
            export_dir,
        }
    }

    pub fn export_dir(&self) -> &std::path::Path {
        &self.export_dir
    }

    /// Put `text` on the system clipboard.
    pub async fn copy_to_clipboard(&self, text: &str) -> Result<(), ResultError> {
        if is_blank(text) {
            return Err(ResultError::EmptyCaption);
        }

        let clipboard = Arc::clone(&self.clipboard);
        let text = text.to_string();
        match tokio::task::spawn_blocking(move || clipboard.set_text(&text)).await {
            Ok(Ok(())) => {
                log::info!("result: caption copied to clipboard");
                Ok(())
            }
            Ok(Err(e)) => {
                log::warn!("result: clipboard write failed: {e}");
                Err(ResultError::CopyFailed(e.to_string()))
            }
            Err(e) => Err(ResultError::CopyFailed(e.to_string())),
        }
    }

    /// Write `text` verbatim to `captions.txt` in the export directory.
    pub fn download_as_text(&self, text: &str) -> Result<PathBuf, ResultError> {
        if is_blank(text) {
            return Err(ResultError::EmptyCaption);
        }
        self.export(TEXT_EXPORT_NAME, text)
    }

    /// Write `{"caption": text}` to `captions.json` in the export directory.
    pub fn download_as_json(&self, text: &str) -> Result<PathBuf, ResultError> {
        if is_blank(text) {
            return Err(ResultError::EmptyCaption);
        }
        self.export(JSON_EXPORT_NAME, &render_json(text))
    }

    fn export(&self, name: &str, contents: &str) -> Result<PathBuf, ResultError> {
        let path = write_export(&self.export_dir, name, contents)
            .map_err(|e| ResultError::ExportFailed(e.to_string()))?;
        log::info!("result: exported {}", path.display());
        Ok(path)
    }

    /// Store `text` for `filename` on the service.
    ///
    /// Returns the service's confirmation message, or
    /// [`DEFAULT_SAVE_MESSAGE`] when it sends none.
    pub async fn save(&self, filename: &str, text: &str) -> Result<String, ResultError> {
        if filename.is_empty() || text.is_empty() {
            return Err(ResultError::MissingData);
        }

        match self.service.save_caption(filename, text).await {
            Ok(message) => {
                log::info!("result: saved caption for {filename}");
                Ok(message.unwrap_or_else(|| DEFAULT_SAVE_MESSAGE.to_string()))
            }
            Err(e) => {
                log::warn!("result: save failed for {filename}: {e}");
                Err(ResultError::SaveFailed(e.to_string()))
            }
        }
    }

    /// Release the preview and reset the whole session.
    ///
    /// The caller is responsible for emptying any file-input widget that
    /// mirrors the selection.
    pub fn clear(&self) -> Result<(), ResultError> {
        let mut st = lock_session(&self.session);
        if st.is_running() {
            return Err(ResultError::PipelineRunning);
        }
        st.reset();
        log::info!("result: session cleared");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::input::{PreviewRegistry, Validator, VideoCandidate};
    use crate::pipeline::{new_shared_session, PipelineStatus};
    use crate::result::ClipboardError;
    use crate::service::{MockCaptionService, ServiceError};

    /// Clipboard double that records writes and can be told to fail.
    #[derive(Default)]
    struct RecordingClipboard {
        writes: Mutex<Vec<String>>,
        fail: bool,
    }

    impl ClipboardSink for RecordingClipboard {
        fn set_text(&self, text: &str) -> Result<(), ClipboardError> {
            if self.fail {
                return Err(ClipboardError::Access("clipboard unavailable".into()));
            }
            self.writes.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    struct Fixture {
        manager: ResultManager,
        service: Arc<MockCaptionService>,
        clipboard: Arc<RecordingClipboard>,
        session: SharedSession,
        _dir: tempfile::TempDir,
    }

    fn fixture_with(service: MockCaptionService, clipboard: RecordingClipboard) -> Fixture {
        let dir = tempfile::tempdir().expect("temp dir");
        let session = new_shared_session();
        let service = Arc::new(service);
        let clipboard = Arc::new(clipboard);
        let manager = ResultManager::new(
            Arc::clone(&session),
            Arc::clone(&service) as Arc<dyn CaptionService>,
            Arc::clone(&clipboard) as Arc<dyn ClipboardSink>,
            dir.path().join("exports"),
        );
        Fixture {
            manager,
            service,
            clipboard,
            session,
            _dir: dir,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(MockCaptionService::ok(None), RecordingClipboard::default())
    }

    // ---- copy ---

    #[tokio::test]
    async fn copy_writes_to_clipboard() {
        let f = fixture();
        f.manager.copy_to_clipboard("A dog runs.").await.unwrap();
        assert_eq!(*f.clipboard.writes.lock().unwrap(), vec!["A dog runs."]);
    }

    #[tokio::test]
    async fn copy_of_blank_text_never_touches_clipboard() {
        let f = fixture();
        for text in ["", "   ", "\n\t"] {
            assert_eq!(
                f.manager.copy_to_clipboard(text).await,
                Err(ResultError::EmptyCaption)
            );
        }
        assert!(f.clipboard.writes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn copy_failure_is_reported() {
        let f = fixture_with(
            MockCaptionService::ok(None),
            RecordingClipboard {
                fail: true,
                ..Default::default()
            },
        );
        assert_eq!(
            f.manager.copy_to_clipboard("x").await,
            Err(ResultError::CopyFailed(
                "cannot access clipboard: clipboard unavailable".into()
            ))
        );
    }

    // ---- downloads ---

    #[test]
    fn download_text_writes_raw_caption() {
        let f = fixture();
        let path = f.manager.download_as_text("  A dog runs.\n").unwrap();
        assert_eq!(path.file_name().unwrap(), "captions.txt");
        assert_eq!(std::fs::read_to_string(path).unwrap(), "  A dog runs.\n");
    }

    #[test]
    fn download_json_writes_pretty_document() {
        let f = fixture();
        let path = f.manager.download_as_json("hello").unwrap();
        assert_eq!(path.file_name().unwrap(), "captions.json");
        assert_eq!(
            std::fs::read_to_string(path).unwrap(),
            "{\n  \"caption\": \"hello\"\n}"
        );
    }

    #[test]
    fn downloads_of_blank_text_write_nothing() {
        let f = fixture();
        assert_eq!(f.manager.download_as_text(" "), Err(ResultError::EmptyCaption));
        assert_eq!(f.manager.download_as_json(""), Err(ResultError::EmptyCaption));
        assert!(!f.manager.export_dir().exists());
    }

    #[test]
    fn download_into_unwritable_location_is_export_failure() {
        let dir = tempfile::tempdir().expect("temp dir");
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "file in the way").unwrap();

        let manager = ResultManager::new(
            new_shared_session(),
            Arc::new(MockCaptionService::ok(None)),
            Arc::new(RecordingClipboard::default()),
            blocker,
        );
        assert!(matches!(
            manager.download_as_text("x"),
            Err(ResultError::ExportFailed(_))
        ));
    }

    // ---- save ---

    #[tokio::test]
    async fn save_sends_filename_and_caption() {
        let f = fixture();
        let msg = f.manager.save("dog.mp4", "A dog runs.").await.unwrap();
        assert_eq!(msg, "Caption saved successfully");
        assert_eq!(
            f.service.saved(),
            vec![("dog.mp4".to_string(), "A dog runs.".to_string())]
        );
    }

    #[tokio::test]
    async fn save_without_message_uses_default() {
        let mut mock = MockCaptionService::ok(None);
        mock.save_result = Ok(None);
        let f = fixture_with(mock, RecordingClipboard::default());
        assert_eq!(
            f.manager.save("a.mp4", "x").await.unwrap(),
            DEFAULT_SAVE_MESSAGE
        );
    }

    #[tokio::test]
    async fn save_with_missing_data_never_calls_service() {
        let f = fixture();
        assert_eq!(f.manager.save("", "x").await, Err(ResultError::MissingData));
        assert_eq!(f.manager.save("a.mp4", "").await, Err(ResultError::MissingData));
        assert!(f.service.calls().is_empty());
    }

    #[tokio::test]
    async fn save_failure_surfaces_upstream_error() {
        let mut mock = MockCaptionService::ok(None);
        mock.save_result = Err(ServiceError::Status {
            status: 500,
            message: "Failed to save: disk full".into(),
        });
        let f = fixture_with(mock, RecordingClipboard::default());

        let err = f.manager.save("a.mp4", "x").await.unwrap_err();
        assert_eq!(err, ResultError::SaveFailed("Failed to save: disk full".into()));
        assert_eq!(err.to_string(), "Save failed: Failed to save: disk full");
    }

    #[tokio::test]
    async fn save_failure_leaves_pipeline_state_alone() {
        let mut mock = MockCaptionService::ok(None);
        mock.save_result = Err(ServiceError::Transport("connection refused".into()));
        let f = fixture_with(mock, RecordingClipboard::default());
        {
            let mut st = lock_session(&f.session);
            st.status = PipelineStatus::Done;
            st.caption_text = "A dog runs.".into();
        }

        f.manager.save("a.mp4", "A dog runs.").await.unwrap_err();

        let st = lock_session(&f.session);
        assert_eq!(st.status(), PipelineStatus::Done);
        assert_eq!(st.caption_text(), "A dog runs.");
        assert!(st.error_message().is_none());
    }

    // ---- clear ---

    #[test]
    fn clear_resets_session_and_releases_preview() {
        let f = fixture();
        let previews = PreviewRegistry::new();
        {
            let mut st = lock_session(&f.session);
            st.select_video(
                &VideoCandidate {
                    path: "/videos/a.mp4".into(),
                    original_name: "a.mp4".into(),
                    mime_type: "video/mp4".into(),
                    size_bytes: 10,
                },
                &Validator::default(),
                &previews,
            )
            .unwrap();
            st.status = PipelineStatus::Done;
            st.caption_text = "A dog runs.".into();
            st.upload_progress_pct = 100;
        }

        f.manager.clear().unwrap();

        let st = lock_session(&f.session);
        assert!(st.raw_file().is_none());
        assert!(st.preview_url().is_none());
        assert_eq!(st.upload_progress_pct(), 0);
        assert_eq!(st.status(), PipelineStatus::Idle);
        assert!(st.caption_text().is_empty());
        assert!(st.error_message().is_none());
        assert_eq!(previews.live_count(), 0);
    }

    #[test]
    fn clear_refused_while_running() {
        let f = fixture();
        lock_session(&f.session).status = PipelineStatus::GeneratingCaption;

        assert_eq!(f.manager.clear(), Err(ResultError::PipelineRunning));
        assert_eq!(
            lock_session(&f.session).status(),
            PipelineStatus::GeneratingCaption
        );
    }
}
