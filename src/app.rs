//! Video captioner window: egui/eframe application.
//!
//! # Architecture
//!
//! [`CaptionApp`] is the top-level [`eframe::App`].  It owns no pipeline
//! state of its own: every frame it snapshots the [`SharedSession`] and
//! renders it.  User actions are dispatched as tasks on the tokio runtime;
//! their outcomes come back over `notice_rx` as [`UiNotice`]s, which are
//! shown as a blocking notice window until dismissed.
//!
//! | Section | Content |
//! |---------|---------|
//! | Upload | path field, drag-and-drop, progress bar, preview link |
//! | Generate | button, disabled while a run is in flight |
//! | Result | status text / caption, copy |
//! | Export | download as text / JSON |
//! | Session | clear, save |

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use eframe::egui;
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::config::AppConfig;
use crate::input::{PreviewRegistry, Validator, VideoCandidate};
use crate::pipeline::{lock_session, PipelineError, PipelineOrchestrator, PipelineStatus, SharedSession};
use crate::result::ResultManager;
use crate::service::CaptionService;

// ---------------------------------------------------------------------------
// UiNotice
// ---------------------------------------------------------------------------

/// Outcome of a background action, delivered to the UI thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiNotice {
    /// An action succeeded; show `message`.
    Info(String),
    /// An action was refused or failed; show `message`.
    Error(String),
    /// Result of the startup health check (settings panel only).
    Health(String),
}

// ---------------------------------------------------------------------------
// SessionView
// ---------------------------------------------------------------------------

/// Copy of the session fields a frame needs, taken under one short lock.
struct SessionView {
    status: PipelineStatus,
    status_text: String,
    progress_pct: u8,
    file_name: String,
    preview_url: Option<String>,
    caption: String,
}

impl SessionView {
    fn capture(session: &SharedSession) -> Self {
        let st = lock_session(session);
        Self {
            status: st.status(),
            status_text: st.status_text(),
            progress_pct: st.upload_progress_pct(),
            file_name: st.sanitized_name().to_string(),
            preview_url: st.preview_url().map(str::to_string),
            caption: st.caption_text().to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// CaptionApp
// ---------------------------------------------------------------------------

/// The captioning window, run by eframe.
pub struct CaptionApp {
    // ── Core ─────────────────────────────────────────────────────────────
    session: SharedSession,
    orchestrator: Arc<PipelineOrchestrator>,
    results: Arc<ResultManager>,
    service: Arc<dyn CaptionService>,
    validator: Validator,
    previews: PreviewRegistry,

    // ── Async plumbing ───────────────────────────────────────────────────
    runtime: Handle,
    notice_tx: mpsc::Sender<UiNotice>,
    notice_rx: mpsc::Receiver<UiNotice>,

    // ── UI state ─────────────────────────────────────────────────────────
    /// Mirrors the selected file; emptied by Clear.
    path_input: String,
    /// Notice currently on screen.
    notice: Option<UiNotice>,
    show_settings: bool,
    health: Option<String>,
    health_requested: bool,

    config: AppConfig,
}

impl CaptionApp {
    pub fn new(
        session: SharedSession,
        service: Arc<dyn CaptionService>,
        results: Arc<ResultManager>,
        previews: PreviewRegistry,
        runtime: Handle,
        config: AppConfig,
    ) -> Self {
        let (notice_tx, notice_rx) = mpsc::channel(32);
        let orchestrator = Arc::new(PipelineOrchestrator::new(
            Arc::clone(&session),
            Arc::clone(&service),
        ));

        Self {
            session,
            orchestrator,
            results,
            service,
            validator: Validator::new(config.upload.max_size_bytes),
            previews,
            runtime,
            notice_tx,
            notice_rx,
            path_input: String::new(),
            notice: None,
            show_settings: false,
            health: None,
            health_requested: false,
            config,
        }
    }

    // ── Channel polling ──────────────────────────────────────────────────

    /// Drain pending notices (non-blocking).  Only one notice is shown at a
    /// time; later ones replace it.
    fn poll_notices(&mut self) {
        while let Ok(notice) = self.notice_rx.try_recv() {
            match notice {
                UiNotice::Health(status) => self.health = Some(status),
                other => self.notice = Some(other),
            }
        }
    }

    /// Spawn `task` on the runtime; its notice is delivered and a repaint
    /// requested when it finishes.
    fn dispatch<F>(&self, ctx: &egui::Context, task: F)
    where
        F: std::future::Future<Output = Option<UiNotice>> + Send + 'static,
    {
        let tx = self.notice_tx.clone();
        let ctx = ctx.clone();
        self.runtime.spawn(async move {
            if let Some(notice) = task.await {
                let _ = tx.send(notice).await;
            }
            ctx.request_repaint();
        });
    }

    fn check_health(&mut self, ctx: &egui::Context) {
        if self.health_requested {
            return;
        }
        self.health_requested = true;

        let service = Arc::clone(&self.service);
        self.dispatch(ctx, async move {
            let text = match service.health().await {
                Ok(h) if h.is_ok() => {
                    log::info!("service health: ok");
                    format!("ok: {}", h.message.unwrap_or_default())
                }
                Ok(h) => {
                    log::warn!("service health: unexpected status {:?}", h.status);
                    format!("unexpected status {:?}", h.status.unwrap_or_default())
                }
                Err(e) => {
                    log::warn!("service health check failed: {e}");
                    format!("unreachable: {e}")
                }
            };
            Some(UiNotice::Health(text))
        });
    }

    // ── Actions ──────────────────────────────────────────────────────────

    fn select_path(&mut self, path: PathBuf) {
        self.path_input = path.display().to_string();

        let outcome = VideoCandidate::from_path(&path).and_then(|candidate| {
            let mut st = lock_session(&self.session);
            st.select_video(&candidate, &self.validator, &self.previews)?;
            Ok(())
        });

        if let Err(e) = outcome {
            log::warn!("selection of {} refused: {e}", path.display());
            self.notice = Some(UiNotice::Error(e.to_string()));
        }
    }

    fn generate(&self, ctx: &egui::Context) {
        let orchestrator = Arc::clone(&self.orchestrator);
        self.dispatch(ctx, async move {
            match orchestrator.run().await {
                Ok(_) => None,
                // Refusals never reach the session, so they need a notice.
                Err(e @ (PipelineError::NoVideoSelected | PipelineError::AlreadyRunning)) => {
                    Some(UiNotice::Error(e.to_string()))
                }
                // Stage failures are already shown as the status text.
                Err(_) => None,
            }
        });
    }

    fn copy(&self, ctx: &egui::Context, caption: String) {
        let results = Arc::clone(&self.results);
        self.dispatch(ctx, async move {
            Some(match results.copy_to_clipboard(&caption).await {
                Ok(()) => UiNotice::Info("Caption copied to clipboard.".into()),
                Err(e) => UiNotice::Error(e.to_string()),
            })
        });
    }

    fn save(&self, ctx: &egui::Context, filename: String, caption: String) {
        let results = Arc::clone(&self.results);
        self.dispatch(ctx, async move {
            Some(match results.save(&filename, &caption).await {
                Ok(message) => UiNotice::Info(message),
                Err(e) => UiNotice::Error(e.to_string()),
            })
        });
    }

    fn download(&mut self, json: bool, caption: &str) {
        let outcome = if json {
            self.results.download_as_json(caption)
        } else {
            self.results.download_as_text(caption)
        };
        self.notice = Some(match outcome {
            Ok(path) => UiNotice::Info(format!("Saved to {}", path.display())),
            Err(e) => UiNotice::Error(e.to_string()),
        });
    }

    fn clear(&mut self) {
        match self.results.clear() {
            Ok(()) => self.path_input.clear(),
            Err(e) => self.notice = Some(UiNotice::Error(e.to_string())),
        }
    }

    fn open_preview(&self, ctx: &egui::Context, url: &str) {
        match self.previews.resolve_file_url(url) {
            Some(target) => ctx.open_url(egui::OpenUrl::new_tab(target)),
            None => log::warn!("preview {url} is no longer valid"),
        }
    }

    // ── Panels ───────────────────────────────────────────────────────────

    fn draw_upload(&mut self, ui: &mut egui::Ui, ctx: &egui::Context, view: &SessionView) {
        ui.label("Drag and drop your video here, or enter its path:");
        ui.horizontal(|ui| {
            let edit = ui.add_enabled(
                !view.status.is_running(),
                egui::TextEdit::singleline(&mut self.path_input).hint_text("/path/to/video.mp4"),
            );
            let submitted = edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            let chosen = ui
                .add_enabled(!view.status.is_running(), egui::Button::new("Select"))
                .clicked();
            if (submitted || chosen) && !self.path_input.trim().is_empty() {
                let path = PathBuf::from(self.path_input.trim());
                self.select_path(path);
            }
        });
        ui.label(
            egui::RichText::new(format!(
                "MP4, MOV up to {} MB",
                self.validator.max_size_bytes() / (1024 * 1024)
            ))
            .weak()
            .small(),
        );

        if view.progress_pct > 0 {
            ui.add(
                egui::ProgressBar::new(f32::from(view.progress_pct) / 100.0)
                    .text(format!("Uploading video... {}%", view.progress_pct)),
            );
        }

        if let Some(url) = &view.preview_url {
            ui.horizontal(|ui| {
                ui.label(format!("Selected: {}", view.file_name));
                if ui.link("Open preview").clicked() {
                    self.open_preview(ctx, url);
                }
            });
        }
    }

    fn draw_result(&mut self, ui: &mut egui::Ui, ctx: &egui::Context, view: &SessionView) {
        ui.horizontal(|ui| {
            ui.heading("Generated Captions");
            if ui.button("Copy").clicked() {
                self.copy(ctx, view.caption.clone());
            }
        });

        let (text, color) = match view.status {
            PipelineStatus::Idle => (
                "The generated captions will appear here...".to_string(),
                ui.visuals().weak_text_color(),
            ),
            PipelineStatus::Failed => (
                view.status_text.clone(),
                egui::Color32::from_rgb(255, 136, 68),
            ),
            _ => (view.status_text.clone(), ui.visuals().text_color()),
        };

        egui::Frame::group(ui.style()).show(ui, |ui| {
            ui.set_min_height(80.0);
            ui.set_width(ui.available_width());
            if view.status.is_running() {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label(egui::RichText::new(text).color(color));
                });
            } else {
                ui.label(egui::RichText::new(text).color(color));
            }
        });
    }

    fn draw_actions(&mut self, ui: &mut egui::Ui, ctx: &egui::Context, view: &SessionView) {
        ui.horizontal(|ui| {
            if ui.button("Download as Text").clicked() {
                self.download(false, &view.caption);
            }
            if ui.button("Export JSON").clicked() {
                self.download(true, &view.caption);
            }
        });
        ui.horizontal(|ui| {
            if ui
                .add_enabled(!view.status.is_running(), egui::Button::new("Clear"))
                .clicked()
            {
                self.clear();
            }
            if ui.button("Save").clicked() {
                self.save(ctx, view.file_name.clone(), view.caption.clone());
            }
        });
    }

    fn draw_settings(&self, ui: &mut egui::Ui) {
        ui.label(format!("Service: {}", self.config.service.base_url));
        ui.label(format!(
            "Health: {}",
            self.health.as_deref().unwrap_or("checking...")
        ));
        ui.label(format!("Exports: {}", self.results.export_dir().display()));
        ui.label(format!(
            "Upload limit: {} MB",
            self.validator.max_size_bytes() / (1024 * 1024)
        ));
    }

    fn draw_notice(&mut self, ctx: &egui::Context) {
        let Some(notice) = self.notice.clone() else {
            return;
        };
        let (title, message) = match &notice {
            UiNotice::Error(m) => ("Error", m.as_str()),
            UiNotice::Info(m) | UiNotice::Health(m) => ("Notice", m.as_str()),
        };

        egui::Window::new(title)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(message);
                if ui.button("OK").clicked() {
                    self.notice = None;
                }
            });
    }
}

// ---------------------------------------------------------------------------
// eframe::App impl
// ---------------------------------------------------------------------------

impl eframe::App for CaptionApp {
    /// Called every frame by eframe.  Polls notices, picks up dropped files,
    /// then renders the session.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_health(ctx);
        self.poll_notices();

        let dropped = ctx.input(|i| i.raw.dropped_files.iter().find_map(|f| f.path.clone()));
        if let Some(path) = dropped {
            self.select_path(path);
        }

        let view = SessionView::capture(&self.session);

        // Progress and stage changes happen off-thread; keep polling while
        // a run is in flight.
        if view.status.is_running() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        let blocked = self.notice.is_some();

        egui::TopBottomPanel::top("title").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Video Captioner");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("=").clicked() {
                        self.show_settings = !self.show_settings;
                    }
                });
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_enabled_ui(!blocked, |ui| {
                if self.show_settings {
                    self.draw_settings(ui);
                    ui.separator();
                }

                self.draw_upload(ui, ctx, &view);
                ui.add_space(8.0);

                let label = if view.status.is_running() {
                    "Generating..."
                } else {
                    "Generate Captions"
                };
                if ui
                    .add_enabled(!view.status.is_running(), egui::Button::new(label))
                    .clicked()
                {
                    self.generate(ctx);
                }

                ui.separator();
                self.draw_result(ui, ctx, &view);
                ui.add_space(8.0);
                self.draw_actions(ui, ctx, &view);
            });
        });

        self.draw_notice(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        log::info!("video captioner closing");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::new_shared_session;

    #[test]
    fn session_view_reflects_failed_session() {
        let session = new_shared_session();
        {
            let mut st = lock_session(&session);
            st.status = PipelineStatus::Failed;
            st.error_message = Some("bad file".into());
        }

        let view = SessionView::capture(&session);

        assert_eq!(view.status, PipelineStatus::Failed);
        assert_eq!(view.status_text, "Error: bad file");
        assert!(view.preview_url.is_none());
        assert!(view.caption.is_empty());
    }
}
