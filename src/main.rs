//! Application entry point: Video Captioner.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Create the [`tokio`] runtime (multi-thread, 2 workers).
//! 4. Build the captioning service client, session, preview registry and
//!    result manager.
//! 5. Run [`eframe::run_native`]; blocks the main thread until the window
//!    is closed.

use std::sync::Arc;

use eframe::egui;
use video_captioner::{
    app::CaptionApp,
    config::AppConfig,
    input::PreviewRegistry,
    pipeline::new_shared_session,
    result::{ClipboardSink, ResultManager, SystemClipboard},
    service::{CaptionService, HttpCaptionService},
};

fn native_options(config: &AppConfig) -> eframe::NativeOptions {
    let (width, height) = config.ui.window_size;
    let mut vp = egui::ViewportBuilder::default()
        .with_inner_size([width, height])
        .with_min_inner_size([360.0, 320.0])
        .with_drag_and_drop(true);

    if config.ui.always_on_top {
        vp = vp.with_always_on_top();
    }

    eframe::NativeOptions {
        viewport: vp,
        ..Default::default()
    }
}

fn main() -> eframe::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Video Captioner starting up");

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });
    log::info!("captioning service at {}", config.service.base_url);

    // 3. Tokio runtime
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to create tokio runtime");

    // 4. Core components
    let session = new_shared_session();
    let previews = PreviewRegistry::new();
    let service: Arc<dyn CaptionService> =
        Arc::new(HttpCaptionService::from_config(&config.service));
    let clipboard: Arc<dyn ClipboardSink> = Arc::new(SystemClipboard);
    let results = Arc::new(ResultManager::new(
        Arc::clone(&session),
        Arc::clone(&service),
        clipboard,
        config.export.resolved_dir(),
    ));

    let app = CaptionApp::new(
        session,
        service,
        results,
        previews,
        rt.handle().clone(),
        config.clone(),
    );
    let options = native_options(&config);

    // 5. Run the UI (blocks until the window is closed); `rt` stays alive
    //    for the whole call.
    eframe::run_native(
        "Video Captioner",
        options,
        Box::new(move |_cc| Ok(Box::new(app))),
    )
}
