//! Scriptable [`CaptionService`] for unit tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::input::NormalizedFile;

use super::{CaptionService, HealthStatus, ProgressFn, ServiceError};

type Hook = Box<dyn Fn(&'static str) + Send + Sync>;

/// Returns pre-configured results and records which endpoints were hit.
pub struct MockCaptionService {
    pub upload_result: Result<(), ServiceError>,
    pub extract_result: Result<(), ServiceError>,
    pub generate_result: Result<Option<String>, ServiceError>,
    pub save_result: Result<Option<String>, ServiceError>,
    /// `(sent, total)` pairs fed to the progress callback during upload.
    pub progress_steps: Vec<(u64, u64)>,
    /// When set, `upload` waits for a notification before returning.
    pub upload_gate: Option<Arc<Notify>>,
    hook: Option<Hook>,
    calls: Mutex<Vec<&'static str>>,
    saved: Mutex<Vec<(String, String)>>,
}

impl MockCaptionService {
    /// Every stage succeeds; generate returns `caption`.
    pub fn ok(caption: Option<&str>) -> Self {
        Self {
            upload_result: Ok(()),
            extract_result: Ok(()),
            generate_result: Ok(caption.map(str::to_string)),
            save_result: Ok(Some("Caption saved successfully".into())),
            progress_steps: vec![(0, 100), (50, 100), (100, 100)],
            upload_gate: None,
            hook: None,
            calls: Mutex::new(Vec::new()),
            saved: Mutex::new(Vec::new()),
        }
    }

    /// Call `hook` with the endpoint name at the start of every call.
    pub fn with_hook(mut self, hook: impl Fn(&'static str) + Send + Sync + 'static) -> Self {
        self.hook = Some(Box::new(hook));
        self
    }

    /// Endpoints hit so far, in order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    /// `(filename, caption)` pairs passed to `save_caption`.
    pub fn saved(&self) -> Vec<(String, String)> {
        self.saved.lock().unwrap().clone()
    }

    fn record(&self, endpoint: &'static str) {
        if let Some(hook) = &self.hook {
            hook(endpoint);
        }
        self.calls.lock().unwrap().push(endpoint);
    }
}

#[async_trait]
impl CaptionService for MockCaptionService {
    async fn upload(
        &self,
        _file: &NormalizedFile,
        on_progress: ProgressFn,
    ) -> Result<(), ServiceError> {
        self.record("upload");
        for &(sent, total) in &self.progress_steps {
            on_progress(sent, total);
        }
        if let Some(gate) = &self.upload_gate {
            gate.notified().await;
        }
        self.upload_result.clone()
    }

    async fn extract_features(&self, _filename: &str) -> Result<(), ServiceError> {
        self.record("extract_features");
        self.extract_result.clone()
    }

    async fn generate_caption(&self, _filename: &str) -> Result<Option<String>, ServiceError> {
        self.record("generate_caption");
        self.generate_result.clone()
    }

    async fn save_caption(
        &self,
        filename: &str,
        caption: &str,
    ) -> Result<Option<String>, ServiceError> {
        self.record("save_caption");
        self.saved
            .lock()
            .unwrap()
            .push((filename.to_string(), caption.to_string()));
        self.save_result.clone()
    }

    async fn health(&self) -> Result<HealthStatus, ServiceError> {
        self.record("health");
        Ok(HealthStatus {
            status: Some("ok".into()),
            message: Some("Server is running!".into()),
        })
    }
}
