//! Desktop client for a remote video-captioning service.
//!
//! * [`input`] — video validation, filename sanitisation, preview URLs.
//! * [`pipeline`] — upload → extract → generate orchestration and the
//!   shared session.
//! * [`result`] — copy, download, save and clear over the caption.
//! * [`service`] — HTTP client for the captioning service.
//! * [`config`] — `settings.toml` handling.
//! * [`app`] — the egui window.

pub mod app;
pub mod config;
pub mod input;
pub mod pipeline;
pub mod result;
pub mod service;
