//! `reqwest` implementation of [`CaptionService`].
//!
//! All connection details come from [`ServiceConfig`]; nothing is hardcoded.
//! Response bodies are read leniently: a 2xx answer with an empty or
//! non-JSON body is still a success, its optional fields just come back as
//! `None`.

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, Stream};
use reqwest::multipart::{Form, Part};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::config::ServiceConfig;
use crate::input::NormalizedFile;

use super::{CaptionService, HealthStatus, ProgressFn, ServiceError};

// ---------------------------------------------------------------------------
// Body helpers
// ---------------------------------------------------------------------------

/// Read a top-level string field from a JSON body.
///
/// Empty strings, missing fields, non-string values and unparsable bodies
/// all yield `None`.
pub fn string_field(body: &str, field: &str) -> Option<String> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;
    json.get(field)?
        .as_str()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// User-facing description of a non-2xx response.
///
/// Prefers the body's `error` field; otherwise describes the status code.
pub fn error_message(status: u16, body: &str) -> String {
    string_field(body, "error")
        .unwrap_or_else(|| format!("request failed with status code {status}"))
}

/// Turn a non-2xx response into [`ServiceError::Status`]; pass 2xx through.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ServiceError::Status {
        status: status.as_u16(),
        message: error_message(status.as_u16(), &body),
    })
}

/// Read `reader` in `chunk_bytes`-sized pieces, calling `on_progress` with
/// the running total as each piece is pulled by the transport.
///
/// Only one chunk is in memory at a time.  Every chunk but the last is
/// exactly `chunk_bytes` long; a read error ends the stream after it is
/// yielded.
fn chunked_with_progress<R>(
    reader: R,
    total: u64,
    chunk_bytes: usize,
    on_progress: ProgressFn,
) -> impl Stream<Item = std::io::Result<Vec<u8>>> + Send + 'static
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let chunk_bytes = chunk_bytes.max(1);

    stream::unfold(Some((reader, 0u64)), move |state| {
        let on_progress = Arc::clone(&on_progress);
        async move {
            let (mut reader, sent) = state?;
            match read_chunk(&mut reader, chunk_bytes).await {
                Ok(chunk) if chunk.is_empty() => None,
                Ok(chunk) => {
                    let sent = sent + chunk.len() as u64;
                    on_progress(sent, total);
                    Some((Ok(chunk), Some((reader, sent))))
                }
                Err(e) => Some((Err(e), None)),
            }
        }
    })
}

/// Fill up to `chunk_bytes` from `reader`; shorter only at end of input.
async fn read_chunk<R>(reader: &mut R, chunk_bytes: usize) -> std::io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut chunk = vec![0u8; chunk_bytes];
    let mut filled = 0;
    while filled < chunk_bytes {
        let n = reader.read(&mut chunk[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    chunk.truncate(filled);
    Ok(chunk)
}

// ---------------------------------------------------------------------------
// HttpCaptionService
// ---------------------------------------------------------------------------

/// Talks to the captioning service over HTTP.
pub struct HttpCaptionService {
    client: reqwest::Client,
    base_url: String,
    chunk_bytes: usize,
}

impl HttpCaptionService {
    /// Build a client from application config.
    ///
    /// The per-request timeout comes from `config.timeout_secs`.  A default
    /// (no-timeout) client is used if the builder fails.
    pub fn from_config(config: &ServiceConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            chunk_bytes: config.upload_chunk_bytes,
        }
    }

    /// Full URL for an endpoint path such as `"upload"`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn post_json(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<String, ServiceError> {
        let url = self.endpoint(path);
        log::debug!("service: POST {url}");

        let response = self.client.post(&url).json(body).send().await?;
        let response = check_status(response).await?;
        Ok(response.text().await.unwrap_or_default())
    }
}

#[async_trait]
impl CaptionService for HttpCaptionService {
    async fn upload(
        &self,
        file: &NormalizedFile,
        on_progress: ProgressFn,
    ) -> Result<(), ServiceError> {
        let io_error =
            |e: std::io::Error| ServiceError::Io(format!("{}: {e}", file.path.display()));
        let reader = tokio::fs::File::open(&file.path).await.map_err(io_error)?;
        let total = reader.metadata().await.map_err(io_error)?.len();

        let body = reqwest::Body::wrap_stream(chunked_with_progress(
            reader,
            total,
            self.chunk_bytes,
            on_progress,
        ));
        let part = Part::stream_with_length(body, total)
            .file_name(file.name.clone())
            .mime_str(&file.mime_type)?;
        let form = Form::new().part("video", part);

        let url = self.endpoint("upload");
        log::debug!("service: POST {url} ({total} bytes)");

        let response = self.client.post(&url).multipart(form).send().await?;
        check_status(response).await?;
        Ok(())
    }

    async fn extract_features(&self, filename: &str) -> Result<(), ServiceError> {
        self.post_json(
            "extract_features",
            &serde_json::json!({ "filename": filename }),
        )
        .await?;
        Ok(())
    }

    async fn generate_caption(&self, filename: &str) -> Result<Option<String>, ServiceError> {
        let body = self
            .post_json(
                "generate_caption",
                &serde_json::json!({ "filename": filename }),
            )
            .await?;
        Ok(string_field(&body, "caption"))
    }

    async fn save_caption(
        &self,
        filename: &str,
        caption: &str,
    ) -> Result<Option<String>, ServiceError> {
        let body = self
            .post_json(
                "save_caption",
                &serde_json::json!({ "filename": filename, "caption": caption }),
            )
            .await?;
        Ok(string_field(&body, "message"))
    }

    async fn health(&self) -> Result<HealthStatus, ServiceError> {
        let response = self.client.get(self.endpoint("")).send().await?;
        let body = check_status(response).await?.text().await.unwrap_or_default();
        Ok(HealthStatus {
            status: string_field(&body, "status"),
            message: string_field(&body, "message"),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
