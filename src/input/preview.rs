//! Revocable preview references for a selected video.
//!
//! A [`PreviewHandle`] stands for one live `preview://<id>/<name>` URL that
//! the UI can resolve back to the file on disk.  Handles are neither `Clone`
//! nor `Copy`; the URL is revoked when the handle is released or dropped,
//! whichever comes first, and never twice.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

const SCHEME: &str = "preview://";

#[derive(Debug, Default)]
struct RegistryInner {
    next_id: u64,
    live: HashMap<u64, PathBuf>,
    peak_live: usize,
}

// ---------------------------------------------------------------------------
// PreviewRegistry
// ---------------------------------------------------------------------------

/// Issues and tracks preview references.
///
/// Cheap to clone; all clones share the same table.
#[derive(Debug, Clone, Default)]
pub struct PreviewRegistry {
    inner: Arc<Mutex<RegistryInner>>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RegistryInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Allocate a new reference to `path`, labelled with `name`.
    pub fn acquire(&self, path: &Path, name: &str) -> PreviewHandle {
        let mut inner = self.lock();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.live.insert(id, path.to_path_buf());
        inner.peak_live = inner.peak_live.max(inner.live.len());
        drop(inner);

        let url = format!("{SCHEME}{id}/{name}");
        log::debug!("preview: acquired {url}");

        PreviewHandle {
            id,
            url,
            registry: self.clone(),
        }
    }

    /// Map a live preview URL back to the file it refers to.
    ///
    /// Returns `None` for revoked or malformed URLs.
    pub fn resolve(&self, url: &str) -> Option<PathBuf> {
        let id: u64 = url.strip_prefix(SCHEME)?.split('/').next()?.parse().ok()?;
        self.lock().live.get(&id).cloned()
    }

    /// Like [`resolve`](Self::resolve), but as a `file://` URL the OS can open.
    pub fn resolve_file_url(&self, url: &str) -> Option<String> {
        file_url(&self.resolve(url)?)
    }

    /// Number of references currently outstanding.
    pub fn live_count(&self) -> usize {
        self.lock().live.len()
    }

    /// Highest number of simultaneously live references ever observed.
    pub fn peak_live_count(&self) -> usize {
        self.lock().peak_live
    }

    fn revoke(&self, id: u64) {
        if self.lock().live.remove(&id).is_none() {
            log::warn!("preview: reference {id} was already revoked");
        }
    }
}

/// Percent-encoded `file://` URL for `path`.
///
/// Relative paths are resolved against the working directory; drive paths
/// come out as `file:///C:/...`.  `None` if the path cannot be made absolute.
pub fn file_url(path: &Path) -> Option<String> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().ok()?.join(path)
    };
    url::Url::from_file_path(&absolute).ok().map(String::from)
}

// ---------------------------------------------------------------------------
// PreviewHandle
// ---------------------------------------------------------------------------

/// Owning handle to one live preview URL.
#[derive(Debug)]
pub struct PreviewHandle {
    id: u64,
    url: String,
    registry: PreviewRegistry,
}

impl PreviewHandle {
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Revoke the URL now.
    pub fn release(self) {
        // Drop does the revocation.
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.registry.revoke(self.id);
        log::debug!("preview: revoked {}", self.url);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
