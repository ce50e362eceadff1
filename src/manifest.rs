//! Capturing the player's manifest request and reducing it to the form yt-dlp expects.
//!
//! The page's response stream is drained on a background task. The first URL containing
//! [`MANIFEST_MARKER`] fulfills a one-shot [`ManifestSignal`]; the pipeline waits on the
//! matching [`ManifestCapture`] with a deadline.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::BoxStream;
use futures::StreamExt;
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::error::{GrabError, Result};
use crate::ui;

pub const MANIFEST_MARKER: &str = "videomanifest?provider";
pub const DASH_MARKER: &str = "index&format=dash";

/// Write side. Only the first `fulfill` is delivered, later ones are dropped.
#[derive(Debug)]
pub struct ManifestSignal {
    tx: Mutex<Option<oneshot::Sender<String>>>,
}

/// Read side, consumed by a single waiter.
#[derive(Debug)]
pub struct ManifestCapture {
    rx: oneshot::Receiver<String>,
}

/// A fresh signal/capture pair for one run.
pub fn channel() -> (Arc<ManifestSignal>, ManifestCapture) {
    let (tx, rx) = oneshot::channel();
    (
        Arc::new(ManifestSignal {
            tx: Mutex::new(Some(tx)),
        }),
        ManifestCapture { rx },
    )
}

impl ManifestSignal {
    /// Returns `true` if this call delivered the value.
    pub fn fulfill(&self, url: String) -> bool {
        match self.tx.lock().take() {
            Some(tx) => tx.send(url).is_ok(),
            None => false,
        }
    }
}

impl ManifestCapture {
    /// Waits up to `timeout`, counted from this call. If every [`ManifestSignal`] handle
    /// is dropped unfulfilled the wait ends at once with [`GrabError::ManifestTimeout`],
    /// so callers keep a handle alive for as long as a manifest may still arrive.
    pub async fn wait(self, timeout: Duration) -> Result<String> {
        match tokio::time::timeout(timeout, self.rx).await {
            Ok(Ok(url)) => Ok(url),
            Ok(Err(_)) | Err(_) => Err(GrabError::ManifestTimeout(timeout)),
        }
    }
}

/// Case-insensitive check for [`MANIFEST_MARKER`].
pub fn is_manifest_url(url: &str) -> bool {
    find_ignore_ascii_case(url, MANIFEST_MARKER).is_some()
}

/// Aborts the observer task when dropped, so every exit path stops listening.
#[derive(Debug)]
pub struct ObserverGuard(JoinHandle<()>);

impl Drop for ObserverGuard {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Spawns the response observer. It keeps running until the guard is dropped or the
/// stream ends.
pub fn observe(mut responses: BoxStream<'static, String>, signal: Arc<ManifestSignal>) -> ObserverGuard {
    let handle = tokio::spawn(async move {
        while let Some(url) = responses.next().await {
            if !is_manifest_url(&url) {
                continue;
            }
            if signal.fulfill(url.clone()) {
                ui::status(format!("Potential manifest found: {}", url));
            } else {
                tracing::debug!(%url, "ignoring additional manifest response");
            }
        }
        tracing::debug!("response stream closed");
    });
    ObserverGuard(handle)
}

/// Cuts the manifest URL right after `index&format=dash`, dropping trailing query params.
pub fn canonicalize(manifest_url: &str) -> Result<String> {
    let start = find_ignore_ascii_case(manifest_url, DASH_MARKER).ok_or_else(|| GrabError::ManifestFormat {
        marker: DASH_MARKER,
        url: manifest_url.to_string(),
    })?;
    Ok(manifest_url[..start + DASH_MARKER.len()].to_string())
}

/// Byte offset of the first ASCII case-insensitive occurrence of `needle`.
fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    let hay = haystack.as_bytes();
    let needle = needle.as_bytes();
    if needle.is_empty() {
        return Some(0);
    }
    hay.windows(needle.len()).position(|w| w.eq_ignore_ascii_case(needle))
}
