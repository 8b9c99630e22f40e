use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

use futures_util::StreamExt;
use reqwest::header::{ACCEPT_RANGES, CONTENT_LENGTH};
use reqwest::{Client, Response};
use sha1::{Digest, Sha1};
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::job::{DownloadEntry, TransferProgress};
use super::progress::ProgressTracker;
use crate::core::config::DownloadSettings;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::http::build_http_client;

/// What a HEAD request told us about a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteResource {
    pub length: Option<u64>,
    pub accepts_ranges: bool,
}

impl RemoteResource {
    /// Length to split into ranges, if the server allows it.
    pub fn chunkable_length(&self) -> Option<u64> {
        self.length.filter(|len| *len > 0 && self.accepts_ranges)
    }
}

pub(crate) fn transfer_error(url: &str, reason: impl ToString) -> LauncherError {
    LauncherError::Transfer {
        url: url.to_string(),
        reason: reason.to_string(),
    }
}

/// HTTP downloader with single-shot and chunked strategies.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct Downloader {
    pub(crate) client: Client,
    pub(crate) settings: Arc<DownloadSettings>,
}

impl Downloader {
    pub fn new(settings: DownloadSettings) -> LauncherResult<Self> {
        let client = build_http_client(&settings)?;
        Ok(Self::with_client(client, settings))
    }

    /// Use a preconfigured client (proxy settings, test servers, ...).
    pub fn with_client(client: Client, settings: DownloadSettings) -> Self {
        Self {
            client,
            settings: Arc::new(settings),
        }
    }

    pub fn settings(&self) -> &DownloadSettings {
        &self.settings
    }

    // ── Probe ───────────────────────────────────────────

    /// Issue a HEAD request and read the length and range support.
    pub async fn probe(&self, url: &str) -> LauncherResult<RemoteResource> {
        let response = self
            .client
            .head(url)
            .send()
            .await
            .map_err(|e| transfer_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LauncherError::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let headers = response.headers();
        let length = headers
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        let accepts_ranges = headers
            .get(ACCEPT_RANGES)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.to_ascii_lowercase().contains("bytes"));

        debug!(
            "Probed {}: length={:?}, ranges={}",
            url, length, accepts_ranges
        );
        Ok(RemoteResource {
            length,
            accepts_ranges,
        })
    }

    // ── Strategy selection ──────────────────────────────

    /// Download one entry, choosing the strategy from its declared size and
    /// what the server supports. Verifies SHA-1 when known and enabled.
    ///
    /// Returns the number of bytes written.
    pub async fn download(
        &self,
        entry: &DownloadEntry,
        progress: Option<&UnboundedSender<TransferProgress>>,
        cancel: &CancellationToken,
    ) -> LauncherResult<u64> {
        if cancel.is_cancelled() {
            return Err(LauncherError::Cancelled);
        }

        if let Some(parent) = entry.dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| LauncherError::io(parent, e))?;
        }

        let small = entry
            .size
            .is_some_and(|size| size > 0 && size < self.settings.chunk_threshold);

        let written = if small {
            self.download_single(entry, progress, cancel).await?
        } else {
            match self.probe(&entry.url).await {
                Ok(remote) => match remote.chunkable_length() {
                    Some(length) => {
                        self.download_chunked(entry, length, progress, cancel)
                            .await?
                    }
                    None => self.download_single(entry, progress, cancel).await?,
                },
                Err(e) => {
                    debug!("Probe failed for {} ({}), downloading in one request", entry.url, e);
                    self.download_single(entry, progress, cancel).await?
                }
            }
        };

        if self.settings.verify_sha1 {
            if let Some(expected) = entry.sha1.as_deref() {
                verify_sha1(&entry.dest, expected).await?;
            }
        }

        debug!("Downloaded: {} -> {:?} ({} bytes)", entry.url, entry.dest, written);
        Ok(written)
    }

    // ── Single-shot ─────────────────────────────────────

    /// Stream the whole body to `entry.dest` in one request. Anything already
    /// at the destination is removed first, and the destination is removed
    /// again if the transfer does not complete.
    pub async fn download_single(
        &self,
        entry: &DownloadEntry,
        progress: Option<&UnboundedSender<TransferProgress>>,
        cancel: &CancellationToken,
    ) -> LauncherResult<u64> {
        let url = entry.url.as_str();
        remove_stale(&entry.dest).await?;

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(LauncherError::Cancelled),
            response = self.client.get(url).send() => {
                response.map_err(|e| transfer_error(url, e))?
            }
        };

        let status = response.status();
        if !status.is_success() {
            return Err(LauncherError::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let expected = response.content_length();
        let tracker = ProgressTracker::new(url, expected.or(entry.size), progress.cloned());

        let result = match tokio::fs::File::create(&entry.dest).await {
            Ok(mut file) => stream_to_file(response, &mut file, &entry.dest, &tracker, cancel)
                .await
                .and_then(|written| match expected {
                    Some(expected) if written != expected => Err(transfer_error(
                        url,
                        format!("received {} of {} bytes", written, expected),
                    )),
                    _ => Ok(written),
                }),
            Err(e) => Err(LauncherError::io(&entry.dest, e)),
        };

        if result.is_err() {
            let _ = tokio::fs::remove_file(&entry.dest).await;
        }
        result
    }
}

/// Remove a leftover file at `path`. A missing file is fine.
pub(crate) async fn remove_stale(path: &Path) -> LauncherResult<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            debug!("Removed stale {:?}", path);
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(LauncherError::io(path, e)),
    }
}

/// Copy a response body into `file`, counting bytes into `tracker`.
/// Stops with [`LauncherError::Cancelled`] as soon as `cancel` fires.
pub(crate) async fn stream_to_file(
    response: Response,
    file: &mut tokio::fs::File,
    path: &Path,
    tracker: &ProgressTracker,
    cancel: &CancellationToken,
) -> LauncherResult<u64> {
    let url = response.url().to_string();
    let mut stream = response.bytes_stream();
    let mut written = 0u64;

    loop {
        let chunk = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(LauncherError::Cancelled),
            chunk = stream.next() => chunk,
        };
        let Some(chunk) = chunk else { break };
        let chunk = chunk.map_err(|e| transfer_error(&url, e))?;

        file.write_all(&chunk)
            .await
            .map_err(|e| LauncherError::io(path, e))?;
        written += chunk.len() as u64;
        tracker.add(chunk.len() as u64);
    }

    file.flush().await.map_err(|e| LauncherError::io(path, e))?;
    Ok(written)
}

/// Hash a file with SHA-1, returning lowercase hex.
pub async fn sha1_file(path: &Path) -> LauncherResult<String> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| LauncherError::io(path, e))?;
    let mut hasher = Sha1::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}

/// Check `path` against an expected SHA-1. A mismatching file is removed.
pub async fn verify_sha1(path: &Path, expected: &str) -> LauncherResult<()> {
    let actual = sha1_file(path).await?;
    if !actual.eq_ignore_ascii_case(expected) {
        let _ = tokio::fs::remove_file(path).await;
        return Err(LauncherError::Sha1Mismatch {
            path: path.to_path_buf(),
            expected: expected.to_string(),
            actual,
        });
    }
    Ok(())
}
