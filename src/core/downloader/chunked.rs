use std::path::Path;
use std::sync::Arc;

use reqwest::header::RANGE;
use reqwest::StatusCode;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::client::{remove_stale, stream_to_file, transfer_error, Downloader};
use super::job::{DownloadEntry, TransferProgress};
use super::progress::ProgressTracker;
use super::range::DownloadRange;
use crate::core::error::{LauncherError, LauncherResult};

/// One fetched range, held in a temporary file beside the destination.
/// The file is deleted when this value is dropped.
#[derive(Debug)]
pub struct PartFile {
    pub range: DownloadRange,
    len: u64,
    file: NamedTempFile,
}

impl PartFile {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Downloader {
    /// Fetch `length` bytes as parallel ranges and merge them into
    /// `entry.dest`. Anything already at the destination is removed first.
    pub async fn download_chunked(
        &self,
        entry: &DownloadEntry,
        length: u64,
        progress: Option<&UnboundedSender<TransferProgress>>,
        cancel: &CancellationToken,
    ) -> LauncherResult<u64> {
        let ranges = DownloadRange::partition(length, self.settings.effective_parts());
        let tracker = Arc::new(ProgressTracker::new(
            &entry.url,
            Some(length),
            progress.cloned(),
        ));
        debug!(
            "Chunked download of {} ({} bytes in {} parts)",
            entry.url,
            length,
            ranges.len()
        );

        remove_stale(&entry.dest).await?;
        let parts = self
            .fetch_ranges(&entry.url, &entry.dest, &ranges, tracker, cancel)
            .await?;
        merge_parts(&entry.url, parts, ranges.len(), &entry.dest, length).await
    }

    /// Fetch every range concurrently, each into its own temporary file in
    /// the directory of `dest`.
    ///
    /// The first failing range aborts the others. On any failure or on
    /// cancellation every spawned task is awaited before returning, so all
    /// temporary files are gone by then.
    pub async fn fetch_ranges(
        &self,
        url: &str,
        dest: &Path,
        ranges: &[DownloadRange],
        tracker: Arc<ProgressTracker>,
        cancel: &CancellationToken,
    ) -> LauncherResult<Vec<PartFile>> {
        let dir = dest
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let file_name = dest
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "download".into());

        let mut tasks = JoinSet::new();
        let mut failure = None;
        for range in ranges {
            if cancel.is_cancelled() {
                failure = Some(LauncherError::Cancelled);
                break;
            }

            let temp = match tempfile::Builder::new()
                .prefix(&format!(".{}.part{}-", file_name, range.index))
                .tempfile_in(dir)
            {
                Ok(temp) => temp,
                Err(e) => {
                    failure = Some(LauncherError::io(dir, e));
                    break;
                }
            };

            let downloader = self.clone();
            let url = url.to_string();
            let range = *range;
            let tracker = tracker.clone();
            let cancel = cancel.clone();
            tasks.spawn(async move {
                downloader
                    .fetch_range(&url, range, temp, &tracker, &cancel)
                    .await
            });
        }

        if failure.is_some() {
            tasks.abort_all();
        }

        let mut parts = Vec::with_capacity(ranges.len());
        while let Some(joined) = tasks.join_next().await {
            let result = match joined {
                Ok(result) => result,
                Err(e) if e.is_cancelled() => continue,
                Err(e) => Err(LauncherError::Other(format!("range task failed: {}", e))),
            };

            match result {
                Ok(part) => parts.push(part),
                Err(e) => {
                    if failure.is_none() {
                        if !e.is_cancelled() {
                            warn!("Range request for {} failed: {}", url, e);
                        }
                        tasks.abort_all();
                        failure = Some(e);
                    }
                }
            }
        }

        if let Some(e) = failure {
            return Err(e);
        }

        parts.sort_by_key(|p| p.range.index);
        Ok(parts)
    }

    async fn fetch_range(
        &self,
        url: &str,
        range: DownloadRange,
        temp: NamedTempFile,
        tracker: &ProgressTracker,
        cancel: &CancellationToken,
    ) -> LauncherResult<PartFile> {
        let request = self.client.get(url).header(RANGE, range.header_value());
        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(LauncherError::Cancelled),
            response = request.send() => response.map_err(|e| transfer_error(url, e))?,
        };

        // Anything but 206 means the server ignored the range.
        let status = response.status();
        if status != StatusCode::PARTIAL_CONTENT {
            return Err(LauncherError::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let handle = temp
            .as_file()
            .try_clone()
            .map_err(|e| LauncherError::io(temp.path(), e))?;
        let mut file = tokio::fs::File::from_std(handle);
        let written = stream_to_file(response, &mut file, temp.path(), tracker, cancel).await?;
        drop(file);

        if written != range.len() {
            return Err(transfer_error(
                url,
                format!(
                    "range {} returned {} of {} bytes",
                    range.index,
                    written,
                    range.len()
                ),
            ));
        }

        Ok(PartFile {
            range,
            len: written,
            file: temp,
        })
    }
}

/// Concatenate parts into `dest` in ascending range order.
///
/// The part count and total length are checked before and after writing;
/// on mismatch or error `dest` is removed. Part files are always removed.
pub async fn merge_parts(
    url: &str,
    mut parts: Vec<PartFile>,
    expected_parts: usize,
    dest: &Path,
    expected_len: u64,
) -> LauncherResult<u64> {
    let actual_len: u64 = parts.iter().map(PartFile::len).sum();
    if parts.len() != expected_parts || actual_len != expected_len {
        let _ = tokio::fs::remove_file(dest).await;
        return Err(LauncherError::ReassemblyMismatch {
            url: url.to_string(),
            expected_parts,
            actual_parts: parts.len(),
            expected_len,
            actual_len,
        });
    }

    parts.sort_by_key(|p| p.range.index);
    let result = concatenate(&parts, dest).await;
    drop(parts);

    match result {
        Ok(written) if written == expected_len => Ok(written),
        Ok(written) => {
            let _ = tokio::fs::remove_file(dest).await;
            Err(LauncherError::ReassemblyMismatch {
                url: url.to_string(),
                expected_parts,
                actual_parts: expected_parts,
                expected_len,
                actual_len: written,
            })
        }
        Err(e) => {
            let _ = tokio::fs::remove_file(dest).await;
            Err(e)
        }
    }
}

async fn concatenate(parts: &[PartFile], dest: &Path) -> LauncherResult<u64> {
    let mut out = tokio::fs::File::create(dest)
        .await
        .map_err(|e| LauncherError::io(dest, e))?;

    let mut written = 0;
    for part in parts {
        let handle = part
            .file
            .reopen()
            .map_err(|e| LauncherError::io(part.path(), e))?;
        let mut input = tokio::fs::File::from_std(handle);
        written += tokio::io::copy(&mut input, &mut out)
            .await
            .map_err(|e| LauncherError::io(dest, e))?;
    }

    out.flush().await.map_err(|e| LauncherError::io(dest, e))?;
    Ok(written)
}
