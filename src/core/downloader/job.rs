use std::path::PathBuf;

use serde::Serialize;
use tokio::sync::{mpsc, oneshot};

use crate::core::error::LauncherError;

/// A single file to download with optional SHA-1 for validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadEntry {
    pub url: String,
    pub dest: PathBuf,
    pub sha1: Option<String>,
    /// Declared size in bytes, when the manifest knows it.
    pub size: Option<u64>,
}

impl DownloadEntry {
    pub fn new(url: impl Into<String>, dest: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            dest: dest.into(),
            sha1: None,
            size: None,
        }
    }

    pub fn with_sha1(mut self, sha1: impl Into<String>) -> Self {
        self.sha1 = Some(sha1.into());
        self
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }
}

/// Progress snapshot for one transfer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferProgress {
    pub url: String,
    pub received: u64,
    pub expected: Option<u64>,
}

impl TransferProgress {
    /// Fraction in `0.0..=1.0`, or `None` while the length is unknown.
    pub fn fraction(&self) -> Option<f64> {
        match self.expected {
            Some(0) | None => None,
            Some(total) => Some((self.received as f64 / total as f64).min(1.0)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum TransferStatus {
    Completed { bytes: u64 },
    Failed { reason: String },
    Cancelled,
}

/// Final state of one job, delivered to its completion sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOutcome {
    pub entry: DownloadEntry,
    pub status: TransferStatus,
}

impl TransferOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self.status, TransferStatus::Completed { .. })
    }
}

/// A queued download with its optional observers.
#[derive(Debug)]
pub struct TransferJob {
    pub entry: DownloadEntry,
    pub progress: Option<mpsc::UnboundedSender<TransferProgress>>,
    pub completion: Option<oneshot::Sender<TransferOutcome>>,
}

impl TransferJob {
    pub fn new(entry: DownloadEntry) -> Self {
        Self {
            entry,
            progress: None,
            completion: None,
        }
    }

    pub fn with_progress(mut self, sink: mpsc::UnboundedSender<TransferProgress>) -> Self {
        self.progress = Some(sink);
        self
    }

    /// Attach a completion sink and return its receiving end.
    pub fn with_completion(mut self) -> (Self, oneshot::Receiver<TransferOutcome>) {
        let (tx, rx) = oneshot::channel();
        self.completion = Some(tx);
        (self, rx)
    }

    /// Deliver the final state to the completion sink, if any.
    pub(crate) fn complete(&mut self, status: TransferStatus) {
        if let Some(sink) = self.completion.take() {
            let _ = sink.send(TransferOutcome {
                entry: self.entry.clone(),
                status,
            });
        }
    }
}

impl From<DownloadEntry> for TransferJob {
    fn from(entry: DownloadEntry) -> Self {
        Self::new(entry)
    }
}

/// Summary of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub completed: Vec<DownloadEntry>,
    pub failed: Vec<(DownloadEntry, LauncherError)>,
    pub cancelled: Vec<DownloadEntry>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.completed.len() + self.failed.len() + self.cancelled.len()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.cancelled.is_empty()
    }
}
