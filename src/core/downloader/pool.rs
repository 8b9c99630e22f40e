use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::client::Downloader;
use super::job::{BatchReport, DownloadEntry, TransferJob, TransferStatus};
use crate::core::error::{LauncherError, LauncherResult};

type Finished = (DownloadEntry, LauncherResult<u64>);

impl Downloader {
    /// Run `jobs` through a bounded queue served by a fixed worker pool.
    ///
    /// The queue holds `threads * 4` jobs; enqueueing waits while it is full.
    /// Each job reports to its completion sink exactly once. Once `cancel`
    /// fires, workers stop taking jobs and everything not yet started is
    /// reported as cancelled.
    pub async fn download_batch(
        &self,
        jobs: Vec<TransferJob>,
        cancel: CancellationToken,
    ) -> BatchReport {
        let threads = self.settings.effective_threads().max(1);
        let total = jobs.len();
        info!(
            "Starting batch download: {} files, {} workers",
            total, threads
        );

        let (queue_tx, queue_rx) = mpsc::channel::<TransferJob>(threads * 4);
        let queue_rx = Arc::new(Mutex::new(queue_rx));
        let (done_tx, mut done_rx) = mpsc::unbounded_channel::<Finished>();

        let producer = {
            let cancel = cancel.clone();
            let done_tx = done_tx.clone();
            tokio::spawn(async move {
                let mut pending = jobs.into_iter();
                while let Some(job) = pending.next() {
                    let permit = tokio::select! {
                        biased;
                        _ = cancel.cancelled() => None,
                        permit = queue_tx.reserve() => permit.ok(),
                    };
                    match permit {
                        Some(permit) => permit.send(job),
                        None => {
                            for job in std::iter::once(job).chain(pending.by_ref()) {
                                finish(job, Err(LauncherError::Cancelled), &done_tx);
                            }
                        }
                    }
                }
            })
        };

        let mut workers = JoinSet::new();
        for worker in 0..threads {
            let downloader = self.clone();
            let queue_rx = queue_rx.clone();
            let cancel = cancel.clone();
            let done_tx = done_tx.clone();
            workers.spawn(async move {
                loop {
                    let next = {
                        let mut queue = queue_rx.lock().await;
                        tokio::select! {
                            biased;
                            _ = cancel.cancelled() => None,
                            job = queue.recv() => job,
                        }
                    };
                    let Some(job) = next else { break };

                    if cancel.is_cancelled() {
                        finish(job, Err(LauncherError::Cancelled), &done_tx);
                        continue;
                    }

                    debug!("Worker {} took {}", worker, job.entry.url);
                    let result = downloader
                        .download(&job.entry, job.progress.as_ref(), &cancel)
                        .await;
                    finish(job, result, &done_tx);
                }
            });
        }

        if let Err(e) = producer.await {
            warn!("Batch producer stopped: {}", e);
        }
        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                warn!("Download worker stopped: {}", e);
            }
        }

        // Jobs still queued when the workers stopped were never started.
        {
            let mut queue = queue_rx.lock().await;
            queue.close();
            while let Ok(job) = queue.try_recv() {
                finish(job, Err(LauncherError::Cancelled), &done_tx);
            }
        }
        drop(done_tx);

        let mut report = BatchReport::default();
        while let Some((entry, result)) = done_rx.recv().await {
            match result {
                Ok(_) => report.completed.push(entry),
                Err(e) if e.is_cancelled() => report.cancelled.push(entry),
                Err(e) => report.failed.push((entry, e)),
            }
        }

        info!(
            "Batch finished: {}/{} completed, {} failed, {} cancelled",
            report.completed.len(),
            total,
            report.failed.len(),
            report.cancelled.len()
        );
        report
    }
}

fn finish(mut job: TransferJob, result: LauncherResult<u64>, done: &mpsc::UnboundedSender<Finished>) {
    let status = match &result {
        Ok(bytes) => TransferStatus::Completed { bytes: *bytes },
        Err(e) if e.is_cancelled() => TransferStatus::Cancelled,
        Err(e) => {
            warn!("Download of {} failed: {}", job.entry.url, e);
            TransferStatus::Failed {
                reason: e.to_string(),
            }
        }
    };
    job.complete(status);
    let _ = done.send((job.entry, result));
}
