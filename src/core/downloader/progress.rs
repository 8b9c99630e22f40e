use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use tokio::sync::mpsc::UnboundedSender;

use super::job::TransferProgress;

/// Shared byte counter for one transfer. Range tasks add to it concurrently;
/// updates are forwarded to the job's progress sink.
///
/// The sink only ever sees increasing `received` values.
#[derive(Debug)]
pub struct ProgressTracker {
    url: String,
    expected: Option<u64>,
    received: AtomicU64,
    last_sent: Mutex<u64>,
    sink: Option<UnboundedSender<TransferProgress>>,
}

impl ProgressTracker {
    pub fn new(
        url: impl Into<String>,
        expected: Option<u64>,
        sink: Option<UnboundedSender<TransferProgress>>,
    ) -> Self {
        Self {
            url: url.into(),
            expected,
            received: AtomicU64::new(0),
            last_sent: Mutex::new(0),
            sink,
        }
    }

    pub fn add(&self, bytes: u64) {
        self.received.fetch_add(bytes, Ordering::Relaxed);
        let Some(sink) = &self.sink else {
            return;
        };

        // Read the total under the lock so a slower task cannot report a
        // smaller value after a faster one.
        let mut last_sent = self.last_sent.lock().unwrap_or_else(PoisonError::into_inner);
        let received = self.received.load(Ordering::Relaxed);
        if received > *last_sent {
            *last_sent = received;
            // A dropped receiver only means nobody is watching.
            let _ = sink.send(TransferProgress {
                url: self.url.clone(),
                received,
                expected: self.expected,
            });
        }
    }

    pub fn received(&self) -> u64 {
        self.received.load(Ordering::Relaxed)
    }
}
