// ─── Download Engine ───
//   job      — entries, queued jobs, progress and outcomes
//   range    — byte range partitioning
//   client   — HEAD probe, strategy selection, single-shot transfers
//   chunked  — parallel ranged transfers and in-order reassembly
//   pool     — bounded queue + worker pool for batches
//   progress — shared byte counters

pub mod chunked;
pub mod client;
pub mod job;
pub mod pool;
pub mod progress;
pub mod range;

pub use chunked::{merge_parts, PartFile};
pub use client::{sha1_file, verify_sha1, Downloader, RemoteResource};
pub use job::{
    BatchReport, DownloadEntry, TransferJob, TransferOutcome, TransferProgress, TransferStatus,
};
pub use progress::ProgressTracker;
pub use range::DownloadRange;
