use std::path::PathBuf;
use thiserror::Error;

/// Central error type for the resolution and download core.
/// Every module returns `Result<T, LauncherError>`.
#[derive(Debug, Error)]
pub enum LauncherError {
    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Resolution ──────────────────────────────────────
    #[error("Invalid manifest for version {id}: {reason}")]
    InvalidManifest { id: String, reason: String },

    #[error("Broken inheritance chain for {id}: ancestor {missing} cannot be loaded")]
    BrokenInheritance { id: String, missing: String },

    #[error("Malformed library entry {name}: {reason}")]
    MalformedLibraryEntry { name: String, reason: String },

    #[error("Malformed argument rule: {0}")]
    MalformedArgumentRule(String),

    // ── Network ─────────────────────────────────────────
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Download failed for {url}: HTTP {status}")]
    DownloadFailed { url: String, status: u16 },

    #[error("Transfer of {url} failed: {reason}")]
    Transfer { url: String, reason: String },

    #[error(
        "Reassembly mismatch for {url}: {actual_parts}/{expected_parts} parts, \
         {actual_len}/{expected_len} bytes"
    )]
    ReassemblyMismatch {
        url: String,
        expected_parts: usize,
        actual_parts: usize,
        expected_len: u64,
        actual_len: u64,
    },

    #[error("Transfer cancelled")]
    Cancelled,

    // ── Integrity ───────────────────────────────────────
    #[error("SHA-1 mismatch for {path:?}: expected {expected}, got {actual}")]
    Sha1Mismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    // ── Maven ───────────────────────────────────────────
    #[error("Invalid Maven coordinate: {0}")]
    InvalidMavenCoordinate(String),

    // ── JSON ────────────────────────────────────────────
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ── Archive ─────────────────────────────────────────
    #[error("Zip extraction error: {0}")]
    Zip(#[from] zip::result::ZipError),

    // ── Generic ─────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type LauncherResult<T> = Result<T, LauncherError>;

impl From<std::io::Error> for LauncherError {
    fn from(source: std::io::Error) -> Self {
        LauncherError::Io {
            path: PathBuf::new(),
            source,
        }
    }
}

impl LauncherError {
    /// Attach a path to an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LauncherError::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error came from a cancelled transfer.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, LauncherError::Cancelled)
    }
}
