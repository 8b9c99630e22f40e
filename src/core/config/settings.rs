use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::error::{LauncherError, LauncherResult};

const APP_DIR_NAME: &str = "Launchpad";
const SETTINGS_FILE: &str = "launcher_settings.json";
const DEFAULT_USER_AGENT: &str = concat!("Launchpad/", env!("CARGO_PKG_VERSION"));

/// Files with a known size below this are never split into ranges.
pub const DEFAULT_CHUNK_THRESHOLD: u64 = 1024 * 1024;

/// Tuning knobs for the download engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadSettings {
    /// Worker pool size for batch downloads.
    pub threads: usize,
    /// Number of byte ranges a chunked transfer is split into.
    pub parts: usize,
    /// Size below which a file with known length is fetched in one request.
    pub chunk_threshold: u64,
    pub user_agent: String,
    pub timeout_secs: u64,
    /// Verify SHA-1 checksums when the manifest provides them.
    pub verify_sha1: bool,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            threads: physical_core_count(),
            parts: available_parallelism(),
            chunk_threshold: DEFAULT_CHUNK_THRESHOLD,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 120,
            verify_sha1: true,
        }
    }
}

impl DownloadSettings {
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_parts(mut self, parts: usize) -> Self {
        self.parts = parts;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Worker count actually used; zero or unset falls back to the core count.
    pub fn effective_threads(&self) -> usize {
        if self.threads == 0 {
            physical_core_count()
        } else {
            self.threads
        }
    }

    pub fn effective_parts(&self) -> usize {
        if self.parts == 0 {
            available_parallelism()
        } else {
            self.parts
        }
    }
}

/// Persisted launcher configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherConfig {
    /// The `.minecraft`-style root holding `versions/`, `libraries/`
    /// and `launcher_profiles.json`.
    pub game_root: PathBuf,
    pub download: DownloadSettings,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            game_root: default_game_root(),
            download: DownloadSettings::default(),
        }
    }
}

impl LauncherConfig {
    pub fn new(game_root: PathBuf) -> Self {
        Self {
            game_root,
            download: DownloadSettings::default(),
        }
    }

    pub fn versions_dir(&self) -> PathBuf {
        self.game_root.join("versions")
    }

    pub fn libraries_dir(&self) -> PathBuf {
        self.game_root.join("libraries")
    }

    pub fn natives_dir(&self, version_id: &str) -> PathBuf {
        self.versions_dir().join(version_id).join("natives")
    }

    /// Load `launcher_settings.json` from `dir`, falling back to defaults when
    /// the file is missing or unreadable.
    pub async fn load_or_default(dir: &Path) -> Self {
        let path = dir.join(SETTINGS_FILE);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(_) => {
                debug!("No settings at {:?}, using defaults", path);
                return Self::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(config) => config,
            Err(e) => {
                warn!("Corrupt settings at {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    pub async fn save(&self, dir: &Path) -> LauncherResult<()> {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| LauncherError::io(dir, e))?;

        let path = dir.join(SETTINGS_FILE);
        let json = serde_json::to_string_pretty(self)?;
        tokio::fs::write(&path, json)
            .await
            .map_err(|e| LauncherError::io(path, e))
    }
}

fn default_game_root() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

fn physical_core_count() -> usize {
    sysinfo::System::new()
        .physical_core_count()
        .filter(|n| *n > 0)
        .unwrap_or_else(available_parallelism)
}

fn available_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}
