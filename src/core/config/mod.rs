mod settings;

pub use settings::{DownloadSettings, LauncherConfig, DEFAULT_CHUNK_THRESHOLD};
