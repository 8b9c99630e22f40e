pub mod core;

use tracing_subscriber::EnvFilter;

pub use crate::core::config::{DownloadSettings, LauncherConfig};
pub use crate::core::downloader::{BatchReport, DownloadEntry, Downloader, TransferJob};
pub use crate::core::error::{LauncherError, LauncherResult};
pub use crate::core::maven::{compare_versions, ComparableVersion, MavenArtifact};
pub use crate::core::version::{Platform, ResolvedVersion, VersionLocator, VersionResolver};

/// Install the global `tracing` subscriber. `RUST_LOG` overrides the default
/// filter. Calling this more than once is harmless.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,launchpad_lib=debug")),
        )
        .try_init();
}
