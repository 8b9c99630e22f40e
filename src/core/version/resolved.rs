use std::collections::HashMap;
use std::path::Path;

use serde::Serialize;

use super::libraries::{LibraryFile, NativeFile};
use super::manifest::{AssetIndexInfo, JavaVersionInfo};
use crate::core::downloader::DownloadEntry;

/// A version with its inheritance chain flattened for one platform.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedVersion {
    pub id: String,
    /// Display name; the registered profile name once located.
    pub name: String,
    /// Directory under `versions/` the leaf manifest was loaded from.
    pub dir_name: String,
    /// Id of the root ancestor when the version inherits from another.
    pub root_version: Option<String>,
    pub main_class: String,
    pub java_version: Option<JavaVersionInfo>,
    pub asset_index: Option<AssetIndexInfo>,
    pub assets: Option<String>,
    pub libraries: Vec<LibraryFile>,
    pub natives: Vec<NativeFile>,
    pub jvm_arguments: Vec<String>,
    pub game_arguments: Vec<String>,
    /// Feature-gated game arguments keyed by feature name.
    pub available_game_arguments: HashMap<String, String>,
}

impl ResolvedVersion {
    /// Asset index id, falling back to the legacy `assets` field.
    pub fn asset_index_id(&self) -> Option<&str> {
        self.asset_index
            .as_ref()
            .map(|a| a.id.as_str())
            .or(self.assets.as_deref())
    }

    pub fn library(&self, identity: &str) -> Option<&LibraryFile> {
        self.libraries
            .iter()
            .find(|l| l.artifact.identity() == identity)
    }

    /// Download list for every library and native archive that has a
    /// download location, rooted at `libraries_dir`.
    pub fn download_entries(&self, libraries_dir: &Path) -> Vec<DownloadEntry> {
        self.libraries
            .iter()
            .chain(self.natives.iter().map(|n| &n.file))
            .filter_map(|file| {
                let url = file.url.clone()?;
                Some(DownloadEntry {
                    url,
                    dest: file.local_path(libraries_dir),
                    sha1: file.sha1.clone(),
                    size: file.size,
                })
            })
            .collect()
    }
}
