use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One entry in `launcher_profiles.json`.
///
/// Unknown fields written by other launchers (icons, java args, ...) are kept
/// in `extra` so a rewrite does not drop them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LauncherProfile {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_version_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl LauncherProfile {
    /// A fresh profile for `version_id`, named after the version.
    pub fn for_version(version_id: &str, game_dir: PathBuf) -> Self {
        let now = Utc::now();
        Self {
            name: version_id.to_string(),
            game_dir: Some(game_dir),
            last_version_id: Some(version_id.to_string()),
            created: Some(now),
            last_used: Some(now),
            extra: serde_json::Map::new(),
        }
    }

    /// Registry key for a version id: a name-based UUID in simple form, so the
    /// same version always maps to the same key.
    pub fn key_for(version_id: &str) -> String {
        Uuid::new_v5(&Uuid::NAMESPACE_OID, version_id.as_bytes())
            .simple()
            .to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LauncherVersion {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_format")]
    pub format: u32,
}

fn default_format() -> u32 {
    1
}

impl Default for LauncherVersion {
    fn default() -> Self {
        Self {
            name: String::new(),
            format: default_format(),
        }
    }
}

/// The whole `launcher_profiles.json` document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LauncherProfiles {
    #[serde(default)]
    pub profiles: BTreeMap<String, LauncherProfile>,
    #[serde(default)]
    pub client_token: String,
    #[serde(default)]
    pub launcher_version: LauncherVersion,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Default for LauncherProfiles {
    fn default() -> Self {
        Self {
            profiles: BTreeMap::new(),
            client_token: Uuid::new_v4().to_string(),
            launcher_version: LauncherVersion::default(),
            extra: serde_json::Map::new(),
        }
    }
}

impl LauncherProfiles {
    pub fn find_by_version(&self, version_id: &str) -> Option<(&String, &LauncherProfile)> {
        self.profiles
            .iter()
            .find(|(_, p)| p.last_version_id.as_deref() == Some(version_id))
    }
}
