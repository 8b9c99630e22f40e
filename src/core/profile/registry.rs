use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, info};

use super::model::{LauncherProfile, LauncherProfiles};
use crate::core::error::{LauncherError, LauncherResult};

pub const PROFILES_FILE: &str = "launcher_profiles.json";

/// The `launcher_profiles.json` store at the game root.
///
/// The whole document is rewritten on every change.
pub struct ProfileRegistry {
    path: PathBuf,
    document: LauncherProfiles,
}

impl ProfileRegistry {
    /// Open the registry under `game_root`, creating an empty one if absent.
    pub async fn open(game_root: &Path) -> LauncherResult<Self> {
        let path = game_root.join(PROFILES_FILE);

        if !path.exists() {
            let registry = Self {
                path,
                document: LauncherProfiles::default(),
            };
            registry.save().await?;
            info!("Created profile registry at {:?}", registry.path);
            return Ok(registry);
        }

        let json = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| LauncherError::io(&path, e))?;
        let document: LauncherProfiles = serde_json::from_str(&json)?;
        debug!("Loaded {} profiles from {:?}", document.profiles.len(), path);

        Ok(Self { path, document })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn profiles(&self) -> &LauncherProfiles {
        &self.document
    }

    pub fn get(&self, key: &str) -> Option<&LauncherProfile> {
        self.document.profiles.get(key)
    }

    pub fn profile_for_version(&self, version_id: &str) -> Option<&LauncherProfile> {
        self.document.find_by_version(version_id).map(|(_, p)| p)
    }

    /// Record that `version_id` was resolved.
    ///
    /// An existing profile pointing at the version is touched; otherwise a new
    /// profile named after the version is added. Returns the profile name.
    pub async fn record_resolution(
        &mut self,
        version_id: &str,
        game_dir: &Path,
    ) -> LauncherResult<String> {
        let existing = self
            .document
            .find_by_version(version_id)
            .map(|(key, _)| key.clone());

        let name = match existing.and_then(|key| self.document.profiles.get_mut(&key)) {
            Some(profile) => {
                profile.game_dir = Some(game_dir.to_path_buf());
                profile.last_used = Some(Utc::now());
                profile.name.clone()
            }
            None => {
                let profile = LauncherProfile::for_version(version_id, game_dir.to_path_buf());
                let name = profile.name.clone();
                self.document
                    .profiles
                    .insert(LauncherProfile::key_for(version_id), profile);
                info!("Registered profile for {}", version_id);
                name
            }
        };

        self.save().await?;
        Ok(name)
    }

    /// Write the registry back to disk.
    pub async fn save(&self) -> LauncherResult<()> {
        let json = serde_json::to_string_pretty(&self.document)?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| LauncherError::io(parent, e))?;
        }

        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| LauncherError::io(&self.path, e))?;

        Ok(())
    }
}
