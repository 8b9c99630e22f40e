use std::path::{Path, PathBuf};

use tracing::warn;

use super::platform::Platform;
use super::resolved::ResolvedVersion;
use super::resolver::{DirectoryManifestSource, VersionResolver};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::profile::ProfileRegistry;

/// Resolves installed versions under a game root and keeps
/// `launcher_profiles.json` in step with what was resolved.
pub struct VersionLocator {
    game_root: PathBuf,
    resolver: VersionResolver<DirectoryManifestSource>,
    registry: ProfileRegistry,
}

impl VersionLocator {
    /// Open the game root, creating `versions/` and the profile registry when
    /// they do not exist yet.
    pub async fn open(game_root: impl Into<PathBuf>, platform: Platform) -> LauncherResult<Self> {
        let game_root = game_root.into();
        let versions_dir = game_root.join("versions");
        tokio::fs::create_dir_all(&versions_dir)
            .await
            .map_err(|e| LauncherError::io(&versions_dir, e))?;

        let registry = ProfileRegistry::open(&game_root).await?;

        Ok(Self {
            resolver: VersionResolver::new(DirectoryManifestSource::new(versions_dir), platform),
            game_root,
            registry,
        })
    }

    pub fn game_root(&self) -> &Path {
        &self.game_root
    }

    pub fn registry(&self) -> &ProfileRegistry {
        &self.registry
    }

    pub fn resolver(&self) -> &VersionResolver<DirectoryManifestSource> {
        &self.resolver
    }

    /// Resolve `id` and record it in the profile registry.
    ///
    /// The registry write is a side effect: if it fails the resolution is
    /// still returned, named after its id.
    pub async fn locate(&mut self, id: &str) -> LauncherResult<ResolvedVersion> {
        let mut resolved = self.resolver.resolve(id).await?;

        let game_dir = self.resolver.source().versions_dir().join(id);
        match self.registry.record_resolution(&resolved.id, &game_dir).await {
            Ok(name) => resolved.name = name,
            Err(e) => warn!("Cannot record profile for {}: {}", id, e),
        }

        Ok(resolved)
    }

    /// Resolve every installed version. Versions that fail to resolve are
    /// logged and left out.
    pub async fn list_versions(&mut self) -> LauncherResult<Vec<ResolvedVersion>> {
        let ids = self.resolver.source().version_ids().await?;
        let mut versions = Vec::with_capacity(ids.len());

        for id in ids {
            match self.locate(&id).await {
                Ok(resolved) => versions.push(resolved),
                Err(e) => warn!("Skipping version {}: {}", id, e),
            }
        }

        Ok(versions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::version::platform::OsName;
    use serde_json::json;

    async fn install(root: &Path, id: &str, manifest: serde_json::Value) {
        let dir = root.join("versions").join(id);
        tokio::fs::create_dir_all(&dir).await.unwrap();
        tokio::fs::write(dir.join(format!("{id}.json")), manifest.to_string())
            .await
            .unwrap();
    }

    fn linux() -> Platform {
        Platform::new(OsName::Linux, "x86_64", "6.5.0")
    }

    #[tokio::test]
    async fn locate_registers_a_profile() {
        let dir = tempfile::tempdir().unwrap();
        install(
            dir.path(),
            "1.12.2",
            json!({"id": "1.12.2", "mainClass": "net.minecraft.client.main.Main", "minecraftArguments": "--username ${auth_player_name}"}),
        )
        .await;

        let mut locator = VersionLocator::open(dir.path(), linux()).await.unwrap();
        let resolved = locator.locate("1.12.2").await.unwrap();

        assert_eq!(resolved.name, "1.12.2");
        let profile = locator.registry().profile_for_version("1.12.2").unwrap();
        assert_eq!(
            profile.game_dir.as_deref(),
            Some(dir.path().join("versions").join("1.12.2").as_path())
        );
    }

    #[tokio::test]
    async fn list_skips_broken_versions() {
        let dir = tempfile::tempdir().unwrap();
        install(
            dir.path(),
            "1.19",
            json!({"id": "1.19", "mainClass": "M", "arguments": {"game": []}}),
        )
        .await;
        install(
            dir.path(),
            "orphan",
            json!({"id": "orphan", "inheritsFrom": "gone", "mainClass": "M", "arguments": {"game": []}}),
        )
        .await;

        let mut locator = VersionLocator::open(dir.path(), linux()).await.unwrap();
        let versions = locator.list_versions().await.unwrap();

        assert_eq!(versions.len(), 1);
        assert_eq!(versions[0].id, "1.19");
        assert!(locator.registry().profile_for_version("orphan").is_none());
    }
}
