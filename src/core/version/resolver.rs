use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::arguments::{select_game_arguments, select_jvm_arguments};
use super::libraries::{classify_libraries, LibrarySet, NativeSet};
use super::manifest::RawVersionManifest;
use super::platform::Platform;
use super::resolved::ResolvedVersion;
use crate::core::error::{LauncherError, LauncherResult};

/// Where version manifests come from.
#[async_trait]
pub trait ManifestSource: Send + Sync {
    /// Raw JSON for `id`, or `None` when no such version exists.
    async fn load(&self, id: &str) -> LauncherResult<Option<String>>;
}

/// Reads `<versions_dir>/<id>/<id>.json`.
#[derive(Debug, Clone)]
pub struct DirectoryManifestSource {
    versions_dir: PathBuf,
}

impl DirectoryManifestSource {
    pub fn new(versions_dir: impl Into<PathBuf>) -> Self {
        Self {
            versions_dir: versions_dir.into(),
        }
    }

    pub fn versions_dir(&self) -> &Path {
        &self.versions_dir
    }

    pub fn manifest_path(&self, id: &str) -> PathBuf {
        self.versions_dir.join(id).join(format!("{}.json", id))
    }

    /// Ids of all version directories that contain a manifest.
    pub async fn version_ids(&self) -> LauncherResult<Vec<String>> {
        if !self.versions_dir.exists() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.versions_dir)
            .await
            .map_err(|e| LauncherError::io(&self.versions_dir, e))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| LauncherError::io(&self.versions_dir, e))?
        {
            let id = entry.file_name().to_string_lossy().to_string();
            if self.manifest_path(&id).exists() {
                ids.push(id);
            }
        }

        ids.sort();
        Ok(ids)
    }
}

#[async_trait]
impl ManifestSource for DirectoryManifestSource {
    async fn load(&self, id: &str) -> LauncherResult<Option<String>> {
        let path = self.manifest_path(id);
        if !path.exists() {
            return Ok(None);
        }
        let raw = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| LauncherError::io(&path, e))?;
        Ok(Some(raw))
    }
}

/// Manifests held in memory, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct MemoryManifestSource {
    manifests: HashMap<String, String>,
}

impl MemoryManifestSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, raw: impl Into<String>) {
        self.manifests.insert(id.into(), raw.into());
    }

    pub fn with(mut self, id: impl Into<String>, manifest: &serde_json::Value) -> Self {
        self.insert(id, manifest.to_string());
        self
    }
}

#[async_trait]
impl ManifestSource for MemoryManifestSource {
    async fn load(&self, id: &str) -> LauncherResult<Option<String>> {
        Ok(self.manifests.get(id).cloned())
    }
}

/// Flattens a version's inheritance chain into a [`ResolvedVersion`].
pub struct VersionResolver<S> {
    source: S,
    platform: Platform,
}

impl<S: ManifestSource> VersionResolver<S> {
    pub fn new(source: S, platform: Platform) -> Self {
        Self { source, platform }
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Load and validate a single manifest.
    pub async fn load_manifest(&self, id: &str) -> LauncherResult<RawVersionManifest> {
        let raw = self
            .source
            .load(id)
            .await?
            .ok_or_else(|| LauncherError::InvalidManifest {
                id: id.to_string(),
                reason: "manifest not found".into(),
            })?;
        RawVersionManifest::parse(id, &raw)
    }

    /// Load `id` and all of its ancestors, root first.
    pub async fn load_chain(&self, id: &str) -> LauncherResult<Vec<RawVersionManifest>> {
        let leaf = self.load_manifest(id).await?;
        let mut seen = HashSet::from([id.to_string()]);
        let mut parent = leaf.inherits_from().map(ToString::to_string);
        let mut chain = vec![leaf];

        while let Some(parent_id) = parent {
            if !seen.insert(parent_id.clone()) {
                warn!("Inheritance cycle in {} at {}", id, parent_id);
                return Err(LauncherError::BrokenInheritance {
                    id: id.to_string(),
                    missing: parent_id,
                });
            }

            let manifest = match self.load_manifest(&parent_id).await {
                Ok(m) => m,
                Err(e) => {
                    warn!("Cannot load ancestor {} of {}: {}", parent_id, id, e);
                    return Err(LauncherError::BrokenInheritance {
                        id: id.to_string(),
                        missing: parent_id,
                    });
                }
            };

            debug!("{} inherits from {}", id, parent_id);
            parent = manifest.inherits_from().map(ToString::to_string);
            chain.push(manifest);
        }

        chain.reverse();
        Ok(chain)
    }

    /// Resolve `id` for this resolver's platform.
    ///
    /// Ancestors are folded root first. Scalar fields take the most specific
    /// non-empty value. Libraries merge with version conflict resolution.
    /// A legacy `minecraftArguments` template replaces the templates of its
    /// ancestors and precedes the structured game arguments.
    pub async fn resolve(&self, id: &str) -> LauncherResult<ResolvedVersion> {
        let chain = self.load_chain(id).await?;
        let always_required = chain.iter().any(RawVersionManifest::mentions_forge);

        let mut resolved_id = None;
        let mut main_class = None;
        let mut java_version = None;
        let mut asset_index = None;
        let mut assets = None;
        let mut libraries = LibrarySet::default();
        let mut natives = NativeSet::default();
        let mut jvm_arguments = Vec::new();
        let mut game_arguments = Vec::new();
        let mut legacy_arguments: Option<Vec<String>> = None;
        let mut available_game_arguments = HashMap::new();

        for manifest in &chain {
            let classified =
                classify_libraries(&manifest.library_entries(), &self.platform, always_required);
            libraries.extend(classified.libraries);
            natives.extend(classified.natives);

            match manifest.legacy_arguments() {
                Some(tokens) => legacy_arguments = Some(tokens),
                None => {
                    if let Some(arguments) = &manifest.arguments {
                        jvm_arguments.extend(select_jvm_arguments(&arguments.jvm, &self.platform));
                        let game = select_game_arguments(&arguments.game, &self.platform);
                        game_arguments.extend(game.arguments);
                        available_game_arguments.extend(game.available);
                    }
                }
            }

            if let Some(value) = manifest.id.clone().filter(|s| !s.is_empty()) {
                resolved_id = Some(value);
            }
            if let Some(value) = manifest.main_class.clone().filter(|s| !s.is_empty()) {
                main_class = Some(value);
            }
            if manifest.java_version.is_some() {
                java_version = manifest.java_version.clone();
            }
            if manifest.asset_index.is_some() {
                asset_index = manifest.asset_index.clone();
            }
            if let Some(value) = manifest.assets.clone().filter(|s| !s.is_empty()) {
                assets = Some(value);
            }
        }

        let main_class = main_class.ok_or_else(|| LauncherError::InvalidManifest {
            id: id.to_string(),
            reason: "missing mainClass".into(),
        })?;

        let mut arguments = legacy_arguments.unwrap_or_default();
        arguments.extend(game_arguments);

        let root_version = if chain.len() > 1 {
            chain
                .first()
                .and_then(|m| m.id.clone())
                .filter(|s| !s.is_empty())
        } else {
            None
        };

        let resolved_id = resolved_id.unwrap_or_else(|| id.to_string());
        let resolved = ResolvedVersion {
            name: resolved_id.clone(),
            id: resolved_id,
            dir_name: id.to_string(),
            root_version,
            main_class,
            java_version,
            asset_index,
            assets,
            libraries: libraries.into_vec(),
            natives: natives.into_vec(),
            jvm_arguments,
            game_arguments: arguments,
            available_game_arguments,
        };

        info!(
            "Resolved {} ({} manifests, {} libraries, {} natives)",
            id,
            chain.len(),
            resolved.libraries.len(),
            resolved.natives.len()
        );
        Ok(resolved)
    }
}
