use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use super::manifest::{DownloadArtifact, ExtractRule, LibraryEntry};
use super::platform::Platform;
use crate::core::error::LauncherError;
use crate::core::maven::MavenArtifact;

/// A library file on the classpath (or a native archive), with the location
/// it is fetched from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryFile {
    /// Coordinate as written in the manifest.
    pub name: String,
    pub artifact: MavenArtifact,
    /// Path relative to the libraries directory, `/`-separated.
    pub path: String,
    /// `None` when the manifest lists the file without a download location.
    pub url: Option<String>,
    pub sha1: Option<String>,
    pub size: Option<u64>,
}

impl LibraryFile {
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    pub fn local_path(&self, libraries_dir: &Path) -> PathBuf {
        self.path
            .split('/')
            .filter(|s| !s.is_empty())
            .fold(libraries_dir.to_path_buf(), |path, segment| path.join(segment))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeFile {
    #[serde(flatten)]
    pub file: LibraryFile,
    pub extract: Option<ExtractRule>,
}

#[derive(Debug, Clone, Default)]
pub struct ClassifiedLibraries {
    pub libraries: Vec<LibraryFile>,
    pub natives: Vec<NativeFile>,
}

/// Split one manifest's library entries into classpath libraries and native
/// archives for `platform`.
///
/// Entries disallowed by their rules are dropped, as are `clientreq: false`
/// entries unless `always_required` is set (Forge chains).
pub fn classify_libraries(
    entries: &[LibraryEntry],
    platform: &Platform,
    always_required: bool,
) -> ClassifiedLibraries {
    let mut out = ClassifiedLibraries::default();

    for entry in entries {
        if !always_required && entry.client_required == Some(false) {
            debug!("Skipping {} (not required by the client)", entry.name);
            continue;
        }

        if !entry.is_allowed_on(platform) {
            debug!("Skipping {} (rules)", entry.name);
            continue;
        }

        let artifact = match MavenArtifact::parse(&entry.name) {
            Ok(a) => a,
            Err(e) => {
                let err = LauncherError::MalformedLibraryEntry {
                    name: entry.name.clone(),
                    reason: e.to_string(),
                };
                warn!("Skipping library: {}", err);
                continue;
            }
        };

        match entry.native_classifier(platform) {
            Some(classifier) => {
                let download = entry
                    .downloads
                    .as_ref()
                    .and_then(|d| d.classifiers.as_ref())
                    .and_then(|c| c.get(&classifier));
                let artifact = artifact.with_classifier(&classifier);
                out.natives.push(NativeFile {
                    file: library_file(entry, artifact, download),
                    extract: entry.extract.clone(),
                });
            }
            None => {
                let download = entry.downloads.as_ref().and_then(|d| d.artifact.as_ref());
                out.libraries.push(library_file(entry, artifact, download));
            }
        }
    }

    out
}

fn library_file(
    entry: &LibraryEntry,
    artifact: MavenArtifact,
    download: Option<&DownloadArtifact>,
) -> LibraryFile {
    let path = download
        .and_then(|d| d.path.clone())
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| artifact.relative_path());

    let url = match download {
        Some(d) => d.url.clone().filter(|u| !u.is_empty()),
        None => Some(match entry.url.as_deref().filter(|u| !u.is_empty()) {
            Some(base) => artifact.url(base),
            None => artifact.default_url(),
        }),
    };

    LibraryFile {
        name: entry.name.clone(),
        artifact,
        path,
        url,
        sha1: download.and_then(|d| d.sha1.clone()),
        size: download.and_then(|d| d.size).filter(|s| *s > 0),
    }
}

/// Libraries merged across an inheritance chain.
///
/// Entries are keyed by `group:artifact[:classifier]`. On a clash the greater
/// version replaces the existing entry in place; equal versions keep the
/// earlier one.
#[derive(Debug, Default)]
pub struct LibrarySet {
    files: Vec<LibraryFile>,
    positions: HashMap<String, usize>,
}

impl LibrarySet {
    pub fn insert(&mut self, file: LibraryFile) {
        let identity = file.artifact.identity();
        match self.positions.get(&identity) {
            Some(&index) => {
                let existing = &self.files[index];
                if file.artifact.comparable_version() > existing.artifact.comparable_version() {
                    debug!("{} supersedes {}", file.name, existing.name);
                    self.files[index] = file;
                }
            }
            None => {
                self.positions.insert(identity, self.files.len());
                self.files.push(file);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn into_vec(self) -> Vec<LibraryFile> {
        self.files
    }
}

impl Extend<LibraryFile> for LibrarySet {
    fn extend<I: IntoIterator<Item = LibraryFile>>(&mut self, iter: I) {
        for file in iter {
            self.insert(file);
        }
    }
}

/// Native archives merged across a chain, unique by file name.
#[derive(Debug, Default)]
pub struct NativeSet {
    files: Vec<NativeFile>,
    seen: HashSet<String>,
}

impl NativeSet {
    pub fn insert(&mut self, native: NativeFile) {
        if self.seen.insert(native.file.file_name().to_string()) {
            self.files.push(native);
        }
    }

    pub fn into_vec(self) -> Vec<NativeFile> {
        self.files
    }
}

impl Extend<NativeFile> for NativeSet {
    fn extend<I: IntoIterator<Item = NativeFile>>(&mut self, iter: I) {
        for native in iter {
            self.insert(native);
        }
    }
}
